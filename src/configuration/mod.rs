//! This module contains all configuration-relevant code, including
//! the configuration document itself as well as the code needed to load
//! and resolve it.
//!
//! Your starting point should probably be [`ConfigResolver::resolve`].
//!
//! # Internals
//! Resolution is split into an unresolved and a resolved stage.
//!
//! The document on disk (or embedded in the binary) is deserialized into
//! [`ConfigDocument`], where every field is optional. Its `resolve`
//! method then applies environment overrides and defaults, decodes the
//! cookie secrets and parses the web host, producing a [`Configuration`].
//! Sub-sections that need their own validation (e.g. the cookie secrets)
//! implement [`ResolvableConfiguration`][traits::ResolvableConfiguration] and
//! are resolved recursively.

#![allow(rustdoc::private_intra_doc_links)]

mod assets;
mod error;
mod resolver;
mod structure;
mod traits;
mod utilities;

pub use assets::{AssetSource, EmbeddedAssets, InMemoryAssets, DEFAULT_CONFIGURATION_ASSET};
pub use error::ConfigurationError;
pub use resolver::{ConfigResolver, Environment};
pub use structure::*;
pub use traits::ResolvableConfigurationWithContext;
pub use utilities::{
    clean_path,
    default_tmp_path,
    DEFAULT_MAX_PARALLEL_TASKS,
    DEFAULT_PORT,
    UNIX_TMP_PATH,
};
