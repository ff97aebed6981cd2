//! Byte sources for configuration documents bundled with the binary.

use std::collections::HashMap;

/// Name of the bundled default configuration document.
pub const DEFAULT_CONFIGURATION_ASSET: &str = "config.json";


mod generated {
    // Written by build.rs: one `include_bytes!` entry per file under `assets/`.
    include!(concat!(env!("OUT_DIR"), "/embedded_assets.rs"));
}


/// An opaque, read-only byte source keyed by asset name.
pub trait AssetSource {
    fn asset(&self, name: &str) -> Option<&[u8]>;
}


/// Files from the crate's `assets/` directory, embedded at build time.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedAssets;

impl EmbeddedAssets {
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        generated::EMBEDDED_ASSETS.iter().map(|(name, _)| *name)
    }
}

impl AssetSource for EmbeddedAssets {
    fn asset(&self, name: &str) -> Option<&[u8]> {
        generated::EMBEDDED_ASSETS
            .iter()
            .find(|(asset_name, _)| *asset_name == name)
            .map(|(_, contents)| *contents)
    }
}


/// Assets held in memory, for embedding applications and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset<N, C>(mut self, name: N, contents: C) -> Self
    where
        N: Into<String>,
        C: Into<Vec<u8>>,
    {
        self.entries.insert(name.into(), contents.into());
        self
    }
}

impl AssetSource for InMemoryAssets {
    fn asset(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_assets_are_keyed_by_name() {
        let assets = InMemoryAssets::new().with_asset(DEFAULT_CONFIGURATION_ASSET, "{}");

        assert_eq!(assets.asset(DEFAULT_CONFIGURATION_ASSET), Some(&b"{}"[..]));
        assert_eq!(assets.asset("missing.json"), None);
    }

    #[test]
    fn embedded_assets_only_resolve_known_names() {
        let assets = EmbeddedAssets;
        for name in assets.names() {
            assert!(assets.asset(name).is_some());
        }
        assert!(assets.asset("definitely-not-bundled.bin").is_none());
    }
}
