//! Configuration bootstrap for the semaphore task-automation server.
//!
//! The server's startup sequencer calls [`cli::CLIArgs::startup_mode`] first;
//! utility modes never touch the configuration. Regular startup resolves a
//! [`configuration::Configuration`] exactly once through
//! [`configuration::ConfigResolver`] and passes it on to every component.

pub mod cli;
pub mod configuration;
pub mod logging;
pub mod password;
pub mod secrets;
pub mod setup;
