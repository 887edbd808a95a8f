//! Facegate Engine: adapters that reach the recognition engine
//!
//! The only adapter today shells out to the engine's command-line entry
//! script, one child process per invocation.

pub mod config;
pub mod cli;

pub use config::EngineConfig;
pub use cli::CliEngine;
