//! Core types and configuration for Kantodex.
//!
//! Kantodex is a voice-driven Generation 1 Pokédex: transcribed questions
//! are corrected for misheard Pokémon names, grounded in CSV data, and
//! answered by an LLM backend. This crate holds the shared error type,
//! result alias, and TOML-backed configuration used by the other crates.

pub mod config;
pub mod error;

pub use config::{DataConfig, GeneralConfig, KantodexConfig, LlmConfig, SessionConfig};
pub use error::{KantodexError, Result};

/// Install a global `tracing` subscriber at the given level.
///
/// Safe to call more than once; only the first call takes effect.
pub fn init_tracing(level: &str) {
    let level = level.parse().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
