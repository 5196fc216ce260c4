//! Conversational query pipeline for Kantodex.
//!
//! Sequences vocabulary correction, session context retrieval, grounded
//! query processing, and history updates around the inference backend.
//! The [`ChatOrchestrator`] is the single entry point external callers
//! (HTTP handlers, voice round-trip handlers) invoke.

pub mod corrector;
pub mod dataset;
pub mod error;
pub mod orchestrator;
pub mod query;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use corrector::{CorrectorStats, NameCorrector};
pub use dataset::{DatasetService, DatasetStats};
pub use error::ChatError;
pub use orchestrator::{ChatOrchestrator, ChatStats, QueryOutcome};
pub use query::QueryProcessor;
pub use session::{Role, Session, SessionStore, Turn, CONTEXT_TURNS};
