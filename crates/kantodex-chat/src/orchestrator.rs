//! Conversation orchestrator: the single entry point for query handling.
//!
//! Sequences correction, context retrieval, query processing, and history
//! updates. The context snapshot is taken before the current turn is
//! appended, so a turn never sees its own text as history.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use kantodex_core::KantodexConfig;
use kantodex_llm::{LanguageModel, OpenAiClient};

use crate::corrector::NameCorrector;
use crate::dataset::{DatasetService, DatasetStats};
use crate::error::ChatError;
use crate::query::QueryProcessor;
use crate::session::{Role, Session, SessionStore};

/// Result of one orchestrated query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated health snapshot across the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ChatStats {
    pub dataset: DatasetStats,
    pub llm_initialized: bool,
    pub active_sessions: usize,
}

/// Coordinates the corrector, session store, and query processor.
pub struct ChatOrchestrator {
    corrector: NameCorrector,
    processor: QueryProcessor,
    store: Arc<SessionStore>,
    llm: Arc<dyn LanguageModel>,
    dataset: Arc<DatasetService>,
}

impl ChatOrchestrator {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        dataset: Arc<DatasetService>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            corrector: NameCorrector::new(Arc::clone(&llm)),
            processor: QueryProcessor::new(Arc::clone(&llm), Arc::clone(&dataset)),
            store,
            llm,
            dataset,
        }
    }

    /// Compose the full pipeline from configuration: inference client with
    /// the environment credential, dataset from the configured directory,
    /// and a fresh session store.
    pub fn from_config(config: &KantodexConfig) -> Self {
        let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiClient::from_env(config.llm.clone()));
        let dataset = Arc::new(DatasetService::load(Path::new(&config.data.csv_dir)));
        Self::new(llm, dataset, Arc::new(SessionStore::new()))
    }

    /// Handle one transcribed query.
    ///
    /// Corrects the text, snapshots prior context, appends the corrected
    /// user turn, obtains the answer, and appends the assistant turn. The
    /// supplied session id is echoed back whether or not it resolved; turns
    /// are only recorded for resolvable sessions.
    pub async fn process_query(
        &self,
        raw_text: &str,
        session_id: Option<&str>,
    ) -> Result<QueryOutcome, ChatError> {
        let corrected = self.corrector.correct(raw_text).await;

        let mut context = String::new();
        let mut resolved = None;
        if let Some(id) = session_id {
            if self.store.get(id).is_some() {
                // History strictly before this turn
                context = self.store.context(id);
                self.store.add_message(id, Role::User, &corrected);
                resolved = Some(id.to_string());
            }
        }

        let answer = self.processor.process(&corrected, &context).await?;

        if let Some(id) = &resolved {
            self.store.add_message(id, Role::Assistant, &answer);
        }

        Ok(QueryOutcome {
            answer,
            session_id: session_id.map(str::to_string),
            timestamp: Utc::now(),
        })
    }

    /// Create a new conversation session.
    pub fn create_session(&self) -> String {
        self.store.create()
    }

    /// Fetch a session by id.
    pub fn get_session(&self, id: &str) -> Option<Session> {
        self.store.get(id)
    }

    /// Evict sessions idle for more than `max_age_hours`.
    pub fn cleanup_sessions(&self, max_age_hours: u64) -> usize {
        self.store.evict_older_than(max_age_hours)
    }

    /// Health snapshot across dataset, backend, and sessions.
    pub fn stats(&self) -> ChatStats {
        ChatStats {
            dataset: self.dataset.stats(),
            llm_initialized: self.llm.is_initialized(),
            active_sessions: self.store.session_count(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
