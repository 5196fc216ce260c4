//! In-memory conversation sessions with bounded context extraction.
//!
//! Sessions live for the process lifetime only. Known limitation: two
//! concurrent requests on the same session can both snapshot context
//! before either appends its turn, so one exchange may miss a
//! cross-reference. Appends themselves are atomic under the store mutex;
//! this matches the best-effort contract of a chat context window and is
//! deliberately not serialized further.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Turns rendered into prompt context per session.
pub const CONTEXT_TURNS: usize = 6;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// A server-held conversation record keyed by an opaque identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub turns: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Process-wide store of active sessions.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session and return its identifier.
    ///
    /// Ids combine a millisecond timestamp with a random suffix, unique
    /// within the process lifetime.
    pub fn create(&self) -> String {
        let now = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("session_{}_{}", now.timestamp_millis(), &suffix[..9]);

        let session = Session {
            id: id.clone(),
            turns: Vec::new(),
            created_at: now,
            last_activity: now,
        };
        self.lock().insert(id.clone(), session);
        id
    }

    /// Fetch a session by id. Missing ids are not an error.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.lock().get(id).cloned()
    }

    /// Append a turn and touch the activity timestamp.
    ///
    /// Unknown ids are a silent no-op: a caller that raced with eviction
    /// should not crash.
    pub fn add_message(&self, id: &str, role: Role, text: &str) {
        if let Some(session) = self.lock().get_mut(id) {
            session.turns.push(Turn {
                role,
                text: text.to_string(),
            });
            session.last_activity = Utc::now();
        }
    }

    /// Render the last [`CONTEXT_TURNS`] turns as `role: text` lines in
    /// chronological order. Empty string for unknown or empty sessions.
    pub fn context(&self, id: &str) -> String {
        let guard = self.lock();
        let Some(session) = guard.get(id) else {
            return String::new();
        };
        let start = session.turns.len().saturating_sub(CONTEXT_TURNS);
        session.turns[start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.role, turn.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Remove every session idle for more than `max_age_hours` and return
    /// the count removed. Scheduled or opportunistic; not on the hot path.
    pub fn evict_older_than(&self, max_age_hours: u64) -> usize {
        let cutoff = Utc::now() - Duration::hours(max_age_hours as i64);
        let mut guard = self.lock();
        let before = guard.len();
        guard.retain(|_, session| session.last_activity >= cutoff);
        let removed = before - guard.len();
        if removed > 0 {
            info!("Cleaned up {} old sessions", removed);
        }
        removed
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
