//! Repository Implementation

use crate::StorageError;
use chrono::{DateTime, Utc};
use fatigue::FatigueConfig;
use serde::{Deserialize, Serialize};
use session::SessionReport;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Sessions kept before the oldest is evicted
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// A processed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    /// Thresholds the session ran with
    pub config: FatigueConfig,
    pub report: SessionReport,
}

struct Sessions {
    records: VecDeque<SessionRecord>,
    next_id: i64,
}

/// Repository for session reports (in-memory)
pub struct Repository {
    sessions: Mutex<Sessions>,
    max_sessions: usize,
}

impl Repository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_MAX_SESSIONS)
    }

    /// Keep at most `max_sessions` records, evicting the oldest
    pub fn with_retention(max_sessions: usize) -> Self {
        let max_sessions = max_sessions.max(1);
        info!("Creating in-memory repository (retention: {} sessions)", max_sessions);
        Self {
            sessions: Mutex::new(Sessions {
                records: VecDeque::new(),
                next_id: 1,
            }),
            max_sessions,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Sessions>, StorageError> {
        self.sessions
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
    }

    /// Store a report and return the new record
    pub fn insert_session(
        &self,
        name: impl Into<String>,
        config: FatigueConfig,
        report: SessionReport,
    ) -> Result<SessionRecord, StorageError> {
        let mut sessions = self.lock()?;

        let record = SessionRecord {
            id: sessions.next_id,
            created_at: Utc::now(),
            name: name.into(),
            config,
            report,
        };
        sessions.next_id += 1;

        // Enforce retention
        while sessions.records.len() >= self.max_sessions {
            if let Some(evicted) = sessions.records.pop_front() {
                debug!("Evicted session {}", evicted.id);
            }
        }

        sessions.records.push_back(record.clone());
        debug!("Inserted session with ID {}", record.id);
        Ok(record)
    }

    pub fn get_session(&self, id: i64) -> Result<SessionRecord, StorageError> {
        self.lock()?
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    /// Most recent sessions first
    pub fn list_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>, StorageError> {
        Ok(self.lock()?.records.iter().rev().take(limit).cloned().collect())
    }

    pub fn delete_session(&self, id: i64) -> Result<SessionRecord, StorageError> {
        let mut sessions = self.lock()?;
        let index = sessions
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StorageError::NotFound(id))?;
        let removed = sessions
            .records
            .remove(index)
            .ok_or(StorageError::NotFound(id))?;
        info!("Deleted session {}", id);
        Ok(removed)
    }

    /// Get total session count
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Clear all data (ids keep increasing)
    pub fn clear(&self) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.records.clear();
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
