use anyhow::Result;
use bytes::Bytes;
use doc_translator_core::{ActivityLog, AppConfig, DocTranslator, Lang};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A finished translation held in memory for download.
pub struct Session {
    pub original_filename: String,
    /// File name offered in the Content-Disposition header
    pub download_name: String,
    pub output: Bytes,
    /// Detected source language label ("English", "multi", ...)
    pub source_label: String,
    pub target: Lang,
    pub units_translated: usize,
    pub created_at: Instant,
}

/// Global application state.
pub struct AppState {
    /// Finished translations indexed by UUID
    sessions: RwLock<HashMap<Uuid, Session>>,
    pub config: AppConfig,
    pub activity_log: ActivityLog,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let activity_log = ActivityLog::new(config.storage.log_path.clone());
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            activity_log,
        }
    }

    /// Build a pipeline for one request's language pair.
    pub fn pipeline(&self, target: Lang) -> Result<DocTranslator> {
        let mut config = self.config.clone();
        config.target_lang = target;

        DocTranslator::new(config).map_err(|e| anyhow::anyhow!("Failed to create translator: {e}"))
    }

    /// Store a finished translation; returns the session ID for URLs.
    pub async fn insert_session(&self, session: Session) -> String {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, session);
        id.to_string()
    }

    /// Read session data within a closure.
    ///
    /// The closure runs synchronously under the read lock, which is released
    /// before this method returns, so nothing is held across `.await` points
    /// in the caller.
    pub async fn with_session<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&Session) -> R,
    {
        let uuid = Uuid::parse_str(id).ok()?;
        let sessions = self.sessions.read().await;
        sessions.get(&uuid).map(f)
    }

    /// Drop sessions older than 1 hour; returns how many were removed.
    pub async fn cleanup_old_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let max_age = Duration::from_secs(3600);

        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.created_at) < max_age);
        before - sessions.len()
    }
}

/// Shared state handle used by all route handlers.
pub type SharedState = Arc<AppState>;
