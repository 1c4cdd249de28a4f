//! In-memory session: the result of the latest upload.
//!
//! One session at a time. A new upload replaces the previous one; before
//! the first upload the store is empty, which callers present as
//! "waiting for input".

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::charts::{build_charts, Chart};
use crate::transform::pipeline::PipelineResult;

/// The latest upload and everything derived from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub job_id: String,
    pub file_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub result: PipelineResult,
    pub charts: Vec<Chart>,
}

impl Session {
    pub fn new(result: PipelineResult, file_name: Option<String>) -> Self {
        let charts = build_charts(&result.summary);
        Self {
            job_id: Uuid::new_v4().to_string(),
            file_name,
            uploaded_at: Utc::now(),
            result,
            charts,
        }
    }
}

/// Shared holder for the current [`Session`]. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Arc<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new result, discarding the previous session.
    pub async fn replace(&self, result: PipelineResult, file_name: Option<String>) -> Arc<Session> {
        let session = Arc::new(Session::new(result, file_name));
        *self.current.write().await = Some(Arc::clone(&session));
        session
    }

    pub async fn current(&self) -> Option<Arc<Session>> {
        self.current.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}
