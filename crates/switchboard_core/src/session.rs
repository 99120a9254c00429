//! Per-router cache of remote sessions.
//!
//! Each project gets exactly one session for the lifetime of the cache. The
//! first caller for a project opens it; concurrent callers wait on the same
//! creation instead of opening their own.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use switchboard_client::{AgentClient, ClientError, ClientResult, ProjectId};
use tokio::sync::OnceCell;
use tracing::debug;

/// Maps project ids to session ids. Entries are never evicted.
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: Mutex<HashMap<ProjectId, Arc<OnceCell<String>>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached session for `project_id`, opening one on first use.
    ///
    /// A failed creation is not cached; the next call tries again.
    pub async fn get_or_create(
        &self,
        client: &dyn AgentClient,
        project_id: ProjectId,
    ) -> ClientResult<String> {
        let cell = self.sessions.lock().entry(project_id).or_default().clone();

        let session_id = cell
            .get_or_try_init(|| async {
                let conversation = client.create_conversation(project_id, None).await?;
                debug!(project_id, session_id = %conversation.session_id, "Session opened");
                Ok::<_, ClientError>(conversation.session_id)
            })
            .await?;

        Ok(session_id.clone())
    }

    /// The cached session for a project, if one was opened.
    pub fn get(&self, project_id: ProjectId) -> Option<String> {
        self.sessions
            .lock()
            .get(&project_id)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of projects with an open session.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
