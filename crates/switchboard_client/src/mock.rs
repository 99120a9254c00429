//! Scripted agent client for testing.
//!
//! Provides a configurable implementation of the [`AgentClient`] trait so
//! routing behaviour can be exercised without a live agent service.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::client::AgentClient;
use crate::error::{ClientError, ClientResult};
use crate::wire::{Conversation, ProjectId, Reply, SendMessage};

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub method: String,
    pub project_id: ProjectId,
    pub session_id: Option<String>,
    pub prompt: Option<String>,
}

/// Mock agent client.
///
/// Replies are scripted per project. A project with a queue of replies hands
/// them out in order and repeats the last one; a project with nothing scripted
/// answers `reply from project <id>`.
#[derive(Clone, Default)]
pub struct MockAgentClient {
    replies: Arc<RwLock<HashMap<ProjectId, VecDeque<String>>>>,
    failures: Arc<RwLock<HashMap<ProjectId, String>>>,
    conversation_failures: Arc<RwLock<HashMap<ProjectId, String>>>,
    latencies: Arc<RwLock<HashMap<ProjectId, Duration>>>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    counter: Arc<AtomicUsize>,
}

impl MockAgentClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a reply for a project. Repeated calls queue further replies.
    pub fn with_reply(self, project_id: ProjectId, reply: impl Into<String>) -> Self {
        self.replies
            .write()
            .entry(project_id)
            .or_default()
            .push_back(reply.into());
        self
    }

    /// Make every message sent to the project fail with the given text.
    pub fn with_failure(self, project_id: ProjectId, message: impl Into<String>) -> Self {
        self.failures.write().insert(project_id, message.into());
        self
    }

    /// Make opening a conversation in the project fail.
    pub fn with_conversation_failure(
        self,
        project_id: ProjectId,
        message: impl Into<String>,
    ) -> Self {
        self.conversation_failures
            .write()
            .insert(project_id, message.into());
        self
    }

    /// Delay every message reply from the project.
    pub fn with_latency(self, project_id: ProjectId, latency: Duration) -> Self {
        self.latencies.write().insert(project_id, latency);
        self
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Messages sent to one project, in call order.
    pub fn messages_to(&self, project_id: ProjectId) -> Vec<CapturedCall> {
        self.get_method_calls("send_message")
            .into_iter()
            .filter(|c| c.project_id == project_id)
            .collect()
    }

    /// Number of conversations opened in one project.
    pub fn conversation_count(&self, project_id: ProjectId) -> usize {
        self.get_method_calls("create_conversation")
            .iter()
            .filter(|c| c.project_id == project_id)
            .count()
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    fn next_reply(&self, project_id: ProjectId) -> String {
        let mut replies = self.replies.write();
        match replies.get_mut(&project_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => format!("reply from project {}", project_id),
        }
    }
}

#[async_trait]
impl AgentClient for MockAgentClient {
    async fn create_conversation(
        &self,
        project_id: ProjectId,
        name: Option<String>,
    ) -> ClientResult<Conversation> {
        self.record_call(CapturedCall {
            method: "create_conversation".to_string(),
            project_id,
            session_id: None,
            prompt: None,
        });

        if let Some(msg) = self.conversation_failures.read().get(&project_id).cloned() {
            return Err(ClientError::Api {
                status: 503,
                body: msg,
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(Conversation {
            id: Some(n.to_string()),
            session_id: format!("session-{}-{}", project_id, n),
            name,
        })
    }

    async fn send_message(&self, request: &SendMessage) -> ClientResult<Reply> {
        self.record_call(CapturedCall {
            method: "send_message".to_string(),
            project_id: request.project_id,
            session_id: Some(request.session_id.clone()),
            prompt: Some(request.prompt.clone()),
        });

        let latency = self.latencies.read().get(&request.project_id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(msg) = self.failures.read().get(&request.project_id).cloned() {
            return Err(ClientError::Api {
                status: 500,
                body: msg,
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(Reply {
            id: Some(format!("msg-{}", n)),
            message: self.next_reply(request.project_id),
            created_at: Some(Utc::now()),
            conversation_id: Some(request.session_id.clone()),
        })
    }
}
