//! In-memory collaborators.
//!
//! `ScriptedCheckService` replays a fixed list of status replies and records
//! everything it was asked; `RecordingReporter` keeps every submitted
//! evaluation. Both back the test suites and local dry runs.

use std::collections::VecDeque;

use async_trait::async_trait;
use cisprobe_model::{
    Evaluation, ExecutionId, ExecutionSnapshot, ExecutionStatus,
};
use tokio::sync::Mutex;

use crate::error::{ProbeError, Result};
use crate::ports::{
    CheckExecutionService, ComplianceReporter, DispatchRequest, StatusQuery,
};

/// One scripted answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReply {
    /// A status reading.
    Snapshot(ExecutionSnapshot),
    /// The execution record does not exist yet.
    Unavailable,
    /// Rate limited.
    Throttled,
    /// A non-retryable query failure.
    Fatal(String),
}

impl StatusReply {
    /// Shorthand for a [`StatusReply::Snapshot`].
    pub fn snapshot(status: ExecutionStatus, output: &str) -> Self {
        StatusReply::Snapshot(ExecutionSnapshot::new(status, output))
    }

    fn into_result(self) -> Result<ExecutionSnapshot> {
        match self {
            StatusReply::Snapshot(snapshot) => Ok(snapshot),
            StatusReply::Unavailable => Err(ProbeError::ExecutionUnavailable(
                "invocation does not exist".to_string(),
            )),
            StatusReply::Throttled => {
                Err(ProbeError::Throttled("rate exceeded".to_string()))
            }
            StatusReply::Fatal(msg) => Err(ProbeError::StatusQuery(msg)),
        }
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<StatusReply>,
    last: Option<StatusReply>,
    dispatches: Vec<DispatchRequest>,
    queries: Vec<StatusQuery>,
}

/// Check-execution service driven by a reply script.
///
/// Replies are consumed in order; once the script runs dry the final reply
/// repeats. An empty script answers every query with
/// [`StatusReply::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedCheckService {
    state: Mutex<ScriptState>,
    dispatch_rejection: Option<String>,
}

impl ScriptedCheckService {
    /// Service with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends replies to the script.
    pub fn with_replies(
        mut self,
        replies: impl IntoIterator<Item = StatusReply>,
    ) -> Self {
        self.state.get_mut().replies.extend(replies);
        self
    }

    /// Make every dispatch fail with [`ProbeError::DispatchRejected`].
    pub fn rejecting_dispatch(mut self, reason: impl Into<String>) -> Self {
        self.dispatch_rejection = Some(reason.into());
        self
    }

    /// Execution id handed out for the `nth` dispatch (1-based).
    pub fn issued_execution_id(&self, nth: usize) -> ExecutionId {
        ExecutionId::new(format!("exec-{nth:04}"))
    }

    /// Every dispatch received so far.
    pub async fn dispatches(&self) -> Vec<DispatchRequest> {
        self.state.lock().await.dispatches.clone()
    }

    /// Every status query received so far.
    pub async fn status_queries(&self) -> Vec<StatusQuery> {
        self.state.lock().await.queries.clone()
    }
}

#[async_trait]
impl CheckExecutionService for ScriptedCheckService {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<ExecutionId> {
        if let Some(reason) = &self.dispatch_rejection {
            return Err(ProbeError::DispatchRejected(reason.clone()));
        }

        let mut guard = self.state.lock().await;
        guard.dispatches.push(request.clone());
        Ok(self.issued_execution_id(guard.dispatches.len()))
    }

    async fn get_status(
        &self,
        query: &StatusQuery,
    ) -> Result<ExecutionSnapshot> {
        let mut guard = self.state.lock().await;
        guard.queries.push(query.clone());

        let reply = match guard.replies.pop_front() {
            Some(reply) => {
                guard.last = Some(reply.clone());
                reply
            }
            None => guard.last.clone().unwrap_or(StatusReply::Unavailable),
        };
        reply.into_result()
    }
}

/// Reporter that keeps every evaluation it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    submissions: Mutex<Vec<(Evaluation, String)>>,
    failure: Option<String>,
}

impl RecordingReporter {
    /// Reporter accepting every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every submission fail with [`ProbeError::Reporting`].
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            submissions: Mutex::default(),
            failure: Some(reason.into()),
        }
    }

    /// Submitted evaluations paired with their result tokens.
    pub async fn submissions(&self) -> Vec<(Evaluation, String)> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl ComplianceReporter for RecordingReporter {
    async fn put_evaluation(
        &self,
        evaluation: &Evaluation,
        result_token: &str,
    ) -> Result<()> {
        if let Some(reason) = &self.failure {
            return Err(ProbeError::Reporting(reason.clone()));
        }
        self.submissions
            .lock()
            .await
            .push((evaluation.clone(), result_token.to_string()));
        Ok(())
    }
}
