//! Collaborator contracts for the remote services the evaluator talks to.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cisprobe_model::{Evaluation, ExecutionId, ExecutionSnapshot, TargetId};

use crate::error::Result;

/// A request to run the benchmark document against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Instance the document runs on.
    pub target_id: TargetId,
    /// Region the instance lives in.
    pub region: String,
    /// Name of the benchmark document.
    pub document_name: String,
    /// Document parameters, forwarded verbatim.
    pub parameters: BTreeMap<String, Vec<String>>,
}

/// Identifies the execution record to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    /// Handle returned by [`CheckExecutionService::dispatch`].
    pub execution_id: ExecutionId,
    /// Instance the execution ran on.
    pub target_id: TargetId,
    /// Plugin whose output to read, when the document has several.
    pub plugin_name: Option<String>,
}

/// Remote command-execution service.
///
/// `get_status` reports a record that does not exist yet as
/// [`ProbeError::ExecutionUnavailable`](crate::error::ProbeError::ExecutionUnavailable).
#[async_trait]
pub trait CheckExecutionService: Send + Sync {
    /// Starts the document on the target and returns the execution handle.
    async fn dispatch(&self, request: &DispatchRequest) -> Result<ExecutionId>;

    /// Reads the current status and output of a dispatched execution.
    async fn get_status(&self, query: &StatusQuery)
    -> Result<ExecutionSnapshot>;
}

/// Compliance reporting service. Receives exactly one evaluation per
/// invocation.
#[async_trait]
pub trait ComplianceReporter: Send + Sync {
    /// Submits one evaluation under the invocation's result token.
    async fn put_evaluation(
        &self,
        evaluation: &Evaluation,
        result_token: &str,
    ) -> Result<()>;
}

#[cfg(test)]
mockall::mock! {
    pub ReporterPort {}

    #[async_trait]
    impl ComplianceReporter for ReporterPort {
        async fn put_evaluation(
            &self,
            evaluation: &Evaluation,
            result_token: &str,
        ) -> Result<()>;
    }
}
