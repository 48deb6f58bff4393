//! Dispatches the benchmark scan and polls it to a verdict.
//!
//! The state machine is `Dispatched -> Polling -> {Compliant, NonCompliant}`.
//! Polling loops on transient-unavailable replies and in-flight statuses until
//! either a terminal status arrives or the [`PollPolicy`] bounds run out, in
//! which case the scan is treated as undetermined and fails closed.

use std::{fmt, sync::Arc, time::Duration};

use cisprobe_model::{
    ComplianceType, ExecutionSnapshot, ScanExecution, ScanRequest, TargetId,
    Verdict,
};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::config::{BenchmarkDocument, PollPolicy, ProbeConfig};
use crate::error::Result;
use crate::parser::{
    ComplianceOutputParser, MarkerPhraseParser, OutputAssessment,
};
use crate::ports::{CheckExecutionService, DispatchRequest, StatusQuery};

/// Attempt counter and deadline carried across poll iterations.
#[derive(Debug)]
struct PollState {
    attempts: u32,
    max_attempts: u32,
    deadline: Instant,
}

impl PollState {
    fn start(policy: &PollPolicy) -> Self {
        Self {
            attempts: 0,
            max_attempts: policy.max_attempts,
            deadline: Instant::now() + policy.max_duration(),
        }
    }

    /// Records one unsettled query and returns how long to wait before the
    /// next one, or `None` once either bound is spent. The wait is clamped
    /// to the deadline, so the next query never lands after it.
    fn next_wait(&mut self, interval: Duration) -> Option<Duration> {
        self.attempts = self.attempts.saturating_add(1);
        if self.attempts >= self.max_attempts {
            return None;
        }
        let remaining =
            self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        Some(interval.min(remaining))
    }
}

/// Dispatches the benchmark against one target and polls it to a verdict.
pub struct ComplianceProber {
    checks: Arc<dyn CheckExecutionService>,
    parser: Arc<dyn ComplianceOutputParser>,
    benchmark: BenchmarkDocument,
    poll: PollPolicy,
}

impl fmt::Debug for ComplianceProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplianceProber")
            .field("checks", &"CheckExecutionService")
            .field("parser", &self.parser.name())
            .field("benchmark", &self.benchmark.name)
            .field("poll", &self.poll)
            .finish()
    }
}

impl ComplianceProber {
    /// Prober from explicit collaborators and bounds.
    pub fn new(
        checks: Arc<dyn CheckExecutionService>,
        parser: Arc<dyn ComplianceOutputParser>,
        benchmark: BenchmarkDocument,
        poll: PollPolicy,
    ) -> Self {
        Self {
            checks,
            parser,
            benchmark,
            poll,
        }
    }

    /// Prober using the default marker-phrase parser.
    pub fn from_config(
        checks: Arc<dyn CheckExecutionService>,
        config: &ProbeConfig,
    ) -> Self {
        Self::new(
            checks,
            Arc::new(MarkerPhraseParser::default()),
            config.benchmark.clone(),
            config.poll.clone(),
        )
    }

    /// The document dispatched for every scan.
    pub fn benchmark(&self) -> &BenchmarkDocument {
        &self.benchmark
    }

    /// Runs one scan against `request.target_id` and returns its verdict.
    ///
    /// A rejected dispatch is returned as an error: no scan happened, so
    /// there is nothing to base a verdict on.
    pub async fn probe(&self, request: &ScanRequest) -> Result<Verdict> {
        let execution = self.dispatch(request).await?;
        self.await_verdict(&execution).await
    }

    async fn dispatch(&self, request: &ScanRequest) -> Result<ScanExecution> {
        let dispatch = DispatchRequest {
            target_id: request.target_id.clone(),
            region: request.region.clone(),
            document_name: self.benchmark.name.clone(),
            parameters: self.benchmark.parameters.clone(),
        };

        let execution_id = self.checks.dispatch(&dispatch).await?;
        info!(
            execution_id = %execution_id,
            target_id = %request.target_id,
            region = %request.region,
            document = %self.benchmark.name,
            "benchmark scan dispatched"
        );

        Ok(ScanExecution::new(execution_id, request.target_id.clone()))
    }

    async fn await_verdict(
        &self,
        execution: &ScanExecution,
    ) -> Result<Verdict> {
        let query = StatusQuery {
            execution_id: execution.execution_id.clone(),
            target_id: execution.target_id.clone(),
            plugin_name: self.benchmark.plugin_name.clone(),
        };
        let mut state = PollState::start(&self.poll);

        loop {
            match self.checks.get_status(&query).await {
                Ok(snapshot) => {
                    if let Some(verdict) =
                        self.classify(&execution.target_id, &snapshot)
                    {
                        info!(
                            execution_id = %execution.execution_id,
                            status = %snapshot.status,
                            compliance = %verdict.compliance_type,
                            elapsed_ms = execution.elapsed_ms(),
                            "benchmark scan settled"
                        );
                        return Ok(verdict);
                    }
                    debug!(
                        execution_id = %execution.execution_id,
                        status = %snapshot.status,
                        attempt = state.attempts + 1,
                        "scan still running"
                    );
                }
                Err(err) if err.is_transient() => {
                    debug!(
                        execution_id = %execution.execution_id,
                        error = %err,
                        attempt = state.attempts + 1,
                        "waiting for the scan result"
                    );
                }
                Err(err) => return Err(err),
            }

            let Some(wait) = state.next_wait(self.poll.interval()) else {
                warn!(
                    execution_id = %execution.execution_id,
                    attempts = state.attempts,
                    elapsed_ms = execution.elapsed_ms(),
                    "poll budget exhausted before the scan settled"
                );
                return Ok(
                    self.undetermined(&execution.target_id, state.attempts)
                );
            };

            sleep(wait).await;
        }
    }

    /// Maps a status reading to a verdict, or `None` while still in flight.
    fn classify(
        &self,
        target_id: &TargetId,
        snapshot: &ExecutionSnapshot,
    ) -> Option<Verdict> {
        let status = snapshot.status;
        if status.is_failure() {
            return Some(Verdict::new(
                ComplianceType::NonCompliant,
                format!(
                    "{} scan was not successful. Resource {}'s state could not be determined. Marked NON_COMPLIANT for now.",
                    self.benchmark.label, target_id
                ),
            ));
        }
        if !status.is_terminal() {
            return None;
        }

        debug!(
            parser = self.parser.name(),
            "scan completed successfully, checking for non-compliant items"
        );
        let verdict = match self.parser.assess(&snapshot.standard_output) {
            OutputAssessment::Compliant => Verdict::new(
                ComplianceType::Compliant,
                format!("The resource {target_id} is compliant"),
            ),
            OutputAssessment::NonCompliant => Verdict::new(
                ComplianceType::NonCompliant,
                format!("The resource {target_id} is NOT compliant"),
            ),
        };
        Some(verdict)
    }

    fn undetermined(&self, target_id: &TargetId, attempts: u32) -> Verdict {
        Verdict::new(
            ComplianceType::NonCompliant,
            format!(
                "{} scan result was not available after {} status checks. Resource {}'s state could not be determined. Marked NON_COMPLIANT for now.",
                self.benchmark.label, attempts, target_id
            ),
        )
    }
}
