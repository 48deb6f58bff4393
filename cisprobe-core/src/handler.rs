//! One invocation end to end: decode, gatekeep, probe, report.

use std::{fmt, sync::Arc};

use cisprobe_model::{
    ChangeNotification, Evaluation, InvocationEnvelope, Verdict,
};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::gatekeeper::{Admission, Gatekeeper};
use crate::ports::{CheckExecutionService, ComplianceReporter};
use crate::prober::ComplianceProber;

/// Turns one invocation into exactly one reported evaluation.
pub struct EvaluationHandler {
    gatekeeper: Gatekeeper,
    prober: ComplianceProber,
    reporter: Arc<dyn ComplianceReporter>,
    annotation_max_chars: usize,
}

impl fmt::Debug for EvaluationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationHandler")
            .field("gatekeeper", &self.gatekeeper)
            .field("prober", &self.prober)
            .field("reporter", &"ComplianceReporter")
            .field("annotation_max_chars", &self.annotation_max_chars)
            .finish()
    }
}

impl EvaluationHandler {
    /// Handler from explicit parts.
    pub fn new(
        gatekeeper: Gatekeeper,
        prober: ComplianceProber,
        reporter: Arc<dyn ComplianceReporter>,
        annotation_max_chars: usize,
    ) -> Self {
        Self {
            gatekeeper,
            prober,
            reporter,
            annotation_max_chars,
        }
    }

    /// Handler wired from configuration with the default parser.
    pub fn from_config(
        config: &ProbeConfig,
        checks: Arc<dyn CheckExecutionService>,
        reporter: Arc<dyn ComplianceReporter>,
    ) -> Self {
        Self::new(
            Gatekeeper::new(config.resource_type.clone()),
            ComplianceProber::from_config(checks, config),
            reporter,
            config.annotation_max_chars,
        )
    }

    /// Decodes the raw envelope and evaluates the notification it carries.
    pub async fn handle(
        &self,
        envelope: &InvocationEnvelope,
    ) -> Result<Evaluation> {
        let notification = envelope.decode()?;
        self.handle_notification(&notification).await
    }

    /// Evaluates one notification and submits exactly one evaluation.
    ///
    /// Nothing is submitted when no verdict could be produced; the error is
    /// returned to the caller instead.
    pub async fn handle_notification(
        &self,
        notification: &ChangeNotification,
    ) -> Result<Evaluation> {
        let invocation_id = Uuid::now_v7();
        let span = info_span!(
            "evaluate",
            %invocation_id,
            resource_id = %notification.resource_id,
            resource_type = %notification.resource_type,
        );

        async move {
            let verdict = self
                .verdict_for(notification)
                .await?
                .truncated(self.annotation_max_chars);
            let evaluation = Evaluation::new(notification, verdict);

            self.reporter
                .put_evaluation(&evaluation, &notification.result_token)
                .await?;
            info!(
                compliance = %evaluation.compliance_type,
                annotation = %evaluation.annotation,
                "evaluation submitted"
            );
            Ok(evaluation)
        }
        .instrument(span)
        .await
    }

    /// The verdict for a notification, without reporting it.
    pub async fn verdict_for(
        &self,
        notification: &ChangeNotification,
    ) -> Result<Verdict> {
        match self.gatekeeper.classify(notification) {
            Admission::Verdict(verdict) => Ok(verdict),
            Admission::Proceed(request) => self.prober.probe(&request).await,
        }
    }
}
