//! Shared fixtures for core integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use cisprobe_core::config::{PollPolicy, ProbeConfig};
use cisprobe_core::handler::EvaluationHandler;
use cisprobe_core::testing::{RecordingReporter, ScriptedCheckService};
use cisprobe_model::{ChangeNotification, ResourceConfiguration};

pub const SUPPORTED: &str = "AWS::EC2::Instance";
pub const CAPTURE_TIME: &str = "2024-05-01T10:00:00.000Z";
pub const RESULT_TOKEN: &str = "result-token-1";

pub const CLEAN_OUTPUT: &str =
    "Profile Summary: passed all checks, and 0 non-compliant items found";
pub const DIRTY_OUTPUT: &str =
    "Profile Summary: 140 compliant items and 3 non-compliant items found";

pub fn notification(
    resource_type: &str,
    instance_id: Option<&str>,
) -> ChangeNotification {
    ChangeNotification {
        resource_type: resource_type.to_string(),
        resource_id: "i-123".to_string(),
        region: Some("us-east-1".to_string()),
        configuration: instance_id.map(ResourceConfiguration::with_instance_id),
        capture_timestamp: CAPTURE_TIME.to_string(),
        result_token: RESULT_TOKEN.to_string(),
    }
}

pub fn config() -> ProbeConfig {
    ProbeConfig {
        poll: PollPolicy {
            interval_ms: 1_000,
            max_attempts: 30,
            max_duration_ms: 120_000,
        },
        ..ProbeConfig::default()
    }
}

pub struct Harness {
    pub checks: Arc<ScriptedCheckService>,
    pub reporter: Arc<RecordingReporter>,
    pub handler: EvaluationHandler,
}

pub fn harness(checks: ScriptedCheckService) -> Harness {
    let checks = Arc::new(checks);
    let reporter = Arc::new(RecordingReporter::new());
    let handler = EvaluationHandler::from_config(
        &config(),
        checks.clone(),
        reporter.clone(),
    );
    Harness {
        checks,
        reporter,
        handler,
    }
}
