//! Evaluator configuration types.
//!
//! These structures are loaded by `cisprobe-config` and consumed here, so the
//! defaults below are the single source of truth for both crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resource kind evaluated unless configured otherwise.
pub const DEFAULT_RESOURCE_TYPE: &str = "AWS::EC2::Instance";

/// Shortest wait allowed between two status queries.
pub const MIN_POLL_INTERVAL_MS: u64 = 1_000;

/// Annotation length accepted by the reporting service.
pub const MAX_ANNOTATION_CHARS: usize = 256;

const DEFAULT_SOURCE_INFO: &str = r#"{ "owner":"dev-sec", "repository":"cis-dil-benchmark", "path": "", "getOptions" : "branch:master", "tokenInfo":"{{ssm-secure:github-personal-token-InSpec}}" }"#;

/// Everything the evaluator needs to run one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// The only resource type that gets scanned; everything else is
    /// reported as not applicable.
    pub resource_type: String,
    /// Document dispatched against admitted targets.
    pub benchmark: BenchmarkDocument,
    /// Bounds for waiting on the scan.
    pub poll: PollPolicy,
    /// Upper bound on annotation length before it is handed to the reporter.
    pub annotation_max_chars: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            resource_type: DEFAULT_RESOURCE_TYPE.to_string(),
            benchmark: BenchmarkDocument::default(),
            poll: PollPolicy::default(),
            annotation_max_chars: MAX_ANNOTATION_CHARS,
        }
    }
}

/// The remote check definition executed against each target.
///
/// `parameters` is opaque to the evaluator and forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchmarkDocument {
    /// Document name known to the execution service.
    pub name: String,
    /// Plugin whose output is read when the document runs several steps.
    pub plugin_name: Option<String>,
    /// Human-facing benchmark name used in annotations.
    pub label: String,
    /// Document parameters.
    pub parameters: BTreeMap<String, Vec<String>>,
}

impl Default for BenchmarkDocument {
    fn default() -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "sourceInfo".to_string(),
            vec![DEFAULT_SOURCE_INFO.to_string()],
        );
        parameters
            .insert("sourceType".to_string(), vec!["GitHub".to_string()]);

        Self {
            name: "AWS-RunInspecChecks".to_string(),
            plugin_name: Some("runInSpecLinux".to_string()),
            label: "cis-dil-benchmark".to_string(),
            parameters,
        }
    }
}

/// Bounds for the status poll loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Wait between two status queries. Values below
    /// [`MIN_POLL_INTERVAL_MS`] are raised to it.
    pub interval_ms: u64,
    /// Status queries allowed before the scan is declared undetermined.
    pub max_attempts: u32,
    /// Wall-clock budget for polling, measured from the first query.
    pub max_duration_ms: u64,
}

impl PollPolicy {
    /// The configured interval, never shorter than one second.
    pub fn interval(&self) -> core::time::Duration {
        core::time::Duration::from_millis(
            self.interval_ms.max(MIN_POLL_INTERVAL_MS),
        )
    }

    /// Hard bound on polling; no status query is issued after it.
    pub fn max_duration(&self) -> core::time::Duration {
        core::time::Duration::from_millis(self.max_duration_ms)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            max_attempts: 720,
            // Leaves headroom inside a 15 minute invocation budget.
            max_duration_ms: 13 * 60 * 1_000,
        }
    }
}
