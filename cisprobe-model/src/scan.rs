use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Unique instance identifier of the resource a scan runs against.
///
/// Never empty: construction through [`TargetId::parse`] rejects blank text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle returned by the check-execution service on dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An in-scope, well-formed request to scan one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub target_id: TargetId,
    pub region: String,
}

impl ScanRequest {
    pub fn new(target_id: TargetId, region: impl Into<String>) -> Self {
        Self {
            target_id,
            region: region.into(),
        }
    }
}

/// A dispatched remote check. Lives for one invocation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanExecution {
    pub execution_id: ExecutionId,
    pub target_id: TargetId,
    pub dispatched_at: DateTime<Utc>,
}

impl ScanExecution {
    pub fn new(execution_id: ExecutionId, target_id: TargetId) -> Self {
        Self {
            execution_id,
            target_id,
            dispatched_at: Utc::now(),
        }
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.dispatched_at).num_milliseconds()
    }
}

/// Status of a remote check execution.
///
/// `Success` and the six failure variants are terminal; the rest mean the
/// execution is still in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    Pending,
    InProgress,
    Delayed,
    Cancelling,
    Success,
    DeliveryTimedOut,
    ExecutionTimedOut,
    Failed,
    Canceled,
    Undeliverable,
    Terminated,
}

impl ExecutionStatus {
    pub const TERMINAL_FAILURES: [ExecutionStatus; 6] = [
        ExecutionStatus::DeliveryTimedOut,
        ExecutionStatus::ExecutionTimedOut,
        ExecutionStatus::Failed,
        ExecutionStatus::Canceled,
        ExecutionStatus::Undeliverable,
        ExecutionStatus::Terminated,
    ];

    pub fn is_terminal(self) -> bool {
        self == ExecutionStatus::Success || self.is_failure()
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            ExecutionStatus::DeliveryTimedOut
                | ExecutionStatus::ExecutionTimedOut
                | ExecutionStatus::Failed
                | ExecutionStatus::Canceled
                | ExecutionStatus::Undeliverable
                | ExecutionStatus::Terminated
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "Pending",
            ExecutionStatus::InProgress => "InProgress",
            ExecutionStatus::Delayed => "Delayed",
            ExecutionStatus::Cancelling => "Cancelling",
            ExecutionStatus::Success => "Success",
            ExecutionStatus::DeliveryTimedOut => "Delivery Timed Out",
            ExecutionStatus::ExecutionTimedOut => "Execution Timed Out",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Canceled => "Canceled",
            ExecutionStatus::Undeliverable => "Undeliverable",
            ExecutionStatus::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accepts both the coarse status and the detailed status spellings.
        let status = match s.trim() {
            "Pending" => ExecutionStatus::Pending,
            "InProgress" | "In Progress" => ExecutionStatus::InProgress,
            "Delayed" => ExecutionStatus::Delayed,
            "Cancelling" => ExecutionStatus::Cancelling,
            "Success" => ExecutionStatus::Success,
            "Delivery Timed Out" => ExecutionStatus::DeliveryTimedOut,
            "Execution Timed Out" | "TimedOut" => {
                ExecutionStatus::ExecutionTimedOut
            }
            "Failed" => ExecutionStatus::Failed,
            "Canceled" | "Cancelled" => ExecutionStatus::Canceled,
            "Undeliverable" => ExecutionStatus::Undeliverable,
            "Terminated" => ExecutionStatus::Terminated,
            other => return Err(ModelError::UnknownStatus(other.to_string())),
        };
        Ok(status)
    }
}

impl Serialize for ExecutionStatus {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExecutionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One status reading for a dispatched execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub standard_output: String,
}

impl ExecutionSnapshot {
    pub fn new(
        status: ExecutionStatus,
        standard_output: impl Into<String>,
    ) -> Self {
        Self {
            status,
            standard_output: standard_output.into(),
        }
    }
}
