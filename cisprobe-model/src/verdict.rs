use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notification::ChangeNotification;

const TRUNCATION_MARKER: &str = "...";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceType {
    Compliant,
    NonCompliant,
    NotApplicable,
    InsufficientData,
}

impl ComplianceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceType::Compliant => "COMPLIANT",
            ComplianceType::NonCompliant => "NON_COMPLIANT",
            ComplianceType::NotApplicable => "NOT_APPLICABLE",
            ComplianceType::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl fmt::Display for ComplianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single compliance decision produced for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub compliance_type: ComplianceType,
    pub annotation: String,
}

impl Verdict {
    pub fn new(
        compliance_type: ComplianceType,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            compliance_type,
            annotation: annotation.into(),
        }
    }

    /// Returns a copy whose annotation holds at most `max_chars` characters.
    ///
    /// Over-long annotations keep their prefix and end in `...` when there is
    /// room for the marker.
    pub fn truncated(&self, max_chars: usize) -> Self {
        if self.annotation.chars().count() <= max_chars {
            return self.clone();
        }

        let annotation = if max_chars > TRUNCATION_MARKER.len() {
            let keep = max_chars - TRUNCATION_MARKER.len();
            let mut out: String = self.annotation.chars().take(keep).collect();
            out.push_str(TRUNCATION_MARKER);
            out
        } else {
            self.annotation.chars().take(max_chars).collect()
        };

        Self {
            compliance_type: self.compliance_type,
            annotation,
        }
    }
}

/// Record submitted to the compliance reporting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Evaluation {
    pub compliance_resource_type: String,
    pub compliance_resource_id: String,
    pub compliance_type: ComplianceType,
    pub annotation: String,
    pub ordering_timestamp: String,
}

impl Evaluation {
    pub fn new(notification: &ChangeNotification, verdict: Verdict) -> Self {
        Self {
            compliance_resource_type: notification.resource_type.clone(),
            compliance_resource_id: notification.resource_id.clone(),
            compliance_type: verdict.compliance_type,
            annotation: verdict.annotation,
            ordering_timestamp: notification.capture_timestamp.clone(),
        }
    }
}
