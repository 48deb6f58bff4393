//! Scope and shape checks for inbound change notifications.

use cisprobe_model::{
    ChangeNotification, ComplianceType, ScanRequest, Verdict,
};
use tracing::debug;

use crate::config::DEFAULT_RESOURCE_TYPE;

/// Annotation for resource types outside the evaluated scope.
pub const WRONG_RESOURCE_TYPE: &str = "Wrong resource type";
/// Annotation when the configuration names no usable instance id.
pub const MISSING_TARGET: &str =
    "configuration array is empty or instanceId missing";
/// Annotation when an in-scope item carries no region to scan in.
pub const MISSING_REGION: &str = "awsRegion missing";

/// Result of classifying a notification: either a final verdict, or a scan
/// request for the prober.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Decided without scanning.
    Verdict(Verdict),
    /// In scope and well formed; scan this target.
    Proceed(ScanRequest),
}

/// Decides whether a notification is in scope before anything remote runs.
///
/// Only the resource type is read for out-of-scope notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gatekeeper {
    supported_resource_type: String,
}

impl Default for Gatekeeper {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_TYPE)
    }
}

impl Gatekeeper {
    /// Gatekeeper admitting only `supported_resource_type`.
    pub fn new(supported_resource_type: impl Into<String>) -> Self {
        Self {
            supported_resource_type: supported_resource_type.into(),
        }
    }

    /// The one resource type that gets scanned.
    pub fn supported_resource_type(&self) -> &str {
        &self.supported_resource_type
    }

    /// Classifies one notification. Never fails; malformed input becomes an
    /// `INSUFFICIENT_DATA` verdict.
    pub fn classify(&self, notification: &ChangeNotification) -> Admission {
        if notification.resource_type != self.supported_resource_type {
            debug!(
                resource_type = %notification.resource_type,
                supported = %self.supported_resource_type,
                "resource type out of scope"
            );
            return Admission::Verdict(Verdict::new(
                ComplianceType::NotApplicable,
                WRONG_RESOURCE_TYPE,
            ));
        }

        let Some(target_id) = notification.target_id() else {
            debug!(
                resource_id = %notification.resource_id,
                "cannot retrieve instance id"
            );
            return Admission::Verdict(Verdict::new(
                ComplianceType::InsufficientData,
                MISSING_TARGET,
            ));
        };

        let Some(region) = notification.scan_region() else {
            debug!(target_id = %target_id, "notification carries no region");
            return Admission::Verdict(Verdict::new(
                ComplianceType::InsufficientData,
                MISSING_REGION,
            ));
        };

        debug!(target_id = %target_id, region, "resource admitted for scan");
        Admission::Proceed(ScanRequest::new(target_id, region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cisprobe_model::ResourceConfiguration;

    fn notification(
        resource_type: &str,
        configuration: Option<ResourceConfiguration>,
    ) -> ChangeNotification {
        ChangeNotification {
            resource_type: resource_type.to_string(),
            resource_id: "i-123".to_string(),
            region: Some("us-east-1".to_string()),
            configuration,
            capture_timestamp: "2024-05-01T10:00:00.000Z".to_string(),
            result_token: "token".to_string(),
        }
    }

    #[test]
    fn other_resource_types_are_not_applicable() {
        let gate = Gatekeeper::default();
        let admission = gate.classify(&notification(
            "AWS::S3::Bucket",
            Some(ResourceConfiguration::with_instance_id("i-123")),
        ));
        assert_eq!(
            admission,
            Admission::Verdict(Verdict::new(
                ComplianceType::NotApplicable,
                "Wrong resource type"
            ))
        );
    }

    #[test]
    fn wrong_type_wins_over_missing_configuration() {
        let gate = Gatekeeper::default();
        let admission = gate.classify(&notification("OTHER", None));
        assert!(matches!(
            admission,
            Admission::Verdict(Verdict {
                compliance_type: ComplianceType::NotApplicable,
                ..
            })
        ));
    }

    #[test]
    fn missing_configuration_is_insufficient_data() {
        let gate = Gatekeeper::default();
        let admission =
            gate.classify(&notification(DEFAULT_RESOURCE_TYPE, None));
        assert_eq!(
            admission,
            Admission::Verdict(Verdict::new(
                ComplianceType::InsufficientData,
                MISSING_TARGET
            ))
        );
    }

    #[test]
    fn missing_or_empty_instance_id_is_insufficient_data() {
        let gate = Gatekeeper::default();
        for config in [
            ResourceConfiguration::default(),
            ResourceConfiguration::with_instance_id(""),
        ] {
            let admission = gate
                .classify(&notification(DEFAULT_RESOURCE_TYPE, Some(config)));
            assert!(matches!(
                admission,
                Admission::Verdict(Verdict {
                    compliance_type: ComplianceType::InsufficientData,
                    ..
                })
            ));
        }
    }

    #[test]
    fn well_formed_instance_proceeds_with_region() {
        let gate = Gatekeeper::default();
        let admission = gate.classify(&notification(
            DEFAULT_RESOURCE_TYPE,
            Some(ResourceConfiguration::with_instance_id("i-123")),
        ));
        match admission {
            Admission::Proceed(request) => {
                assert_eq!(request.target_id.as_str(), "i-123");
                assert_eq!(request.region, "us-east-1");
            }
            other => panic!("expected scan request, got {other:?}"),
        }
    }

    #[test]
    fn in_scope_item_without_region_is_insufficient_data() {
        let gate = Gatekeeper::default();
        let mut notification = notification(
            DEFAULT_RESOURCE_TYPE,
            Some(ResourceConfiguration::with_instance_id("i-123")),
        );
        notification.region = None;

        assert_eq!(
            gate.classify(&notification),
            Admission::Verdict(Verdict::new(
                ComplianceType::InsufficientData,
                MISSING_REGION
            ))
        );
    }

    #[test]
    fn out_of_scope_item_is_not_inspected_further() {
        let gate = Gatekeeper::default();
        let mut notification = notification(
            "AWS::S3::Bucket",
            Some(ResourceConfiguration::new(serde_json::json!({
                "instanceId": { "unexpected": true }
            }))),
        );
        notification.region = None;

        assert_eq!(
            gate.classify(&notification),
            Admission::Verdict(Verdict::new(
                ComplianceType::NotApplicable,
                WRONG_RESOURCE_TYPE
            ))
        );
    }

    #[test]
    fn non_string_instance_id_is_insufficient_data() {
        let gate = Gatekeeper::default();
        let admission = gate.classify(&notification(
            DEFAULT_RESOURCE_TYPE,
            Some(ResourceConfiguration::new(serde_json::json!({
                "instanceId": 7
            }))),
        ));
        assert_eq!(
            admission,
            Admission::Verdict(Verdict::new(
                ComplianceType::InsufficientData,
                MISSING_TARGET
            ))
        );
    }

    #[test]
    fn supported_type_is_configurable() {
        let gate = Gatekeeper::new("AWS::EC2::Host");
        let admission = gate.classify(&notification(
            "AWS::EC2::Host",
            Some(ResourceConfiguration::with_instance_id("h-1")),
        ));
        assert!(matches!(admission, Admission::Proceed(_)));
    }
}
