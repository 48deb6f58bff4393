//! Inbound change notifications and the envelope they arrive in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::scan::TargetId;

/// Raw invocation payload delivered by the configuration-monitoring service.
///
/// `invoking_event` is itself a JSON document encoded as a string; it is
/// decoded lazily by [`InvocationEnvelope::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEnvelope {
    pub invoking_event: String,
    pub result_token: String,
}

impl InvocationEnvelope {
    pub fn new(
        invoking_event: impl Into<String>,
        result_token: impl Into<String>,
    ) -> Self {
        Self {
            invoking_event: invoking_event.into(),
            result_token: result_token.into(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(ModelError::Envelope)
    }

    /// Decode the nested invoking event into a [`ChangeNotification`].
    pub fn decode(&self) -> Result<ChangeNotification> {
        let event: InvokingEvent = serde_json::from_str(&self.invoking_event)
            .map_err(ModelError::InvokingEvent)?;
        Ok(ChangeNotification::from_item(
            event.configuration_item,
            self.result_token.clone(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokingEvent {
    pub configuration_item: ConfigurationItem,
}

/// Wire shape of the `configurationItem` object.
///
/// `resourceId` and `configurationItemCaptureTime` are echoed back on every
/// evaluation, so they are required. Everything else is only read once the
/// resource type is known to be in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationItem {
    pub resource_type: String,
    pub resource_id: String,
    #[serde(default)]
    pub aws_region: Option<String>,
    #[serde(default)]
    pub configuration: Option<ResourceConfiguration>,
    pub configuration_item_capture_time: String,
}

/// Resource-specific configuration blob, kept as raw JSON. Its shape varies
/// per resource type; only `instanceId` is ever interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceConfiguration(Value);

impl Default for ResourceConfiguration {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl ResourceConfiguration {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn with_instance_id(instance_id: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(
            "instanceId".to_string(),
            Value::String(instance_id.into()),
        );
        Self(Value::Object(map))
    }

    /// `instanceId` when it is present and a string.
    pub fn instance_id(&self) -> Option<&str> {
        self.0.get("instanceId").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// One resource change, as seen by the core. Built once per invocation and
/// only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeNotification {
    pub resource_type: String,
    pub resource_id: String,
    pub region: Option<String>,
    pub configuration: Option<ResourceConfiguration>,
    pub capture_timestamp: String,
    pub result_token: String,
}

impl ChangeNotification {
    pub fn from_item(item: ConfigurationItem, result_token: String) -> Self {
        Self {
            resource_type: item.resource_type,
            resource_id: item.resource_id,
            region: item.aws_region,
            configuration: item.configuration,
            capture_timestamp: item.configuration_item_capture_time,
            result_token,
        }
    }

    /// The scan target, if the configuration names a usable instance id.
    pub fn target_id(&self) -> Option<TargetId> {
        self.configuration
            .as_ref()
            .and_then(ResourceConfiguration::instance_id)
            .and_then(TargetId::parse)
    }

    /// The region to scan in, if the item carried a non-blank one.
    pub fn scan_region(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|region| !region.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(item: Value) -> InvocationEnvelope {
        let event = json!({ "configurationItem": item });
        InvocationEnvelope::new(event.to_string(), "token-1")
    }

    #[test]
    fn decodes_nested_invoking_event() {
        let env = envelope(json!({
            "resourceType": "AWS::EC2::Instance",
            "resourceId": "i-123",
            "awsRegion": "eu-west-1",
            "configuration": {
                "instanceId": "i-123",
                "state": { "name": "running" }
            },
            "configurationItemCaptureTime": "2024-01-02T03:04:05.000Z"
        }));

        let notification = env.decode().expect("decode");
        assert_eq!(notification.resource_type, "AWS::EC2::Instance");
        assert_eq!(notification.scan_region(), Some("eu-west-1"));
        assert_eq!(notification.result_token, "token-1");
        assert_eq!(
            notification.target_id().map(|t| t.to_string()).as_deref(),
            Some("i-123")
        );
        let config = notification.configuration.expect("configuration");
        assert_eq!(config.get("state"), Some(&json!({ "name": "running" })));
    }

    #[test]
    fn null_configuration_has_no_target() {
        let env = envelope(json!({
            "resourceType": "AWS::EC2::Instance",
            "resourceId": "i-123",
            "awsRegion": "eu-west-1",
            "configuration": null,
            "configurationItemCaptureTime": "2024-01-02T03:04:05.000Z"
        }));

        let notification = env.decode().expect("decode");
        assert!(notification.configuration.is_none());
        assert!(notification.target_id().is_none());
    }

    #[test]
    fn blank_instance_id_has_no_target() {
        let env = envelope(json!({
            "resourceType": "AWS::EC2::Instance",
            "resourceId": "i-123",
            "awsRegion": "eu-west-1",
            "configuration": { "instanceId": "  " },
            "configurationItemCaptureTime": "2024-01-02T03:04:05.000Z"
        }));

        assert!(env.decode().expect("decode").target_id().is_none());
    }

    #[test]
    fn odd_configuration_shapes_still_decode() {
        for configuration in [
            json!({ "instanceId": 42 }),
            json!(["not", "an", "object"]),
            json!("opaque"),
        ] {
            let env = envelope(json!({
                "resourceType": "AWS::S3::Bucket",
                "resourceId": "bucket-1",
                "configuration": configuration,
                "configurationItemCaptureTime": "2024-01-02T03:04:05.000Z"
            }));

            let notification = env.decode().expect("decode");
            assert!(notification.target_id().is_none());
            assert!(notification.scan_region().is_none());
        }
    }

    #[test]
    fn malformed_invoking_event_is_reported() {
        let env = InvocationEnvelope::new("{not json", "token");
        let err = env.decode().expect_err("should fail");
        assert!(matches!(err, ModelError::InvokingEvent(_)));
    }

    #[test]
    fn envelope_parses_from_camel_case_json() {
        let raw = json!({
            "invokingEvent": "{}",
            "resultToken": "abc",
            "ruleParameters": "{}"
        })
        .to_string();
        let env = InvocationEnvelope::from_json(&raw).expect("envelope");
        assert_eq!(env.result_token, "abc");
    }
}
