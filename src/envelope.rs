//! The notify envelope: the fixed-shape JSON message used to issue
//! stateful commands (arm/disarm, mode changes, camera toggles) to a
//! device through the notify endpoint.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Action verb of a notify envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyAction {
    Set,
    Get,
    Add,
    Delete,
}

/// A single notify message addressed to a device.
///
/// The client populates the fields per operation; it never interprets
/// `properties` beyond passing it along. Built with [`NotifyEnvelope::new`]
/// so `from` always has the `"{user_id}_web"` shape the service expects.
#[derive(Debug, Clone, Serialize)]
pub struct NotifyEnvelope {
    pub from: String,
    pub to: String,
    pub action: NotifyAction,
    pub resource: String,
    // hmsweb wants the strings "true"/"false" here, not JSON booleans
    #[serde(rename = "publishResponse", serialize_with = "bool_as_string")]
    pub publish_response: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

impl NotifyEnvelope {
    pub fn new(
        user_id: &str,
        device_id: &str,
        action: NotifyAction,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            from: format!("{user_id}_web"),
            to: device_id.to_string(),
            action,
            resource: resource.into(),
            publish_response: true,
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }
}

fn bool_as_string<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = NotifyEnvelope::new("USER-1", "DEV1", NotifyAction::Set, "modes")
            .with_properties(json!({"active": "mode1"}));

        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire["from"], "USER-1_web");
        assert_eq!(wire["to"], "DEV1");
        assert_eq!(wire["action"], "set");
        assert_eq!(wire["resource"], "modes");
        assert_eq!(wire["publishResponse"], "true");
        assert_eq!(wire["properties"]["active"], "mode1");
    }

    #[test]
    fn test_envelope_without_properties_omits_key() {
        let envelope = NotifyEnvelope::new("USER-1", "DEV1", NotifyAction::Delete, "modes/mode3");

        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire["action"], "delete");
        assert_eq!(wire["resource"], "modes/mode3");
        assert!(wire.get("properties").is_none());
    }
}
