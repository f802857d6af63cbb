//! The REST document: shared request/response envelope for method and
//! action invocations on a single resource.

use crate::value::TypedValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDocument {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionInvocation>,
}

impl ProtocolDocument {
    pub fn method(path: impl Into<String>, invocation: MethodInvocation) -> Self {
        Self {
            path: path.into(),
            method: Some(invocation),
            action: None,
        }
    }

    pub fn action(path: impl Into<String>, invocation: ActionInvocation) -> Self {
        Self {
            path: path.into(),
            method: None,
            action: Some(invocation),
        }
    }
}

/// Media type plus (optionally) the encoded representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representation: Option<String>,
}

impl Payload {
    pub fn new(media_type: impl Into<String>, representation: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            representation: Some(representation.into()),
        }
    }

    /// A payload slot that names the expected media type but carries nothing yet
    pub fn expecting(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            representation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInvocation {
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Payload>,
}

impl MethodInvocation {
    pub fn new(method_type: impl Into<String>) -> Self {
        Self {
            method_type: method_type.into(),
            request: None,
            response: None,
        }
    }

    pub fn with_request(
        mut self,
        media_type: impl Into<String>,
        representation: impl Into<String>,
    ) -> Self {
        self.request = Some(Payload::new(media_type, representation));
        self
    }

    pub fn accepting(mut self, media_type: impl Into<String>) -> Self {
        self.response = Some(Payload::expecting(media_type));
        self
    }

    /// Representation carried by the response, if any
    pub fn response_representation(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|payload| payload.representation.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: TypedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TypedValue>,
}

impl ActionInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            result: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            value,
        });
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&TypedValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_document_wire_shape() {
        let doc = ProtocolDocument::method(
            "/light/1",
            MethodInvocation::new("put")
                .with_request("text/plain", "off")
                .accepting("text/plain"),
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            json!({
                "path": "/light/1",
                "method": {
                    "type": "put",
                    "request": {"mediaType": "text/plain", "representation": "off"},
                    "response": {"mediaType": "text/plain"}
                }
            })
        );
        let back: ProtocolDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_action_document_wire_shape() {
        let doc = ProtocolDocument::action(
            "/light/1",
            ActionInvocation::new("setBrightness").with_parameter("level", TypedValue::Integer(80)),
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            json!({
                "path": "/light/1",
                "action": {
                    "name": "setBrightness",
                    "parameters": [
                        {"name": "level", "value": {"type": "INTEGER", "value": 80}}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let doc: ProtocolDocument = serde_json::from_value(json!({
            "path": "/x",
            "action": {"name": "reset"}
        }))
        .unwrap();
        let action = doc.action.unwrap();
        assert!(action.parameters.is_empty());
        assert!(action.result.is_none());
        assert!(doc.method.is_none());
    }

    #[test]
    fn test_parameter_lookup() {
        let inv = ActionInvocation::new("a")
            .with_parameter("x", TypedValue::Boolean(false))
            .with_parameter("y", TypedValue::String("s".into()));
        assert_eq!(inv.parameter("y"), Some(&TypedValue::String("s".into())));
        assert_eq!(inv.parameter("z"), None);
    }
}
