//! Capability documents (XWADL): the machine-readable description of the
//! methods and actions a resource offers.

use crate::value::ParameterType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDocument {
    pub path: String,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
    #[serde(default)]
    pub actions: Vec<ActionNode>,
    /// Nodes appended by container plugins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionNode>,
}

impl CapabilityDocument {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
            actions: Vec::new(),
            extensions: Vec::new(),
        }
    }

    /// First method node that negotiates to the given media types.
    /// Absence must match absence, like the dispatcher.
    pub fn find_method(
        &self,
        method_type: &str,
        consumes: Option<&str>,
        produces: Option<&str>,
    ) -> Option<&MethodNode> {
        self.methods.iter().find(|m| {
            m.method_type == method_type
                && m.request.as_ref().map(|r| r.media_type.as_str()) == consumes
                && m.response.as_ref().map(|r| r.media_type.as_str()) == produces
        })
    }

    pub fn find_action(&self, name: &str) -> Option<&ActionNode> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn extensions_of<'a>(&'a self, plugin: &'a str) -> impl Iterator<Item = &'a ExtensionNode> {
        self.extensions.iter().filter(move |e| e.plugin == plugin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    pub title: String,
    pub text: String,
}

impl Documentation {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodNode {
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Documentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestNode {
    pub media_type: String,
    /// Example payloads offered by the codec
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseNode {
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Documentation>,
    #[serde(default)]
    pub parameters: Vec<ParameterNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultNode>,
}

impl ActionNode {
    pub fn parameter(&self, name: &str) -> Option<&ParameterNode> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterNode {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Documentation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultNode {
    #[serde(rename = "type")]
    pub result_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Documentation>,
}

/// Free-form node contributed by a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionNode {
    pub plugin: String,
    pub name: String,
    pub content: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CapabilityDocument {
        let mut doc = CapabilityDocument::new("/light/1");
        doc.methods.push(MethodNode {
            method_type: "get".into(),
            documentation: None,
            request: None,
            response: Some(ResponseNode {
                media_type: "text/plain".into(),
            }),
        });
        doc.methods.push(MethodNode {
            method_type: "put".into(),
            documentation: None,
            request: Some(RequestNode {
                media_type: "text/plain".into(),
                templates: vec![],
            }),
            response: None,
        });
        doc.actions.push(ActionNode {
            name: "toggle".into(),
            documentation: Some(Documentation::new("toggle", "Flip the switch")),
            parameters: vec![],
            result: Some(ResultNode {
                result_type: ParameterType::Boolean,
                documentation: None,
            }),
        });
        doc
    }

    #[test]
    fn test_find_method_requires_exact_negotiation() {
        let doc = sample();
        assert!(doc.find_method("get", None, Some("text/plain")).is_some());
        assert!(doc.find_method("get", None, None).is_none());
        assert!(doc.find_method("get", None, Some("application/json")).is_none());
        assert!(doc.find_method("put", Some("text/plain"), None).is_some());
    }

    #[test]
    fn test_serialization_omits_empty_extensions() {
        let doc = sample();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("extensions").is_none());
        assert_eq!(json["actions"][0]["result"]["type"], "BOOLEAN");
        let back: CapabilityDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_extensions_of_plugin() {
        let mut doc = sample();
        doc.extensions.push(ExtensionNode {
            plugin: "a".into(),
            name: "x".into(),
            content: serde_json::json!(1),
        });
        doc.extensions.push(ExtensionNode {
            plugin: "b".into(),
            name: "y".into(),
            content: serde_json::json!(2),
        });
        let names: Vec<_> = doc.extensions_of("b").map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["y"]);
    }
}
