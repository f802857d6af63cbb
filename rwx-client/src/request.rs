//! Builders that check a REST document against the resource's capability
//! document before it goes on the wire.

use crate::service::ClientError;
use rwx_core::{
    ActionInvocation, ActionNode, CapabilityDocument, MethodInvocation, ProtocolDocument,
    TypedValue,
};

#[derive(Debug, Clone)]
pub struct MethodRequest<'a> {
    capabilities: &'a CapabilityDocument,
    invocation: MethodInvocation,
}

impl<'a> MethodRequest<'a> {
    pub fn new(capabilities: &'a CapabilityDocument, method_type: impl Into<String>) -> Self {
        Self {
            capabilities,
            invocation: MethodInvocation::new(method_type),
        }
    }

    pub fn with_request(
        mut self,
        media_type: impl Into<String>,
        representation: impl Into<String>,
    ) -> Self {
        self.invocation = self.invocation.with_request(media_type, representation);
        self
    }

    pub fn accepting(mut self, media_type: impl Into<String>) -> Self {
        self.invocation = self.invocation.accepting(media_type);
        self
    }

    /// Fails unless the resource offers a method with exactly these media types
    pub fn build(self) -> Result<ProtocolDocument, ClientError> {
        let consumes = self.invocation.request.as_ref().map(|p| p.media_type.as_str());
        let produces = self.invocation.response.as_ref().map(|p| p.media_type.as_str());
        if self
            .capabilities
            .find_method(&self.invocation.method_type, consumes, produces)
            .is_none()
        {
            return Err(ClientError::InvalidRequest(format!(
                "{} offers no {} method consuming {} and producing {}",
                self.capabilities.path,
                self.invocation.method_type,
                consumes.unwrap_or("nothing"),
                produces.unwrap_or("nothing"),
            )));
        }
        Ok(ProtocolDocument::method(
            self.capabilities.path.clone(),
            self.invocation,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct ActionRequest<'a> {
    capabilities: &'a CapabilityDocument,
    invocation: ActionInvocation,
}

impl<'a> ActionRequest<'a> {
    pub fn new(capabilities: &'a CapabilityDocument, name: impl Into<String>) -> Self {
        Self {
            capabilities,
            invocation: ActionInvocation::new(name),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.invocation = self.invocation.with_parameter(name, value);
        self
    }

    /// Parse `text` as the declared type of parameter `name`
    pub fn parameter_text(self, name: &str, text: &str) -> Result<Self, ClientError> {
        let action = self.action()?;
        let declared = action.parameter(name).ok_or_else(|| {
            ClientError::InvalidRequest(format!("{} has no parameter {}", action.name, name))
        })?;
        let value = TypedValue::parse(declared.parameter_type, text)
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        Ok(self.parameter(name, value))
    }

    /// Fails on unknown or mistyped parameters and on required parameters
    /// left out
    pub fn build(self) -> Result<ProtocolDocument, ClientError> {
        let action = self.action()?;

        for supplied in &self.invocation.parameters {
            let declared = action.parameter(&supplied.name).ok_or_else(|| {
                ClientError::InvalidRequest(format!(
                    "{} has no parameter {}",
                    action.name, supplied.name
                ))
            })?;
            if declared.parameter_type != supplied.value.parameter_type() {
                return Err(ClientError::InvalidRequest(format!(
                    "Parameter {} must be {}, got {}",
                    supplied.name,
                    declared.parameter_type,
                    supplied.value.parameter_type()
                )));
            }
        }

        let missing = action.parameters.iter().find(|declared| {
            declared.default_value.is_none() && self.invocation.parameter(&declared.name).is_none()
        });
        if let Some(declared) = missing {
            return Err(ClientError::InvalidRequest(format!(
                "Missing parameter {}",
                declared.name
            )));
        }

        Ok(ProtocolDocument::action(
            self.capabilities.path.clone(),
            self.invocation,
        ))
    }

    fn action(&self) -> Result<&'a ActionNode, ClientError> {
        self.capabilities
            .find_action(&self.invocation.name)
            .ok_or_else(|| {
                ClientError::InvalidRequest(format!(
                    "{} has no action {}",
                    self.capabilities.path, self.invocation.name
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwx_core::{MethodNode, ParameterNode, ParameterType, ResponseNode};

    fn capabilities() -> CapabilityDocument {
        let mut doc = CapabilityDocument::new("/light/1");
        doc.methods.push(MethodNode {
            method_type: "get".into(),
            documentation: None,
            request: None,
            response: Some(ResponseNode {
                media_type: "text/plain".into(),
            }),
        });
        doc.actions.push(ActionNode {
            name: "setBrightness".into(),
            documentation: None,
            parameters: vec![
                ParameterNode {
                    name: "level".into(),
                    parameter_type: ParameterType::Integer,
                    default_value: Some("50".into()),
                    documentation: None,
                },
                ParameterNode {
                    name: "fade".into(),
                    parameter_type: ParameterType::Boolean,
                    default_value: None,
                    documentation: None,
                },
            ],
            result: None,
        });
        doc
    }

    #[test]
    fn test_method_request_negotiation() {
        let caps = capabilities();
        let doc = MethodRequest::new(&caps, "get").accepting("text/plain").build().unwrap();
        assert_eq!(doc.path, "/light/1");
        assert!(MethodRequest::new(&caps, "get").accepting("application/json").build().is_err());
        assert!(MethodRequest::new(&caps, "get").build().is_err());
    }

    #[test]
    fn test_action_request_validation() {
        let caps = capabilities();

        let doc = ActionRequest::new(&caps, "setBrightness")
            .parameter_text("fade", "true")
            .unwrap()
            .build()
            .unwrap();
        let action = doc.action.unwrap();
        assert_eq!(action.parameter("fade"), Some(&TypedValue::Boolean(true)));
        assert_eq!(action.parameter("level"), None);

        // fade has no default
        assert!(ActionRequest::new(&caps, "setBrightness").build().is_err());
        assert!(ActionRequest::new(&caps, "setBrightness")
            .parameter("fade", TypedValue::Boolean(true))
            .parameter("level", TypedValue::Double(1.0))
            .build()
            .is_err());
        assert!(ActionRequest::new(&caps, "setBrightness")
            .parameter_text("level", "bright")
            .is_err());
        assert!(ActionRequest::new(&caps, "blink").build().is_err());
    }
}
