//! Declarative descriptions of the operations a resource type exposes.

use rwx_core::{NativeValue, ParameterType};

/// A media type bound to the request or response side of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBinding {
    pub media_type: String,
}

/// A content-negotiated read/write operation on a resource's representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub method_type: String,
    pub documentation: Option<String>,
    pub consumes: Option<MediaBinding>,
    pub produces: Option<MediaBinding>,
}

impl MethodDescriptor {
    pub fn new(method_type: impl Into<String>) -> Self {
        Self {
            method_type: method_type.into(),
            documentation: None,
            consumes: None,
            produces: None,
        }
    }

    pub fn documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }

    pub fn consumes(mut self, media_type: impl Into<String>) -> Self {
        self.consumes = Some(MediaBinding {
            media_type: media_type.into(),
        });
        self
    }

    pub fn produces(mut self, media_type: impl Into<String>) -> Self {
        self.produces = Some(MediaBinding {
            media_type: media_type.into(),
        });
        self
    }

    pub fn consumes_media_type(&self) -> Option<&str> {
        self.consumes.as_ref().map(|b| b.media_type.as_str())
    }

    pub fn produces_media_type(&self) -> Option<&str> {
        self.produces.as_ref().map(|b| b.media_type.as_str())
    }

    /// Identity used for duplicate detection and negotiation
    pub fn signature(&self) -> (&str, Option<&str>, Option<&str>) {
        (
            self.method_type.as_str(),
            self.consumes_media_type(),
            self.produces_media_type(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub parameter_type: ParameterType,
    /// Textual default; empty means "no default"
    pub default_value: Option<String>,
    pub documentation: Option<String>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            parameter_type,
            default_value: None,
            documentation: None,
        }
    }

    /// Parameter typed after a Rust native (`i64` → INTEGER, ...)
    pub fn of<T: NativeValue>(name: impl Into<String>) -> Self {
        Self::new(name, T::TYPE)
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }

    /// The default, unless absent or empty
    pub fn effective_default(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDescriptor {
    pub result_type: ParameterType,
    pub documentation: Option<String>,
}

impl ResultDescriptor {
    pub fn new(result_type: ParameterType) -> Self {
        Self {
            result_type,
            documentation: None,
        }
    }

    pub fn documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }
}

/// A named remote procedure with typed parameters and an optional typed result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub name: String,
    pub documentation: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub result: Option<ResultDescriptor>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            parameters: Vec::new(),
            result: None,
        }
    }

    pub fn documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn result(mut self, result: ResultDescriptor) -> Self {
        self.result = Some(result);
        self
    }

    /// Result typed after a Rust native
    pub fn returns<T: NativeValue>(self) -> Self {
        self.result(ResultDescriptor::new(T::TYPE))
    }
}
