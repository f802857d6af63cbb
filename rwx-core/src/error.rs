use crate::value::ParameterType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ResourceNotFound,
    OperationNotFound,
    ActionNotFound,
    ParameterBinding,
    Representation,
    InvalidDocument,
    OperationFailed,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ResourceNotFound => "resource_not_found",
            ErrorCode::OperationNotFound => "operation_not_found",
            ErrorCode::ActionNotFound => "action_not_found",
            ErrorCode::ParameterBinding => "parameter_binding",
            ErrorCode::Representation => "representation",
            ErrorCode::InvalidDocument => "invalid_document",
            ErrorCode::OperationFailed => "operation_failed",
            ErrorCode::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Structured per-request failure returned by dispatch and capability
/// requests. Serializable so the transport can carry it in an error reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl DispatchError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        DispatchError {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: Value) -> Self {
        DispatchError {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn resource_not_found(path: &str) -> Self {
        Self::with_data(
            ErrorCode::ResourceNotFound,
            format!("Resource not found: {}", path),
            serde_json::json!({ "path": path }),
        )
    }

    pub fn operation_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::OperationNotFound, message)
    }

    pub fn action_not_found(name: &str) -> Self {
        Self::with_data(
            ErrorCode::ActionNotFound,
            format!("Action not found: {}", name),
            serde_json::json!({ "action": name }),
        )
    }

    pub fn parameter_binding(parameter: &str, message: impl Into<String>) -> Self {
        Self::with_data(
            ErrorCode::ParameterBinding,
            message,
            serde_json::json!({ "parameter": parameter }),
        )
    }

    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDocument, message)
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::OperationFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for DispatchError {}

impl From<RepresentationError> for DispatchError {
    fn from(err: RepresentationError) -> Self {
        DispatchError::new(ErrorCode::Representation, err.to_string())
    }
}

/// Failure of a representation codec, or a missing codec
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepresentationError {
    #[error("No codec registered for media type {0}")]
    UnknownMediaType(String),

    #[error("Malformed {media_type} payload: {reason}")]
    Malformed { media_type: String, reason: String },

    #[error("Value cannot be represented as {media_type}: {reason}")]
    Unrepresentable { media_type: String, reason: String },

    #[error("Request for {0} carries no representation")]
    MissingRepresentation(String),

    #[error("Operation declared to produce {0} returned no representation")]
    NothingProduced(String),
}

/// Registration-time error. A resource type (or codec) that fails with one
/// of these is never registered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{resource}: method descriptor #{index} has no method type")]
    MissingMethodType { resource: String, index: usize },

    #[error("{resource}: empty media type on method {method_type}")]
    EmptyMediaType {
        resource: String,
        method_type: String,
    },

    #[error(
        "{resource}: duplicate method (type={method_type}, consumes={consumes:?}, produces={produces:?})"
    )]
    DuplicateMethod {
        resource: String,
        method_type: String,
        consumes: Option<String>,
        produces: Option<String>,
    },

    #[error("{resource}: action descriptor #{index} has no name")]
    MissingActionName { resource: String, index: usize },

    #[error("{resource}: duplicate action {name}")]
    DuplicateAction { resource: String, name: String },

    #[error("{resource}: parameter #{index} of action {action} has no name")]
    MissingParameterName {
        resource: String,
        action: String,
        index: usize,
    },

    #[error("{resource}: duplicate parameter {parameter} on action {action}")]
    DuplicateParameter {
        resource: String,
        action: String,
        parameter: String,
    },

    #[error(
        "{resource}: default {value:?} of parameter {parameter} on action {action} is not a valid {parameter_type}"
    )]
    InvalidDefault {
        resource: String,
        action: String,
        parameter: String,
        parameter_type: ParameterType,
        value: String,
    },

    #[error("Codec for media type {0} is already registered")]
    DuplicateCodec(String),

    #[error("Invalid resource path {0:?}")]
    InvalidPath(String),
}
