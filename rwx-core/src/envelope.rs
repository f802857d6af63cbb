//! Request/response stanzas (IQ semantics) that carry REST documents,
//! capability queries and discovery queries between two entities.

use crate::document::ProtocolDocument;
use crate::error::DispatchError;
use crate::xwadl::CapabilityDocument;
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates stanza ids of the form `<prefix>-<sequence>`.
///
/// Each transport endpoint owns one; nothing is process-global, so tests can
/// pin the prefix and reset the sequence.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: u32,
    sequence: AtomicU64,
}

impl IdGenerator {
    /// Generator with a random prefix in `0..1000`
    pub fn new() -> Self {
        Self::with_prefix(rand::rng().random_range(0..1000))
    }

    pub fn with_prefix(prefix: u32) -> Self {
        Self {
            prefix,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, seq)
    }

    pub fn reset(&self) {
        self.sequence.store(0, Ordering::SeqCst);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StanzaType {
    Get,
    Set,
    Result,
    Error,
}

impl StanzaType {
    pub fn is_request(self) -> bool {
        matches!(self, StanzaType::Get | StanzaType::Set)
    }

    pub fn is_response(self) -> bool {
        matches!(self, StanzaType::Result | StanzaType::Error)
    }
}

impl fmt::Display for StanzaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StanzaType::Get => "get",
            StanzaType::Set => "set",
            StanzaType::Result => "result",
            StanzaType::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Items found under a resource: address → human-readable name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoItems {
    pub items: IndexMap<String, String>,
}

impl DiscoItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, address: impl Into<String>, name: impl Into<String>) {
        self.items.insert(address.into(), name.into());
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Body {
    Rest(ProtocolDocument),
    XwadlQuery { path: String },
    Xwadl(CapabilityDocument),
    DiscoItemsQuery { path: String },
    DiscoItems(DiscoItems),
    Error(DispatchError),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StanzaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub body: Body,
}

impl Envelope {
    pub fn request(ids: &IdGenerator, kind: StanzaType, to: impl Into<String>, body: Body) -> Self {
        Self {
            id: ids.next_id(),
            kind,
            from: None,
            to: Some(to.into()),
            body,
        }
    }

    pub fn from_address(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// `result` reply: same id, addresses swapped
    pub fn result_for(request: &Envelope, body: Body) -> Result<Envelope, EnvelopeError> {
        Self::reply(request, StanzaType::Result, body)
    }

    /// `error` reply carrying the structured failure
    pub fn error_for(request: &Envelope, error: DispatchError) -> Result<Envelope, EnvelopeError> {
        Self::reply(request, StanzaType::Error, Body::Error(error))
    }

    fn reply(request: &Envelope, kind: StanzaType, body: Body) -> Result<Envelope, EnvelopeError> {
        if !request.kind.is_request() {
            return Err(EnvelopeError::NotARequest {
                id: request.id.clone(),
                kind: request.kind,
            });
        }
        Ok(Envelope {
            id: request.id.clone(),
            kind,
            from: request.to.clone(),
            to: request.from.clone(),
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Stanza {id} must be of type 'get' or 'set' to be answered, got '{kind}'")]
    NotARequest { id: String, kind: StanzaType },
}
