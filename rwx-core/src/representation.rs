use crate::error::{ConfigError, RepresentationError};
use crate::uri::XmppUri;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Decoded method payload. Codecs map it to and from the wire string of
/// their media type.
pub type Representation = Value;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_URI_LIST: &str = "text/uri-list";

/// Converts between a [`Representation`] and its media-type-specific payload
pub trait Codec: Send + Sync + fmt::Debug {
    fn media_type(&self) -> &str;

    fn decode(&self, payload: &str) -> Result<Representation, RepresentationError>;

    fn encode(&self, value: &Representation) -> Result<String, RepresentationError>;

    /// Example payloads shown in capability documents. Never used for dispatch.
    fn templates(&self) -> Vec<String> {
        Vec::new()
    }
}

fn malformed(media_type: &str, reason: impl fmt::Display) -> RepresentationError {
    RepresentationError::Malformed {
        media_type: media_type.to_string(),
        reason: reason.to_string(),
    }
}

fn unrepresentable(media_type: &str, reason: impl fmt::Display) -> RepresentationError {
    RepresentationError::Unrepresentable {
        media_type: media_type.to_string(),
        reason: reason.to_string(),
    }
}

/// `text/plain`: the payload is the string itself
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextCodec;

impl Codec for PlainTextCodec {
    fn media_type(&self) -> &str {
        TEXT_PLAIN
    }

    fn decode(&self, payload: &str) -> Result<Representation, RepresentationError> {
        Ok(Value::String(payload.to_string()))
    }

    fn encode(&self, value: &Representation) -> Result<String, RepresentationError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(unrepresentable(TEXT_PLAIN, format!("expected a string, got {}", other))),
        }
    }
}

/// `application/json`: any JSON value, compact encoding
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    templates: Vec<String>,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<Value>) -> Self {
        Self {
            templates: templates.iter().map(Value::to_string).collect(),
        }
    }
}

impl Codec for JsonCodec {
    fn media_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn decode(&self, payload: &str) -> Result<Representation, RepresentationError> {
        serde_json::from_str(payload).map_err(|e| malformed(APPLICATION_JSON, e))
    }

    fn encode(&self, value: &Representation) -> Result<String, RepresentationError> {
        serde_json::to_string(value).map_err(|e| unrepresentable(APPLICATION_JSON, e))
    }

    fn templates(&self) -> Vec<String> {
        self.templates.clone()
    }
}

/// `text/uri-list`: links separated by `;`. Decodes to an array of link strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriListCodec;

impl Codec for UriListCodec {
    fn media_type(&self) -> &str {
        TEXT_URI_LIST
    }

    fn decode(&self, payload: &str) -> Result<Representation, RepresentationError> {
        if payload.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        payload
            .split(';')
            .map(|item| {
                item.trim()
                    .parse::<XmppUri>()
                    .map(|uri| Value::String(uri.to_string()))
                    .map_err(|e| malformed(TEXT_URI_LIST, e))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn encode(&self, value: &Representation) -> Result<String, RepresentationError> {
        let items = value
            .as_array()
            .ok_or_else(|| unrepresentable(TEXT_URI_LIST, "expected an array of links"))?;
        let links = items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| unrepresentable(TEXT_URI_LIST, format!("{} is not a link", item)))?
                    .parse::<XmppUri>()
                    .map(|uri| uri.to_string())
                    .map_err(|e| unrepresentable(TEXT_URI_LIST, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links.join(";"))
    }

    fn templates(&self) -> Vec<String> {
        vec!["xmpp://component.example.org#/path0;xmpp://component.example.org#/path0/path1".to_string()]
    }
}

/// Media type → codec. Built once at startup, then shared read-only.
#[derive(Debug, Default, Clone)]
pub struct CodecRegistry {
    codecs: IndexMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the plain text, JSON and uri-list codecs
    pub fn with_defaults() -> Self {
        let mut codecs: IndexMap<String, Arc<dyn Codec>> = IndexMap::new();
        codecs.insert(TEXT_PLAIN.to_string(), Arc::new(PlainTextCodec));
        codecs.insert(APPLICATION_JSON.to_string(), Arc::new(JsonCodec::new()));
        codecs.insert(TEXT_URI_LIST.to_string(), Arc::new(UriListCodec));
        Self { codecs }
    }

    pub fn register(&mut self, codec: Arc<dyn Codec>) -> Result<(), ConfigError> {
        let media_type = codec.media_type().to_string();
        if self.codecs.contains_key(&media_type) {
            return Err(ConfigError::DuplicateCodec(media_type));
        }
        tracing::debug!("Registered codec for {}", media_type);
        self.codecs.insert(media_type, codec);
        Ok(())
    }

    /// Replace (or add) the codec for its media type
    pub fn replace(&mut self, codec: Arc<dyn Codec>) -> Option<Arc<dyn Codec>> {
        self.codecs.insert(codec.media_type().to_string(), codec)
    }

    pub fn lookup(&self, media_type: &str) -> Result<&Arc<dyn Codec>, RepresentationError> {
        self.codecs
            .get(media_type)
            .ok_or_else(|| RepresentationError::UnknownMediaType(media_type.to_string()))
    }

    pub fn contains(&self, media_type: &str) -> bool {
        self.codecs.contains_key(media_type)
    }

    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }
}
