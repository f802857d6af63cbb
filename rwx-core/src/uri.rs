use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SCHEME: &str = "xmpp://";

/// Address of a resource: the network identity (JID) of the hosting entity
/// plus the hierarchical path of the resource inside it.
///
/// Textual form is `xmpp://<jid>#<path>`; the fragment is optional and
/// addresses the entity itself when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct XmppUri {
    jid: String,
    path: String,
}

impl XmppUri {
    pub fn new(jid: impl Into<String>, path: impl Into<String>) -> Result<Self, UriError> {
        let jid = jid.into();
        let path = path.into();
        validate_jid(&jid)?;
        validate_path(&path)?;
        Ok(Self { jid, path })
    }

    /// URI addressing the entity itself, without a resource path
    pub fn entity(jid: impl Into<String>) -> Result<Self, UriError> {
        Self::new(jid, "")
    }

    pub fn jid(&self) -> &str {
        &self.jid
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Same entity, different resource path
    pub fn with_path(&self, path: impl Into<String>) -> Result<Self, UriError> {
        Self::new(self.jid.clone(), path)
    }
}

fn validate_jid(jid: &str) -> Result<(), UriError> {
    if jid.is_empty() {
        return Err(UriError::MissingJid);
    }
    if jid.chars().any(|c| c.is_whitespace() || c == '#' || c == ';') {
        return Err(UriError::InvalidJid(jid.to_string()));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), UriError> {
    if path.is_empty() {
        return Ok(());
    }
    if !path.starts_with('/') || path.chars().any(|c| c.is_whitespace() || c == ';') {
        return Err(UriError::InvalidPath(path.to_string()));
    }
    Ok(())
}

impl fmt::Display for XmppUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}{}", SCHEME, self.jid)
        } else {
            write!(f, "{}{}#{}", SCHEME, self.jid, self.path)
        }
    }
}

impl FromStr for XmppUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| UriError::InvalidScheme(s.to_string()))?;
        match rest.split_once('#') {
            Some((jid, path)) => Self::new(jid, path),
            None => Self::new(rest, ""),
        }
    }
}

impl TryFrom<String> for XmppUri {
    type Error = UriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<XmppUri> for String {
    fn from(uri: XmppUri) -> Self {
        uri.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UriError {
    #[error("URI must start with xmpp://, got {0:?}")]
    InvalidScheme(String),

    #[error("URI has no JID")]
    MissingJid,

    #[error("Invalid JID: {0:?}")]
    InvalidJid(String),

    #[error("Resource path must start with '/': {0:?}")]
    InvalidPath(String),
}
