use crate::uri::{UriError, XmppUri};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of an action parameter or result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterType {
    String,
    Integer,
    Double,
    Boolean,
    Link,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterType::String => "STRING",
            ParameterType::Integer => "INTEGER",
            ParameterType::Double => "DOUBLE",
            ParameterType::Boolean => "BOOLEAN",
            ParameterType::Link => "LINK",
        };
        write!(f, "{}", s)
    }
}

/// A value exchanged as an action parameter or result, tagged with its type.
///
/// Serialized as `{"type": "INTEGER", "value": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum TypedValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Link(XmppUri),
}

impl TypedValue {
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            TypedValue::String(_) => ParameterType::String,
            TypedValue::Integer(_) => ParameterType::Integer,
            TypedValue::Double(_) => ParameterType::Double,
            TypedValue::Boolean(_) => ParameterType::Boolean,
            TypedValue::Link(_) => ParameterType::Link,
        }
    }

    /// False for NaN and infinite doubles, which have no wire form
    pub fn is_finite(&self) -> bool {
        match self {
            TypedValue::Double(d) => d.is_finite(),
            _ => true,
        }
    }

    /// Parse the textual form of a value of the given type.
    ///
    /// Integers are `[+-]?[0-9]+`, doubles are plain decimal with an optional
    /// exponent, booleans are exactly `true` or `false`, links are `XmppUri`s.
    pub fn parse(ty: ParameterType, text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::Invalid {
            ty,
            text: text.to_string(),
        };
        match ty {
            ParameterType::String => Ok(TypedValue::String(text.to_string())),
            ParameterType::Integer => {
                if !is_integer_literal(text) {
                    return Err(invalid());
                }
                text.parse().map(TypedValue::Integer).map_err(|_| invalid())
            }
            ParameterType::Double => {
                if !is_double_literal(text) {
                    return Err(invalid());
                }
                text.parse().map(TypedValue::Double).map_err(|_| invalid())
            }
            ParameterType::Boolean => match text {
                "true" => Ok(TypedValue::Boolean(true)),
                "false" => Ok(TypedValue::Boolean(false)),
                _ => Err(invalid()),
            },
            ParameterType::Link => text
                .parse()
                .map(TypedValue::Link)
                .map_err(|source| ValueError::Link {
                    text: text.to_string(),
                    source,
                }),
        }
    }

    /// Textual form accepted back by [`TypedValue::parse`]
    pub fn to_text(&self) -> String {
        match self {
            TypedValue::String(s) => s.clone(),
            TypedValue::Integer(i) => i.to_string(),
            TypedValue::Double(d) => d.to_string(),
            TypedValue::Boolean(b) => b.to_string(),
            TypedValue::Link(uri) => uri.to_string(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.parameter_type(), self.to_text())
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

fn is_integer_literal(s: &str) -> bool {
    is_digits(strip_sign(s))
}

fn is_double_literal(s: &str) -> bool {
    let body = strip_sign(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            (int.is_empty() || is_digits(int))
                && (frac.is_empty() || is_digits(frac))
                && !(int.is_empty() && frac.is_empty())
        }
        None => is_digits(mantissa),
    };
    mantissa_ok && exponent.is_none_or(is_integer_literal)
}

/// Rust types that map one-to-one onto a [`ParameterType`]
pub trait NativeValue: Sized {
    const TYPE: ParameterType;

    fn from_typed(value: &TypedValue) -> Option<Self>;

    fn into_typed(self) -> TypedValue;
}

impl NativeValue for String {
    const TYPE: ParameterType = ParameterType::String;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_typed(self) -> TypedValue {
        TypedValue::String(self)
    }
}

impl NativeValue for i64 {
    const TYPE: ParameterType = ParameterType::Integer;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    fn into_typed(self) -> TypedValue {
        TypedValue::Integer(self)
    }
}

impl NativeValue for f64 {
    const TYPE: ParameterType = ParameterType::Double;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    fn into_typed(self) -> TypedValue {
        TypedValue::Double(self)
    }
}

impl NativeValue for bool {
    const TYPE: ParameterType = ParameterType::Boolean;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn into_typed(self) -> TypedValue {
        TypedValue::Boolean(self)
    }
}

impl NativeValue for XmppUri {
    const TYPE: ParameterType = ParameterType::Link;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Link(uri) => Some(uri.clone()),
            _ => None,
        }
    }

    fn into_typed(self) -> TypedValue {
        TypedValue::Link(self)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("{text:?} is not a valid {ty} literal")]
    Invalid { ty: ParameterType, text: String },

    #[error("{text:?} is not a valid LINK literal: {source}")]
    Link { text: String, source: UriError },
}
