//! graphql types
//!
//! wire types for the response envelope and server-reported errors.
//! raw error objects are validated into a tagged [`ServerError`] when the
//! body is parsed, so the classifier never inspects loose json fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// variables mapping sent alongside an operation
pub type Variables = Map<String, Value>;

/// successful graphql response
///
/// only produced when the server reported no errors, so there is no
/// `errors` field to inspect. every other top-level member is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody<T = Value> {
    /// response data
    pub data: Option<T>,
    /// top-level response extensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
    /// remaining top-level members, e.g. `label` or `hasNext`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// response envelope as it comes off the wire
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub(crate) data: Option<T>,
    #[serde(default)]
    pub(crate) errors: Option<Vec<ServerError>>,
    #[serde(default)]
    pub(crate) extensions: Option<Value>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl<T> Envelope<T> {
    /// split into the success body or the reported errors
    pub(crate) fn into_result(self) -> std::result::Result<ResponseBody<T>, Vec<ServerError>> {
        match self.errors {
            Some(errors) if !errors.is_empty() => Err(errors),
            _ => Ok(ResponseBody {
                data: self.data,
                extensions: self.extensions,
                extra: self.extra,
            }),
        }
    }
}

/// server-reported graphql error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawServerError", into = "RawServerError")]
pub struct ServerError {
    /// error message
    pub message: String,
    /// error locations in the query
    pub locations: Vec<Location>,
    /// response path
    pub path: Vec<Value>,
    /// whether the error carried extensions
    pub kind: ServerErrorKind,
}

/// shape of a server error, decided once at parse time
#[derive(Debug, Clone, PartialEq)]
pub enum ServerErrorKind {
    /// no extensions attached
    Plain,
    /// extensions attached, with an optional machine-readable code
    Extended {
        /// top-level `code`, or `extensions.code` when absent
        code: Option<String>,
        /// extensions payload as sent by the server
        extensions: Value,
    },
}

impl ServerError {
    /// plain error with only a message
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            kind: ServerErrorKind::Plain,
        }
    }

    /// error carrying extensions and an optional code
    pub fn extended(message: impl Into<String>, code: Option<&str>, extensions: Value) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            kind: ServerErrorKind::Extended {
                code: code.map(str::to_string),
                extensions,
            },
        }
    }

    /// machine-readable code, if any
    pub fn code(&self) -> Option<&str> {
        match &self.kind {
            ServerErrorKind::Extended { code, .. } => code.as_deref(),
            ServerErrorKind::Plain => None,
        }
    }

    /// extensions payload, if any
    pub fn extensions(&self) -> Option<&Value> {
        match &self.kind {
            ServerErrorKind::Extended { extensions, .. } => Some(extensions),
            ServerErrorKind::Plain => None,
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// graphql error location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// line number (1-based)
    pub line: u32,
    /// column number (1-based)
    pub column: u32,
}

// servers send `null` for absent members and are loose about `code`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawServerError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<Value>,
}

fn string_code(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

impl From<RawServerError> for ServerError {
    fn from(raw: RawServerError) -> Self {
        let kind = match raw.extensions {
            None => ServerErrorKind::Plain,
            Some(extensions) => {
                // a non-string top-level code still shadows `extensions.code`
                let code = match &raw.code {
                    Some(code) => string_code(Some(code)),
                    None => string_code(extensions.get("code")),
                };
                ServerErrorKind::Extended { code, extensions }
            }
        };
        Self {
            message: raw.message.unwrap_or_default(),
            locations: raw.locations.unwrap_or_default(),
            path: raw.path.unwrap_or_default(),
            kind,
        }
    }
}

impl From<ServerError> for RawServerError {
    fn from(err: ServerError) -> Self {
        let (code, extensions) = match err.kind {
            ServerErrorKind::Plain => (None, None),
            ServerErrorKind::Extended { code, extensions } => (code, Some(extensions)),
        };
        Self {
            message: Some(err.message),
            locations: (!err.locations.is_empty()).then_some(err.locations),
            path: (!err.path.is_empty()).then_some(err.path),
            code: code.map(Value::String),
            extensions,
        }
    }
}
