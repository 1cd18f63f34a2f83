//! error types
//!
//! classified graphql errors, transport failures, and the unclassified
//! errors that propagate untouched (5xx status, json, config).

use crate::graphql::ServerError;
use serde_json::Value;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the fetch adapter
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// single error with code `BAD_USER_INPUT`
    #[error("bad user input")]
    BadUserInput {
        /// extensions payload of the error
        extensions: Value,
    },

    /// several errors, or a single error without extensions
    #[error("graphql error: {}", first_message(.errors))]
    GraphQl {
        /// every error the server reported, in order
        errors: Vec<ServerError>,
    },

    /// single error with extensions and an unrecognized code
    #[error("unknown server error: {message}")]
    UnknownServer {
        /// error message
        message: String,
        /// extensions payload of the error
        extensions: Value,
    },

    /// the http exchange could not be completed
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// http status >= 500, left unclassified
    #[error("{status} {reason}")]
    Server {
        /// http status code
        status: u16,
        /// canonical reason phrase
        reason: String,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),
}

fn first_message(errors: &[ServerError]) -> &str {
    errors
        .first()
        .map(|err| err.message.as_str())
        .unwrap_or("no error message")
}

impl Error {
    /// wrap a reqwest failure raised while talking to the server
    ///
    /// builder failures never reached the wire and stay [`Error::Http`].
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Error::Http(err)
        } else {
            Error::Network(err)
        }
    }

    /// true if the http exchange itself failed
    pub fn is_network_error(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// true if the error came from the server's `errors` list
    pub fn is_classified(&self) -> bool {
        matches!(
            self,
            Error::BadUserInput { .. } | Error::GraphQl { .. } | Error::UnknownServer { .. }
        )
    }

    /// extensions payload of a single classified error
    pub fn extensions(&self) -> Option<&Value> {
        match self {
            Error::BadUserInput { extensions } | Error::UnknownServer { extensions, .. } => {
                Some(extensions)
            }
            _ => None,
        }
    }

    /// raw server errors wrapped by [`Error::GraphQl`]
    pub fn server_errors(&self) -> &[ServerError] {
        match self {
            Error::GraphQl { errors } => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_error_message_is_status_line() {
        let err = Error::Server {
            status: 502,
            reason: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "502 Bad Gateway");
        assert!(!err.is_network_error());
        assert!(!err.is_classified());
    }

    #[test]
    fn test_graphql_error_display_uses_first_message() {
        let err = Error::GraphQl {
            errors: vec![ServerError::plain("first"), ServerError::plain("second")],
        };
        assert_eq!(err.to_string(), "graphql error: first");
        assert_eq!(err.server_errors().len(), 2);

        let empty = Error::GraphQl { errors: vec![] };
        assert_eq!(empty.to_string(), "graphql error: no error message");
    }

    #[test]
    fn test_extensions_accessor() {
        let err = Error::BadUserInput {
            extensions: json!({"code": "BAD_USER_INPUT", "param": "email"}),
        };
        assert!(err.is_classified());
        assert_eq!(err.extensions().unwrap()["param"], "email");
        assert!(err.server_errors().is_empty());

        let err = Error::UnknownServer {
            message: "nope".to_string(),
            extensions: json!({"code": "INTERNAL"}),
        };
        assert_eq!(err.to_string(), "unknown server error: nope");
        assert_eq!(err.extensions().unwrap()["code"], "INTERNAL");

        let err = Error::Config("bad".to_string());
        assert!(err.extensions().is_none());
    }
}
