//! error classification
//!
//! maps the `errors` list of a graphql response onto one [`Error`].

use crate::error::Error;
use crate::graphql::{ServerError, ServerErrorKind};

/// code the server uses for input validation failures
pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";

/// classify a non-empty list of server errors
///
/// - more than one error is always [`Error::GraphQl`]
/// - a single error with extensions is [`Error::BadUserInput`] when its code
///   is `BAD_USER_INPUT`, otherwise [`Error::UnknownServer`]
/// - a single error without extensions is [`Error::GraphQl`]
pub fn classify(mut errors: Vec<ServerError>) -> Error {
    // multiple errors are treated as graphql errors regardless of shape.
    if errors.len() != 1 {
        return Error::GraphQl { errors };
    }

    let err = errors.remove(0);
    match err.kind {
        ServerErrorKind::Extended { code, extensions } => {
            if code.as_deref() == Some(BAD_USER_INPUT) {
                Error::BadUserInput { extensions }
            } else {
                Error::UnknownServer {
                    message: err.message,
                    extensions,
                }
            }
        }
        ServerErrorKind::Plain => Error::GraphQl { errors: vec![err] },
    }
}
