//! tenant graphql fetch adapter
//!
//! this crate provides the network layer for a graphql client runtime:
//! one POST per operation to the tenant graphql endpoint, with failures
//! normalized into a small set of [`Error`] kinds. start with
//! [`FetchConfig`] and [`create_fetch`], then call [`Fetch::request`] or
//! hand the adapter to an engine through [`FetchFunction`].
//!
//! ## quick start
//!
//! ```no_run
//! use tenant_fetch::{create_fetch, token_getter, FetchConfig, Variables};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetch = create_fetch(
//!     FetchConfig::new("http://localhost:3000"),
//!     Some(token_getter(|| std::env::var("TENANT_TOKEN").ok())),
//! )?;
//! let response = fetch.request("{ settings { id } }", &Variables::new()).await?;
//! println!("{:?}", response.data);
//! # Ok(())
//! # }
//! ```
//!
//! ## errors
//!
//! a response with an `errors` list never comes back as success. a single
//! error with extensions becomes [`Error::BadUserInput`] or
//! [`Error::UnknownServer`] depending on its code; anything else becomes
//! [`Error::GraphQl`]. transport failures are [`Error::Network`], while a
//! 5xx status is reported as the unclassified [`Error::Server`].

mod classify;
mod client;
mod config;
mod error;
mod graphql;
mod operation;

pub use classify::{classify, BAD_USER_INPUT};
pub use client::{create_fetch, token_getter, BoxFutureResult, Fetch, FetchFunction, TokenGetter};
pub use config::{FetchConfig, GRAPHQL_PATH};
pub use error::{Error, Result};
pub use graphql::{Location, ResponseBody, ServerError, ServerErrorKind, Variables};
pub use operation::{Operation, OperationDescriptor};
