//! fetch configuration
//!
//! a [`FetchConfig`] pins the tenant endpoint and decides how the http
//! client is obtained. the endpoint is resolved once, in [`FetchConfig::new`],
//! and any problem surfaces when [`crate::create_fetch`] is called.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::sync::Arc;
use url::Url;

/// endpoint path of the tenant graphql api
pub const GRAPHQL_PATH: &str = "/api/tenant/graphql";

type CustomizeBuilder =
    Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>;

/// where the http client comes from
#[derive(Clone)]
enum Transport {
    /// built from the configured headers
    Default,
    /// supplied by the caller and used as-is
    Prebuilt(reqwest::Client),
    /// built from the configured headers, then passed through a callback
    Customized(CustomizeBuilder),
}

/// configuration for the fetch adapter
#[derive(Clone)]
pub struct FetchConfig {
    endpoint: std::result::Result<Url, String>,
    headers: HeaderMap,
    transport: Transport,
}

impl FetchConfig {
    /// point the adapter at a tenant
    ///
    /// `base_url` may carry a path prefix and a trailing slash; a missing
    /// scheme means https.
    ///
    /// ```
    /// use tenant_fetch::FetchConfig;
    ///
    /// let config = FetchConfig::new("https://talk.example.com/");
    /// assert_eq!(
    ///     config.endpoint().unwrap().as_str(),
    ///     "https://talk.example.com/api/tenant/graphql"
    /// );
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("tenant-fetch/", env!("CARGO_PKG_VERSION"))),
        );

        Self {
            endpoint: resolve_endpoint(base_url.as_ref()),
            headers,
            transport: Transport::Default,
        }
    }

    /// send a header with every request
    ///
    /// overrides the default `user-agent` when `name` is that header.
    /// ignored when a prebuilt client is injected.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// use a prebuilt http client as-is
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.transport = Transport::Prebuilt(http_client);
        self
    }

    /// adjust the default client builder, e.g. for proxies or tls roots
    pub fn with_http_client_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.transport = Transport::Customized(Arc::new(f));
        self
    }

    /// resolved graphql endpoint
    pub fn endpoint(&self) -> Result<Url> {
        self.endpoint.clone().map_err(Error::Config)
    }

    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        let builder = reqwest::Client::builder().default_headers(self.headers.clone());
        let client = match &self.transport {
            Transport::Prebuilt(client) => client.clone(),
            Transport::Default => builder.build()?,
            Transport::Customized(customize) => customize(builder).build()?,
        };
        Ok(client)
    }
}

fn resolve_endpoint(raw: &str) -> std::result::Result<Url, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let base = Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{trimmed}")))
        .map_err(|err| format!("invalid base url {raw:?}: {err}"))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?} in {raw:?}", base.scheme()));
    }

    // join against a directory url so a base path prefix survives
    let dir = Url::parse(&format!("{}/", base.as_str().trim_end_matches('/')))
        .map_err(|err| err.to_string())?;
    dir.join(GRAPHQL_PATH.trim_start_matches('/'))
        .map_err(|err| err.to_string())
}

impl std::fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transport = match self.transport {
            Transport::Default => "default",
            Transport::Prebuilt(_) => "prebuilt",
            Transport::Customized(_) => "customized",
        };
        f.debug_struct("FetchConfig")
            .field("endpoint", &self.endpoint)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("transport", &transport)
            .finish()
    }
}
