//! fetch adapter
//!
//! [`Fetch`] is the request function handed to a graphql runtime. it posts
//! the operation, parses the body, and turns failures into [`Error`] kinds.

use crate::classify::classify;
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::graphql::{Envelope, ResponseBody, Variables};
use crate::operation::Operation;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// accessor for the bearer token, called once per request
pub type TokenGetter = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// boxed future returned through [`FetchFunction`]
pub type BoxFutureResult<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// wrap a closure as a [`TokenGetter`]
pub fn token_getter<F>(f: F) -> TokenGetter
where
    F: Fn() -> Option<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// transport contract consumed by a graphql execution engine
pub trait FetchFunction: Send + Sync {
    /// execute one operation
    fn fetch<'a>(
        &'a self,
        operation: &'a (dyn Operation + Sync),
        variables: &'a Variables,
    ) -> BoxFutureResult<'a, ResponseBody>;
}

/// create a request function bound to an optional token accessor
///
/// no network i/o happens until the returned [`Fetch`] is called.
pub fn create_fetch(config: FetchConfig, token_getter: Option<TokenGetter>) -> Result<Fetch> {
    Fetch::new(config, token_getter)
}

/// graphql request function for the tenant api
#[derive(Clone)]
pub struct Fetch {
    config: Arc<FetchConfig>,
    http: reqwest::Client,
    token_getter: Option<TokenGetter>,
}

impl Fetch {
    /// create a new request function
    pub fn new(config: FetchConfig, token_getter: Option<TokenGetter>) -> Result<Self> {
        config.endpoint()?;
        let http = config.build_http_client()?;

        Ok(Self {
            config: Arc::new(config),
            http,
            token_getter,
        })
    }

    /// access the configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// execute an operation and return the untyped response body
    pub async fn request<O>(&self, operation: &O, variables: &Variables) -> Result<ResponseBody>
    where
        O: Operation + ?Sized,
    {
        self.request_as(operation, variables).await
    }

    /// execute an operation and deserialize `data` into `T`
    pub async fn request_as<T, O>(
        &self,
        operation: &O,
        variables: &Variables,
    ) -> Result<ResponseBody<T>>
    where
        T: DeserializeOwned,
        O: Operation + ?Sized,
    {
        self.request_with(operation, variables, |url, headers, body| async move {
            let response = self
                .http
                .post(url)
                .headers(headers)
                .json(&body)
                .send()
                .await
                .map_err(Error::from_transport)?;
            let status = response.status();
            check_status(status)?;
            let text = response.text().await.map_err(Error::from_transport)?;
            Ok((status, text))
        })
        .await
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let token = self.token_getter.as_ref().and_then(|get| get());
        if let Some(token) = token.filter(|token| !token.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
                Error::Config(format!("invalid bearer token header value: {err}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub(crate) async fn request_with<T, O, F, Fut>(
        &self,
        operation: &O,
        variables: &Variables,
        send: F,
    ) -> Result<ResponseBody<T>>
    where
        T: DeserializeOwned,
        O: Operation + ?Sized,
        F: FnOnce(Url, HeaderMap, Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let url = self.config.endpoint()?;
        let headers = self.request_headers()?;
        let body = serde_json::json!({
            "query": operation.text(),
            "variables": variables,
        });

        debug!(
            operation = operation.name().unwrap_or("<anonymous>"),
            url = %url,
            "sending graphql request"
        );
        let (status, text) = send(url, headers, body).await?;
        parse_fetch_response(status, &text)
    }
}

impl FetchFunction for Fetch {
    fn fetch<'a>(
        &'a self,
        operation: &'a (dyn Operation + Sync),
        variables: &'a Variables,
    ) -> BoxFutureResult<'a, ResponseBody> {
        Box::pin(self.request(operation, variables))
    }
}

impl std::fmt::Debug for Fetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetch")
            .field("config", &self.config)
            .field("token_getter", &self.token_getter.is_some())
            .finish()
    }
}

// 5xx stays unclassified and is never a network error, even when the body
// could not be read.
fn check_status(status: StatusCode) -> Result<()> {
    if status.is_server_error() {
        warn!(status = status.as_u16(), "graphql endpoint returned a server error");
        return Err(Error::Server {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }
    Ok(())
}

fn parse_fetch_response<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> Result<ResponseBody<T>> {
    check_status(status)?;

    let envelope: Envelope<Value> = serde_json::from_str(text)?;
    match envelope.into_result() {
        Ok(body) => {
            let data = match body.data {
                Some(data) => Some(serde_json::from_value(data)?),
                None => None,
            };
            debug!(status = status.as_u16(), "graphql request succeeded");
            Ok(ResponseBody {
                data,
                extensions: body.extensions,
                extra: body.extra,
            })
        }
        Err(errors) => {
            let count = errors.len();
            let err = classify(errors);
            debug!(count, error = %err, "graphql response carried errors");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_fetch(token_getter: Option<TokenGetter>) -> Fetch {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test http client");
        let config = FetchConfig::new("http://localhost:1234").with_http_client(http);
        Fetch::new(config, token_getter).unwrap()
    }

    fn vars(value: Value) -> Variables {
        match value {
            Value::Object(map) => map,
            _ => panic!("variables must be an object"),
        }
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_request_sets_url_headers_and_body() {
        let fetch = test_fetch(Some(token_getter(|| Some("abc".to_string()))));
        let variables = vars(json!({"id": "story-1"}));
        let response = fetch
            .request_with::<Value, _, _, _>(
                "query Story($id: ID!) { story(id: $id) { id } }",
                &variables,
                |url, headers, body| async move {
                    assert_eq!(url.path(), "/api/tenant/graphql");
                    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
                    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
                    assert_eq!(
                        body["query"],
                        "query Story($id: ID!) { story(id: $id) { id } }"
                    );
                    assert_eq!(body["variables"], json!({"id": "story-1"}));
                    Ok((StatusCode::OK, "{\"data\": {\"ok\": true}}".to_string()))
                },
            )
            .await
            .unwrap();

        assert_eq!(response.data.unwrap()["ok"], true);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let getters = [
            None,
            Some(token_getter(|| None)),
            Some(token_getter(|| Some(String::new()))),
        ];
        for getter in getters {
            let fetch = test_fetch(getter);
            fetch
                .request_with::<Value, _, _, _>(
                    "{ ok }",
                    &Variables::new(),
                    |_url, headers, _body| async move {
                        assert!(headers.get(AUTHORIZATION).is_none());
                        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
                        Ok((StatusCode::OK, "{\"data\": null}".to_string()))
                    },
                )
                .await
                .unwrap();
        }
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_token_getter_called_once_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = test_fetch(Some(token_getter(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some("t".to_string())
        })));

        for _ in 0..2 {
            fetch
                .request_with::<Value, _, _, _>(
                    "{ ok }",
                    &Variables::new(),
                    |_url, _headers, _body| async move {
                        Ok((StatusCode::OK, "{\"data\": {}}".to_string()))
                    },
                )
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_invalid_token_is_config_error() {
        let fetch = test_fetch(Some(token_getter(|| Some("bad\ntoken".to_string()))));
        let err = fetch
            .request_with::<Value, _, _, _>(
                "{ ok }",
                &Variables::new(),
                |_url, _headers, _body| async move {
                    Ok((StatusCode::OK, "{\"data\": {}}".to_string()))
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_classified_error_passes_through() {
        let fetch = test_fetch(None);
        let err = fetch
            .request_with::<Value, _, _, _>(
                "{ ok }",
                &Variables::new(),
                |_url, _headers, _body| async move {
                    let body = json!({
                        "data": null,
                        "errors": [{"message": "bad", "extensions": {"code": "BAD_USER_INPUT"}}]
                    });
                    Ok((StatusCode::OK, body.to_string()))
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BadUserInput { .. }));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_request_typed_success() {
        #[derive(Debug, Deserialize)]
        struct Data {
            value: i64,
        }
        let fetch = test_fetch(None);
        let response = fetch
            .request_with::<Data, _, _, _>(
                "query { value }",
                &Variables::new(),
                |_url, _headers, _body| async move {
                    Ok((StatusCode::OK, "{\"data\": {\"value\": 7}}".to_string()))
                },
            )
            .await
            .unwrap();

        assert_eq!(response.data.unwrap().value, 7);
    }

    #[test]
    fn test_parse_success_keeps_body() {
        let text = json!({"data": {"value": 9}, "extensions": {"cost": 1}}).to_string();
        let parsed = parse_fetch_response::<Value>(StatusCode::OK, &text).unwrap();
        assert_eq!(parsed.data.unwrap()["value"], 9);
        assert_eq!(parsed.extensions.unwrap()["cost"], 1);
    }

    #[test]
    fn test_parse_success_keeps_extra_members() {
        let text = "{\"data\": {\"x\": 1}, \"label\": \"deferred\", \"hasNext\": false}";
        let parsed = parse_fetch_response::<Value>(StatusCode::OK, text).unwrap();
        assert_eq!(parsed.extra["label"], "deferred");
        assert_eq!(parsed.extra["hasNext"], false);
        assert_eq!(parsed.data.unwrap()["x"], 1);
    }

    #[test]
    fn test_parse_loose_error_shapes_are_classified() {
        let text = "{\"errors\": [{\"message\": \"boom\", \"locations\": null}]}";
        let err = parse_fetch_response::<Value>(StatusCode::OK, text).unwrap_err();
        assert_eq!(err.server_errors().len(), 1);

        let text = "{\"errors\": [{\"message\": \"boom\", \"code\": 500, \"extensions\": {}}]}";
        let err = parse_fetch_response::<Value>(StatusCode::OK, text).unwrap_err();
        assert!(matches!(err, Error::UnknownServer { .. }));
    }

    #[test]
    fn test_parse_empty_errors_is_success() {
        let text = "{\"data\": {\"value\": 1}, \"errors\": []}";
        let parsed = parse_fetch_response::<Value>(StatusCode::OK, text).unwrap();
        assert_eq!(parsed.data.unwrap()["value"], 1);
    }

    #[test]
    fn test_parse_server_status_is_unclassified() {
        let err =
            parse_fetch_response::<Value>(StatusCode::INTERNAL_SERVER_ERROR, "{}").unwrap_err();
        assert!(matches!(err, Error::Server { status: 500, .. }));
        assert_eq!(err.to_string(), "500 Internal Server Error");
        assert!(!err.is_network_error());
    }

    #[test]
    fn test_parse_server_status_ignores_body() {
        let err = parse_fetch_response::<Value>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, Error::Server { status: 502, .. }));
    }

    #[test]
    fn test_parse_client_status_still_parses_body() {
        let text = "{\"errors\": [{\"message\": \"unauthorized\"}]}";
        let err = parse_fetch_response::<Value>(StatusCode::UNAUTHORIZED, text).unwrap_err();
        assert_eq!(err.server_errors().len(), 1);
    }

    #[test]
    fn test_parse_invalid_json_propagates() {
        let err = parse_fetch_response::<Value>(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_fetch_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Fetch>();
        let _: Arc<dyn FetchFunction> = Arc::new(test_fetch(None));
    }
}
