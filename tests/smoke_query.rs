use tenant_fetch::{create_fetch, token_getter, FetchConfig, Variables};

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn smoke_settings() {
    let base_url = match std::env::var("TENANT_URL") {
        Ok(url) => url,
        Err(_) => return,
    };

    let fetch = create_fetch(
        FetchConfig::new(base_url),
        Some(token_getter(|| std::env::var("TENANT_TOKEN").ok())),
    )
    .expect("fetch");
    let response = fetch
        .request("query { settings { id } }", &Variables::new())
        .await
        .expect("graphql query");

    assert!(response.data.is_some());
}
