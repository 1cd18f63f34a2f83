use std::env;
use tenant_fetch::{create_fetch, token_getter, FetchConfig, Variables};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = env::var("TENANT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let config = FetchConfig::new(base_url);
    let fetch = create_fetch(config, Some(token_getter(|| env::var("TENANT_TOKEN").ok())))?;

    let response = fetch
        .request("query { settings { id } }", &Variables::new())
        .await?;

    println!("data: {}", response.data.unwrap_or_default());

    Ok(())
}
