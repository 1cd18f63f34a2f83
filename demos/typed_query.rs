use serde::Deserialize;
use serde_json::json;
use std::env;
use tenant_fetch::{create_fetch, token_getter, Error, FetchConfig, OperationDescriptor, Variables};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Data {
    story: Option<Story>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Story {
    id: String,
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = env::var("TENANT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let story_id = env::var("TENANT_STORY_ID").unwrap_or_else(|_| "story-1".to_string());

    let config = FetchConfig::new(base_url);
    let fetch = create_fetch(config, Some(token_getter(|| env::var("TENANT_TOKEN").ok())))?;

    let operation = OperationDescriptor::new(
        "StoryQuery",
        "query StoryQuery($id: ID!) { story(id: $id) { id url } }",
    );
    let mut variables = Variables::new();
    variables.insert("id".to_string(), json!(story_id));

    match fetch.request_as::<Data, _>(&operation, &variables).await {
        Ok(response) => println!("response: {response:?}"),
        Err(Error::BadUserInput { extensions }) => println!("rejected input: {extensions}"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
