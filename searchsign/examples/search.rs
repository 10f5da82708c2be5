use anyhow::Result;
use searchsign::{default_context, SearchClient};
use serde_json::json;

/// Index a document, search it back and clean up.
///
/// Requires `SEARCHSIGN_ENDPOINT`, `AWS_REGION` and AWS credentials in env.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let _ = dotenv::dotenv();

    let client = SearchClient::from_env(default_context())?;
    let index = "searchsign-example";

    client
        .index("1", &json!({"title": "hello searchsign"}), index, "_doc")
        .await?;
    println!("index exists: {}", client.index_exists(index).await?);

    let resp = client
        .search(index, &json!({"query": {"match": {"title": "hello"}}}))
        .await?;
    println!("search response: {}", resp.text());

    if let Some(resp) = client.delete(["1"], index, "_doc").await? {
        println!("delete response: {}", resp.status);
    }
    Ok(())
}
