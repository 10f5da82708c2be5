use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use searchsign::aws::StaticCredentialProvider;
use searchsign::{Body, ClientConfig, Context, ErrorKind, HttpClient, HttpSend, SearchClient};
use serde_json::json;

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    uri: String,
    body: Bytes,
}

/// MockHttpSend answers with a fixed status and records every request.
#[derive(Debug)]
struct MockHttpSend {
    status: StatusCode,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Body>) -> searchsign::Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        assert!(
            parts.headers.contains_key("authorization"),
            "request must be signed before sending"
        );
        let Body::Bytes(body) = body else {
            panic!("search requests are sent with in-memory bodies");
        };
        self.requests.lock().unwrap().push(Recorded {
            method: parts.method,
            uri: parts.uri.to_string(),
            body,
        });

        Ok(http::Response::builder()
            .status(self.status)
            .body(Bytes::from_static(br#"{"result":"ok"}"#))?)
    }
}

fn init(status: StatusCode) -> (SearchClient, Arc<Mutex<Vec<Recorded>>>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let requests = Arc::new(Mutex::new(Vec::new()));
    let ctx = Context::new().with_http_send(MockHttpSend {
        status,
        requests: requests.clone(),
    });
    let http = HttpClient::with_credential_provider(
        ClientConfig::new("https://search-domain.us-east-1.es.amazonaws.com", "us-east-1"),
        ctx,
        StaticCredentialProvider::new("access_key_id", "secret_access_key"),
    );
    (SearchClient::new(http), requests)
}

fn recorded(requests: &Arc<Mutex<Vec<Recorded>>>) -> Vec<Recorded> {
    requests.lock().unwrap().clone()
}

const ENDPOINT: &str = "https://search-domain.us-east-1.es.amazonaws.com";

#[tokio::test]
async fn test_index() -> Result<()> {
    let (client, requests) = init(StatusCode::CREATED);

    let resp = client
        .index("doc 1", &json!({"title": "hello"}), "articles", "_doc")
        .await?;
    assert_eq!(resp.status, StatusCode::CREATED);

    let reqs = recorded(&requests);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, Method::PUT);
    assert_eq!(reqs[0].uri, format!("{ENDPOINT}/articles/_doc/doc%201"));
    assert_eq!(reqs[0].body.as_ref(), br#"{"title":"hello"}"#);
    Ok(())
}

#[tokio::test]
async fn test_delete() -> Result<()> {
    let (client, requests) = init(StatusCode::OK);

    let resp = client.delete(["1", "2"], "articles", "_doc").await?;
    assert!(resp.is_some());

    let reqs = recorded(&requests);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, Method::POST);
    assert_eq!(reqs[0].uri, format!("{ENDPOINT}/_bulk"));

    let lines = std::str::from_utf8(&reqs[0].body)?
        .lines()
        .map(serde_json::from_str::<serde_json::Value>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    assert_eq!(
        lines,
        vec![
            json!({"delete": {"_index": "articles", "_type": "_doc", "_id": "1"}}),
            json!({"delete": {"_index": "articles", "_type": "_doc", "_id": "2"}}),
        ]
    );
    assert!(reqs[0].body.ends_with(b"\n"));
    Ok(())
}

#[tokio::test]
async fn test_delete_without_ids_sends_nothing() -> Result<()> {
    let (client, requests) = init(StatusCode::OK);

    let resp = client
        .delete(Vec::<String>::new(), "articles", "_doc")
        .await?;
    assert!(resp.is_none());
    assert!(recorded(&requests).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_search_and_delete_by_query() -> Result<()> {
    let (client, requests) = init(StatusCode::OK);
    let query = json!({"query": {"term": {"tag": "rust"}}});

    let resp = client.search("articles", &query).await?;
    assert_eq!(resp.json::<serde_json::Value>()?["result"], "ok");
    client.delete_by_query("articles", &query).await?;

    let reqs = recorded(&requests);
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].uri, format!("{ENDPOINT}/articles/_search"));
    assert_eq!(reqs[1].uri, format!("{ENDPOINT}/articles/_delete_by_query"));
    for req in reqs {
        assert_eq!(req.method, Method::POST);
        assert_eq!(serde_json::from_slice::<serde_json::Value>(&req.body)?, query);
    }
    Ok(())
}

#[tokio::test]
async fn test_bulk() -> Result<()> {
    let (client, requests) = init(StatusCode::OK);
    let payload = "{\"index\":{\"_index\":\"articles\",\"_id\":\"1\"}}\n{\"title\":\"hello\"}\n";

    client.bulk(payload).await?;

    let reqs = recorded(&requests);
    assert_eq!(reqs[0].uri, format!("{ENDPOINT}/_bulk"));
    assert_eq!(reqs[0].body.as_ref(), payload.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_index_exists() -> Result<()> {
    let (client, requests) = init(StatusCode::OK);
    assert!(client.index_exists("articles").await?);
    assert_eq!(recorded(&requests)[0].method, Method::HEAD);

    let (client, _) = init(StatusCode::NOT_FOUND);
    assert!(!client.index_exists("articles").await?);
    Ok(())
}

#[tokio::test]
async fn test_rejected_request() -> Result<()> {
    let (client, _) = init(StatusCode::INTERNAL_SERVER_ERROR);

    let err = client
        .search("articles", &json!({"query": {"match_all": {}}}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestRejected);
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.response_body(), Some(r#"{"result":"ok"}"#));
    Ok(())
}
