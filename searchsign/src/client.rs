// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use crate::ClientConfig;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use log::debug;
use percent_encoding::utf8_percent_encode;
use searchsign_aws_v4::{Credential, RequestSigner, AWS_QUERY_ENCODE_SET};
use searchsign_core::{Body, Context, Error, ProvideCredential, Result, Signer};
use serde::de::DeserializeOwned;
use std::fmt::Write;
use std::sync::Arc;

/// Response returned by [`HttpClient::perform_request`].
///
/// Only successful responses and `404 Not Found` are returned this way,
/// everything else becomes an [`ErrorKind::RequestRejected`](searchsign_core::ErrorKind::RequestRejected) error.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code of the response.
    pub status: StatusCode,
    /// Headers of the response.
    pub headers: HeaderMap,
    /// Body of the response, fully read.
    pub body: Bytes,
}

impl Response {
    /// Body as text, invalid utf-8 is replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as json.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::unexpected("failed to deserialize response body as json").with_source(e)
        })
    }

    /// Check if the service answered `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

impl From<http::Response<Bytes>> for Response {
    fn from(resp: http::Response<Bytes>) -> Self {
        let (parts, body) = resp.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

/// HttpClient signs requests with SigV4 and sends them to the search endpoint.
///
/// Every call asks the credential provider again, so rotated credentials are
/// picked up without rebuilding the client. Nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: Arc<ClientConfig>,
    signer: Signer<Credential>,
}

impl HttpClient {
    /// Create a new client from a config and a ready signer.
    ///
    /// The signer must be scoped to the same service and region as `config`.
    pub fn new(config: ClientConfig, signer: Signer<Credential>) -> Self {
        Self {
            config: Arc::new(config),
            signer,
        }
    }

    /// Create a new client that signs with credentials from `provider`.
    pub fn with_credential_provider(
        config: ClientConfig,
        ctx: Context,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        let signer = Signer::new(
            ctx,
            provider,
            RequestSigner::new(&config.service, &config.region),
        );
        Self::new(config, signer)
    }

    /// Get the config of this client.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sign and send one request.
    ///
    /// `path` is appended to the endpoint as is, callers escape path segments
    /// themselves. `params` are escaped here.
    ///
    /// Returns the response for any 2xx status and for `404 Not Found`.
    pub async fn perform_request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Body,
    ) -> Result<Response> {
        let url = self.build_url(path, params)?;

        let mut req = http::Request::builder()
            .method(method)
            .uri(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(len) = body.len() {
            req = req.header(CONTENT_LENGTH, len);
        }
        let (mut parts, _) = req.body(())?.into_parts();

        let mut body = body;
        self.signer.sign(&mut parts, &mut body).await?;

        debug!("sending request: {} {url}", parts.method);
        let resp: Response = self
            .signer
            .context()
            .http_send(http::Request::from_parts(parts, body))
            .await?
            .into();
        debug!("got response status: {}", resp.status);

        if resp.status.is_success() || resp.is_not_found() {
            Ok(resp)
        } else {
            Err(Error::request_rejected(resp.status, resp.text()))
        }
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let mut url = String::with_capacity(128);
        url.push_str(self.config.base_url());
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);

        for (idx, (k, v)) in params.iter().enumerate() {
            url.push(if idx == 0 { '?' } else { '&' });
            write!(
                url,
                "{}={}",
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET)
            )?;
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::header::AUTHORIZATION;
    use pretty_assertions::assert_eq;
    use searchsign_aws_v4::StaticCredentialProvider;
    use searchsign_core::{ErrorKind, HttpSend};
    use std::sync::Mutex;
    use test_case::test_case;

    /// Answers every request with a fixed status and body, and keeps the requests.
    #[derive(Debug)]
    struct MockHttpSend {
        status: StatusCode,
        body: &'static str,
        requests: Arc<Mutex<Vec<http::request::Parts>>>,
    }

    #[async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>> {
            let (parts, _) = req.into_parts();
            self.requests.lock().unwrap().push(parts);

            Ok(http::Response::builder()
                .status(self.status)
                .body(Bytes::from_static(self.body.as_bytes()))?)
        }
    }

    fn client(
        status: StatusCode,
        body: &'static str,
    ) -> (HttpClient, Arc<Mutex<Vec<http::request::Parts>>>) {
        let _ = env_logger::builder().is_test(true).try_init();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let ctx = Context::new().with_http_send(MockHttpSend {
            status,
            body,
            requests: requests.clone(),
        });
        let client = HttpClient::with_credential_provider(
            ClientConfig::new("https://search-domain.us-east-1.es.amazonaws.com/", "us-east-1"),
            ctx,
            StaticCredentialProvider::new("access_key_id", "secret_access_key"),
        );
        (client, requests)
    }

    #[test_case(StatusCode::OK; "ok")]
    #[test_case(StatusCode::CREATED; "created")]
    #[test_case(StatusCode::NOT_FOUND; "not found")]
    #[tokio::test]
    async fn test_accepted_status(status: StatusCode) {
        let (client, _) = client(status, r#"{"acknowledged":true}"#);

        let resp = client
            .perform_request(Method::GET, "/articles", &[], Body::empty())
            .await
            .expect("request must succeed");
        assert_eq!(resp.status, status);
        assert_eq!(resp.text(), r#"{"acknowledged":true}"#);
    }

    #[test_case(StatusCode::BAD_REQUEST; "bad request")]
    #[test_case(StatusCode::FORBIDDEN; "forbidden")]
    #[test_case(StatusCode::INTERNAL_SERVER_ERROR; "internal server error")]
    #[tokio::test]
    async fn test_rejected_status(status: StatusCode) {
        let (client, _) = client(status, r#"{"error":"boom"}"#);

        let err = client
            .perform_request(Method::GET, "/articles", &[], Body::empty())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestRejected);
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.response_body(), Some(r#"{"error":"boom"}"#));
    }

    #[tokio::test]
    async fn test_request_is_signed() {
        let (client, requests) = client(StatusCode::OK, "{}");

        client
            .perform_request(
                Method::POST,
                "articles/_search",
                &[("q", "title:hello world"), ("size", "10")],
                Body::from(r#"{"query":{"match_all":{}}}"#),
            )
            .await
            .expect("request must succeed");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(
            req.uri.to_string(),
            "https://search-domain.us-east-1.es.amazonaws.com/articles/_search?q=title%3Ahello%20world&size=10"
        );
        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        assert_eq!(req.headers[CONTENT_LENGTH], "26");
        assert_eq!(req.headers["host"], "search-domain.us-east-1.es.amazonaws.com");

        let auth = req.headers[AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=access_key_id/"));
        assert!(auth.contains("/us-east-1/es/aws4_request, SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date, "));
        assert_eq!(
            req.headers["x-amz-content-sha256"],
            "baa6846b65b050d71831bb2e4cd6e6f1593902f6d82b16a6c1f9979d14cfcd12"
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let client = HttpClient::with_credential_provider(
            ClientConfig::new("https://localhost:9200", "us-east-1"),
            Context::new(),
            StaticCredentialProvider::new("access_key_id", "secret_access_key"),
        );

        let err = client
            .perform_request(Method::HEAD, "/", &[], Body::empty())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_response_json() {
        let resp = Response::from(
            http::Response::builder()
                .status(StatusCode::OK)
                .body(Bytes::from_static(br#"{"hits":{"total":3}}"#))
                .unwrap(),
        );

        let v: serde_json::Value = resp.json().expect("must be valid json");
        assert_eq!(v["hits"]["total"], 3);
        assert!(!resp.is_not_found());

        let err = resp.json::<Vec<u8>>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }
}
