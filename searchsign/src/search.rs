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
use crate::{ClientConfig, HttpClient, Response};
use bytes::Bytes;
use http::Method;
use log::debug;
use percent_encoding::utf8_percent_encode;
use searchsign_aws_v4::{DefaultCredentialProvider, AWS_QUERY_ENCODE_SET};
use searchsign_core::{Body, Context, Error, Result};
use serde_json::{json, Value};

/// SearchClient exposes document operations of a search domain.
///
/// Each operation is exactly one signed request sent through [`HttpClient`].
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: HttpClient,
}

impl SearchClient {
    /// Create a new SearchClient on top of the given [`HttpClient`].
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Create a new SearchClient configured from environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the endpoint settings. Credentials
    /// come from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `AWS_SESSION_TOKEN`, read again for every request.
    pub fn from_env(ctx: Context) -> Result<Self> {
        let config = ClientConfig::from_env(&ctx)?;
        Ok(Self::new(HttpClient::with_credential_provider(
            config,
            ctx,
            DefaultCredentialProvider::new(),
        )))
    }

    /// Get the underlying [`HttpClient`].
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Store `body` as document `id` with `PUT /{index}/{doc_type}/{id}`.
    pub async fn index(
        &self,
        id: &str,
        body: &Value,
        index: &str,
        doc_type: &str,
    ) -> Result<Response> {
        let path = format!(
            "/{}/{}/{}",
            escape_segment(index),
            escape_segment(doc_type),
            escape_segment(id)
        );
        self.http
            .perform_request(Method::PUT, &path, &[], json_body(body)?)
            .await
    }

    /// Delete documents by id through the bulk API.
    ///
    /// Returns `None` without sending anything when `ids` is empty.
    pub async fn delete<I, S>(&self, ids: I, index: &str, doc_type: &str) -> Result<Option<Response>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut payload = String::new();
        for id in ids {
            let action = json!({
                "delete": {
                    "_index": index,
                    "_type": doc_type,
                    "_id": id.as_ref(),
                }
            });
            payload.push_str(&action.to_string());
            payload.push('\n');
        }
        if payload.is_empty() {
            debug!("no ids to delete from index {index}, skipped");
            return Ok(None);
        }

        self.bulk(payload).await.map(Some)
    }

    /// Run `query` against `index` with `POST /{index}/_search`.
    pub async fn search(&self, index: &str, query: &Value) -> Result<Response> {
        let path = format!("/{}/_search", escape_segment(index));
        self.http
            .perform_request(Method::POST, &path, &[], json_body(query)?)
            .await
    }

    /// Send an NDJSON payload to `POST /_bulk`.
    ///
    /// Every action line, including the last one, must end with `\n`.
    pub async fn bulk(&self, body: impl Into<Bytes>) -> Result<Response> {
        self.http
            .perform_request(Method::POST, "/_bulk", &[], Body::Bytes(body.into()))
            .await
    }

    /// Delete every document of `index` matching `query`.
    pub async fn delete_by_query(&self, index: &str, query: &Value) -> Result<Response> {
        let path = format!("/{}/_delete_by_query", escape_segment(index));
        self.http
            .perform_request(Method::POST, &path, &[], json_body(query)?)
            .await
    }

    /// Check if `index` exists with `HEAD /{index}`.
    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let path = format!("/{}", escape_segment(index));
        let resp = self
            .http
            .perform_request(Method::HEAD, &path, &[], Body::empty())
            .await?;
        Ok(!resp.is_not_found())
    }
}

fn escape_segment(segment: &str) -> String {
    utf8_percent_encode(segment, &AWS_QUERY_ENCODE_SET).to_string()
}

fn json_body(value: &Value) -> Result<Body> {
    let bs = serde_json::to_vec(value)
        .map_err(|e| Error::unexpected("failed to serialize json body").with_source(e))?;
    Ok(Body::from(bs))
}
