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
//! [`HttpSend`] implementation backed by [`reqwest`].
//!
//! Streaming bodies are forwarded chunk by chunk and never buffered in memory.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};
use searchsign_core::{Body, Error, HttpSend, Result};
use tokio_util::io::ReaderStream;

/// ReqwestHttpSend sends requests with a [`reqwest::Client`].
///
/// No retry is performed, every failure is returned as
/// [`ErrorKind::Transport`](searchsign_core::ErrorKind::Transport).
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>> {
        let req = req.map(|body| match body {
            Body::Bytes(bs) => reqwest::Body::from(bs),
            Body::Stream(s) => reqwest::Body::wrap_stream(ReaderStream::new(s)),
        });
        let req = Request::try_from(req).map_err(|e| {
            Error::transport("failed to build request for reqwest").with_source(e)
        })?;

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport("failed to send request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
