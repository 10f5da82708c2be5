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

use crate::{Error, Result};
use http::header::AsHeaderName;
use http::uri::Authority;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use std::mem;

/// Signing context for request.
///
/// It's built from a copy of the request, so nothing on the original request
/// changes until [`SigningRequest::apply`] is called.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as it appears on the wire.
    pub path: String,
    /// HTTP query parameters, raw and in the order they were supplied.
    ///
    /// Pieces without `=` carry an empty value.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &http::request::Parts) -> Result<Self> {
        let uri = &parts.uri;
        let authority = uri.authority().cloned().ok_or_else(|| {
            Error::signing_failed(format!(
                "request uri {uri} without authority is invalid for signing"
            ))
        })?;

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority,
            path: uri.path().to_string(),
            query: uri.query().map(Self::query_parse).unwrap_or_default(),
            headers: parts.headers.clone(),
        })
    }

    /// Apply the signed headers back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) {
        mem::swap(&mut parts.headers, &mut self.headers);
    }

    /// Split a raw query string into `(name, value)` pairs.
    ///
    /// Nothing is decoded. Empty pieces like the one in `a=1&&b=2` are dropped.
    pub fn query_parse(query: &str) -> Vec<(String, String)> {
        query
            .split('&')
            .filter(|v| !v.is_empty())
            .map(|v| match v.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (v.to_string(), String::new()),
            })
            .collect()
    }

    /// Get the value for the `Host` header.
    ///
    /// The port is only kept when it's not the default one of the scheme.
    pub fn host_header_value(&self) -> String {
        let host = self.authority.host();
        match self.authority.port_u16() {
            Some(port) if !is_default_port(&self.scheme, port) => format!("{host}:{port}"),
            _ => host.to_string(),
        }
    }

    /// Get header value by name, joining repeated headers with `,`.
    ///
    /// Returns `None` if header not found.
    pub fn header_get_joined<K: AsHeaderName>(&self, key: K) -> Result<Option<String>> {
        let mut values = self.headers.get_all(key).iter().peekable();
        if values.peek().is_none() {
            return Ok(None);
        }

        let values = values
            .map(|v| v.to_str().map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(values.join(",")))
    }

    /// Normalize header value.
    ///
    /// Runs of whitespace collapse into one space and the value is trimmed,
    /// unless the whole value is wrapped in double quotes.
    pub fn header_value_normalize(v: &str) -> String {
        if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
            return v.to_string();
        }

        v.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Get header names as sorted vector, filtered by `filter`.
    pub fn header_name_to_vec_sorted(&self, filter: impl Fn(&str) -> bool) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .filter(|k| filter(k))
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }
}

fn is_default_port(scheme: &Scheme, port: u16) -> bool {
    (*scheme == Scheme::HTTP && port == 80) || (*scheme == Scheme::HTTPS && port == 443)
}
