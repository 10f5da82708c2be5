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
//! Signed HTTP access to AWS managed search endpoints.
//!
//! `searchsign` signs every outbound request with AWS Signature Version 4
//! and sends it to an OpenSearch or Elasticsearch domain, without pulling in
//! a vendor SDK.
//!
//! - [`HttpClient`] signs and sends one request, and classifies the response.
//! - [`SearchClient`] offers the document level operations on top of it.
//!
//! ## Example
//!
//! ```no_run
//! use searchsign::{default_context, ClientConfig, SearchClient};
//! use serde_json::json;
//!
//! # async fn example() -> searchsign::Result<()> {
//! let ctx = default_context();
//! let client = SearchClient::from_env(ctx)?;
//!
//! client
//!     .index("1", &json!({"title": "hello"}), "articles", "_doc")
//!     .await?;
//! let resp = client
//!     .search("articles", &json!({"query": {"match_all": {}}}))
//!     .await?;
//! println!("{}", resp.text());
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub use searchsign_core::*;

/// AWS SigV4 signing types.
pub mod aws {
    pub use searchsign_aws_v4::*;
}

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{default_context, DefaultContext};

mod config;
pub use config::ClientConfig;

mod client;
pub use client::{HttpClient, Response};

mod search;
pub use search::SearchClient;
