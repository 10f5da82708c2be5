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
use reqwest::Client;
use searchsign_core::{Context, OsEnv};
use searchsign_http_send_reqwest::ReqwestHttpSend;

/// DefaultContext builds a [`Context`] backed by reqwest and the OS environment.
///
/// ```no_run
/// use std::time::Duration;
///
/// let client = reqwest::Client::builder()
///     .timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// let ctx = searchsign::DefaultContext::with_client(client).build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct DefaultContext {
    client: Client,
}

impl DefaultContext {
    /// Create a new DefaultContext with a default reqwest client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a new DefaultContext with the given reqwest client.
    ///
    /// Timeouts, proxies and TLS settings all live on the client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Build the [`Context`].
    pub fn build(self) -> Context {
        Context::new()
            .with_http_send(ReqwestHttpSend::new(self.client))
            .with_env(OsEnv)
    }
}

impl From<DefaultContext> for Context {
    fn from(value: DefaultContext) -> Self {
        value.build()
    }
}

/// Create a [`Context`] with the default reqwest client and the OS environment.
pub fn default_context() -> Context {
    DefaultContext::new().build()
}
