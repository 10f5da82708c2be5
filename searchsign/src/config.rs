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
use searchsign_aws_v4::Config;
use searchsign_core::{Context, Error, Result};

/// Env value for the search endpoint, like `https://search-domain.us-east-1.es.amazonaws.com`.
pub const SEARCHSIGN_ENDPOINT: &str = "SEARCHSIGN_ENDPOINT";
/// Env value for the signing service name.
pub const SEARCHSIGN_SERVICE: &str = "SEARCHSIGN_SERVICE";

/// Service name used by managed Elasticsearch and OpenSearch domains.
const DEFAULT_SERVICE: &str = "es";

/// ClientConfig tells [`HttpClient`](crate::HttpClient) where requests go and how they are scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the search domain, with scheme and host.
    ///
    /// A trailing `/` is ignored.
    pub endpoint: String,
    /// Service name used in the credential scope, `es` by default.
    ///
    /// Serverless collections use `aoss`.
    pub service: String,
    /// Region used in the credential scope.
    pub region: String,
}

impl ClientConfig {
    /// Create a new config for the `es` service.
    pub fn new(endpoint: &str, region: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            region: region.to_string(),
        }
    }

    /// Set the service name.
    pub fn with_service(mut self, service: &str) -> Self {
        self.service = service.to_string();
        self
    }

    /// Load config from environment variables.
    ///
    /// - endpoint: [`SEARCHSIGN_ENDPOINT`]
    /// - service: [`SEARCHSIGN_SERVICE`], falls back to `es`
    /// - region: `AWS_REGION`, then `AWS_DEFAULT_REGION`
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let endpoint = ctx
            .env_var(SEARCHSIGN_ENDPOINT)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::config_invalid(format!("env {SEARCHSIGN_ENDPOINT} is not set"))
            })?;
        let region = Config::from_env(ctx).region.ok_or_else(|| {
            Error::config_invalid("region is not set, set AWS_REGION or AWS_DEFAULT_REGION")
        })?;
        let service = ctx
            .env_var(SEARCHSIGN_SERVICE)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE.to_string());

        let cfg = Self {
            endpoint,
            service,
            region,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that the endpoint is an absolute http(s) URL and that service
    /// and region are set.
    pub fn validate(&self) -> Result<()> {
        let uri = self.endpoint.parse::<http::Uri>().map_err(|e| {
            Error::config_invalid(format!("endpoint {} is not a valid uri", self.endpoint))
                .with_source(e)
        })?;
        if !matches!(uri.scheme_str(), Some("http" | "https")) || uri.authority().is_none() {
            return Err(Error::config_invalid(format!(
                "endpoint {} must be an absolute http or https url",
                self.endpoint
            )));
        }
        if uri.query().is_some() {
            return Err(Error::config_invalid(format!(
                "endpoint {} must not carry a query",
                self.endpoint
            )));
        }
        if self.service.is_empty() {
            return Err(Error::config_invalid("service must not be empty"));
        }
        if self.region.is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }

        Ok(())
    }

    /// Endpoint without trailing `/`.
    pub(crate) fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}
