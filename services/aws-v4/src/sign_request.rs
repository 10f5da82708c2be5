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

use crate::constants::{
    AWS_QUERY_ENCODE_SET, UNSIGNED_HEADERS, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
    X_AMZ_SECURITY_TOKEN,
};
use crate::Credential;
use async_trait::async_trait;
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;
use percent_encoding::utf8_percent_encode;
use searchsign_core::hash::{hex_hmac_sha256, hex_sha256, hex_sha256_body, hmac_sha256};
use searchsign_core::time::{format_date, format_iso8601, now, DateTime};
use searchsign_core::{Body, Context, Error, Result, SignRequest, SigningRequest};
use std::fmt::Write;

/// RequestSigner that implement AWS SigV4 with header based signing.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Headers listed in [`UNSIGNED_HEADERS`](crate::UNSIGNED_HEADERS) are left
/// out of the signature, everything else on the request is signed.
#[derive(Debug)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new builder for AWS V4 signer.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &mut Body,
        cred: &Self::Credential,
    ) -> Result<()> {
        let now = self.time.unwrap_or_else(now);
        let mut signed_req = SigningRequest::build(req)?;

        let body_digest = match signed_req.headers.get(X_AMZ_CONTENT_SHA_256) {
            Some(v) => v.to_str()?.to_string(),
            None => hex_sha256_body(body).await?,
        };

        canonicalize_header(&mut signed_req, cred, &body_digest, now)?;

        // build canonical request and string to sign.
        let creq = canonical_request_string(&signed_req, &self.service, &body_digest)?;
        debug!("calculated canonical request: {creq}");
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(now),
            self.region,
            self.service
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "AWS4-HMAC-SHA256")?;
            writeln!(f, "{}", format_iso8601(now))?;
            writeln!(f, "{}", &scope)?;
            write!(f, "{}", &encoded_req)?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id,
            scope,
            signed_header_names(&signed_req).join(";"),
            signature
        ))
        .map_err(|e| {
            Error::signing_failed("failed to create authorization header").with_source(e)
        })?;
        authorization.set_sensitive(true);

        signed_req
            .headers
            .insert(header::AUTHORIZATION, authorization);

        // Apply to the request.
        signed_req.apply(req);
        Ok(())
    }
}

fn signed_header_names(ctx: &SigningRequest) -> Vec<&str> {
    ctx.header_name_to_vec_sorted(|k| !UNSIGNED_HEADERS.contains(&k))
}

fn canonical_request_string(
    ctx: &SigningRequest,
    service: &str,
    body_digest: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", ctx.method.as_str().to_uppercase())?;
    // Insert encoded path
    writeln!(f, "{}", canonical_path(&ctx.path, service))?;
    // Insert query
    writeln!(f, "{}", canonical_query(&ctx.query))?;
    // Insert signed headers
    let signed_headers = signed_header_names(ctx);
    for name in signed_headers.iter() {
        let value = ctx.header_get_joined(*name)?.unwrap_or_default();
        writeln!(
            f,
            "{}:{}",
            name,
            SigningRequest::header_value_normalize(&value)
        )?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers.join(";"))?;
    write!(f, "{body_digest}")?;

    Ok(f)
}

/// Escape every `/` delimited segment on its own.
///
/// s3 expects the path exactly as sent, so it's left untouched.
fn canonical_path(path: &str, service: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    if service == "s3" {
        return path.to_string();
    }

    path.split('/')
        .map(|seg| utf8_percent_encode(seg, &AWS_QUERY_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort query pairs by raw name.
///
/// Pairs sharing a name keep their original order, the sort is stable.
fn canonical_query(query: &[(String, String)]) -> String {
    let mut query = query.iter().collect::<Vec<_>>();
    query.sort_by(|(l, _), (r, _)| l.cmp(r));

    query
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonicalize_header(
    ctx: &mut SigningRequest,
    cred: &Credential,
    body_digest: &str,
    now: DateTime,
) -> Result<()> {
    ctx.headers
        .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);

    ctx.headers.insert(
        header::HOST,
        HeaderValue::try_from(ctx.host_header_value()).map_err(|e| {
            Error::signing_failed("failed to parse authority as header value").with_source(e)
        })?,
    );

    // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
    if let Some(token) = &cred.session_token {
        let mut value = HeaderValue::from_str(token).map_err(|e| {
            Error::signing_failed("failed to create security token header").with_source(e)
        })?;
        // Set token value sensitive to valid leaking.
        value.set_sensitive(true);

        ctx.headers.insert(X_AMZ_SECURITY_TOKEN, value);
    }

    if !ctx.headers.contains_key(X_AMZ_CONTENT_SHA_256) {
        ctx.headers
            .insert(X_AMZ_CONTENT_SHA_256, HeaderValue::try_from(body_digest)?);
    }

    Ok(())
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}
