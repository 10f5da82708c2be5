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

use crate::{
    Body, Context, Error, ProvideCredential, Result, SignRequest, SigningCredential,
};
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// The credential is queried from the provider on every call and never
/// cached here, rotation is left to the provider.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
        }
    }

    /// Replace the credential provider.
    pub fn with_credential_provider(
        mut self,
        provider: impl ProvideCredential<Credential = K>,
    ) -> Self {
        self.loader = Arc::new(provider);
        self
    }

    /// Get the context of this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts, body: &mut Body) -> Result<()> {
        let Some(cred) = self.loader.provide_credential(&self.ctx).await? else {
            return Err(Error::credential_invalid(
                "no credential found from the configured provider",
            ));
        };
        if !cred.is_valid() {
            return Err(Error::credential_expired(
                "credential from the configured provider is invalid or expired",
            ));
        }

        self.builder
            .sign_request(&self.ctx, req, body, &cred)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use http::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct TestCredential {
        token: String,
    }

    impl SigningCredential for TestCredential {
        fn is_valid(&self) -> bool {
            !self.token.is_empty()
        }
    }

    #[derive(Debug, Default)]
    struct CountingProvider {
        token: Option<String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProvideCredential for CountingProvider {
        type Credential = TestCredential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<TestCredential>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.token.as_ref().map(|t| TestCredential {
                token: format!("{t}-{n}"),
            }))
        }
    }

    #[derive(Debug)]
    struct HeaderSigner;

    #[async_trait]
    impl SignRequest for HeaderSigner {
        type Credential = TestCredential;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            _: &mut Body,
            cred: &TestCredential,
        ) -> Result<()> {
            req.headers
                .insert("x-token", HeaderValue::from_str(&cred.token)?);
            Ok(())
        }
    }

    fn parts() -> http::request::Parts {
        http::Request::builder()
            .uri("https://example.com/")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_credential_is_queried_per_call() -> anyhow::Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingProvider {
                token: Some("tok".to_string()),
                calls: calls.clone(),
            },
            HeaderSigner,
        );

        let mut first = parts();
        signer.sign(&mut first, &mut Body::empty()).await?;
        let mut second = parts();
        signer.sign(&mut second, &mut Body::empty()).await?;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.headers["x-token"], "tok-0");
        assert_eq!(second.headers["x-token"], "tok-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let signer = Signer::new(Context::new(), CountingProvider::default(), HeaderSigner);

        let mut req = parts();
        let err = signer
            .sign(&mut req, &mut Body::empty())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(req.headers.is_empty());
    }
}
