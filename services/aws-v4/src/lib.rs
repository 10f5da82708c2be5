//! AWS SigV4 signer for managed search endpoints.
//!
//! This crate implements header based [Signature Version 4] signing on top of
//! `searchsign-core`.
//!
//! [Signature Version 4]: https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html
//!
//! ## Example
//!
//! ```no_run
//! use searchsign_aws_v4::{EnvCredentialProvider, RequestSigner};
//! use searchsign_core::{Body, Context, OsEnv, Signer};
//!
//! # async fn example() -> searchsign_core::Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let signer = Signer::new(
//!     ctx,
//!     EnvCredentialProvider::new(),
//!     RequestSigner::new("es", "us-east-1"),
//! );
//!
//! let (mut parts, _) = http::Request::builder()
//!     .method("GET")
//!     .uri("https://search-domain.us-east-1.es.amazonaws.com/_cluster/health")
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//! signer.sign(&mut parts, &mut Body::empty()).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub use constants::AWS_QUERY_ENCODE_SET;
pub use constants::UNSIGNED_HEADERS;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;
