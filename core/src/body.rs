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

use bytes::Bytes;
use std::fmt::{Debug, Formatter};
use tokio::io::{AsyncRead, AsyncSeek};

/// BodyStream is a readable and seekable request body, like a file.
///
/// The signer reads the stream to compute the payload digest and seeks it
/// back afterwards, so the same stream can be sent by the transport.
pub trait BodyStream: AsyncRead + AsyncSeek + Send + Unpin + 'static {}

impl<T> BodyStream for T where T: AsyncRead + AsyncSeek + Send + Unpin + 'static {}

/// Body of a request to be signed and sent.
pub enum Body {
    /// In-memory content.
    Bytes(Bytes),
    /// Streaming content that is read in chunks.
    Stream(Box<dyn BodyStream>),
}

impl Body {
    /// Create an empty body.
    pub fn empty() -> Self {
        Body::Bytes(Bytes::new())
    }

    /// Create a streaming body.
    pub fn stream(s: impl BodyStream) -> Self {
        Body::Stream(Box::new(s))
    }

    /// Length of the body if it's held in memory.
    pub fn len(&self) -> Option<usize> {
        match self {
            Body::Bytes(bs) => Some(bs.len()),
            Body::Stream(_) => None,
        }
    }

    /// Check if the body is known to be empty.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Bytes(bs) => f.debug_tuple("Bytes").field(&bs.len()).finish(),
            Body::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bs: Bytes) -> Self {
        Body::Bytes(bs)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bs: Vec<u8>) -> Self {
        Body::Bytes(bs.into())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(s.into())
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}
