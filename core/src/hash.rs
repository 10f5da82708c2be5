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

//! Hash related utils.

use crate::body::Body;
use crate::Error;
use hmac::Hmac;
use hmac::Mac;
use sha2::Digest;
use sha2::Sha256;
use std::io::SeekFrom;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncSeekExt;

/// Hex encoded SHA256 hash of empty content.
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Chunk size used while digesting streaming bodies.
const DIGEST_CHUNK_SIZE: usize = 64 * 1024;

/// Hex encoded SHA256 hash.
///
/// Use this function instead of `hex::encode(sha256(content))` can reduce
/// extra copy.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content).as_slice())
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    h.finalize().into_bytes().to_vec()
}

/// Hex encoded HMAC with SHA256 hash.
///
/// Use this function instead of `hex::encode(hmac_sha256(key, content))` can
/// reduce extra copy.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    hex::encode(h.finalize().into_bytes())
}

/// Hex encoded SHA256 hash of a request body.
///
/// In-memory bodies are hashed directly. Streaming bodies are read in bounded
/// chunks and seeked back to where they started, so the body can still be
/// sent afterwards.
pub async fn hex_sha256_body(body: &mut Body) -> crate::Result<String> {
    let stream = match body {
        Body::Bytes(bs) => return Ok(hex_sha256(bs)),
        Body::Stream(stream) => stream,
    };

    let start = stream
        .stream_position()
        .await
        .map_err(|e| Error::signing_failed("failed to locate body stream").with_source(e))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0; DIGEST_CHUNK_SIZE];
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| Error::signing_failed("failed to read body stream").with_source(e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    stream
        .seek(SeekFrom::Start(start))
        .await
        .map_err(|e| Error::signing_failed("failed to rewind body stream").with_source(e))?;

    Ok(hex::encode(hasher.finalize().as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

    #[test]
    fn test_empty_sha256() {
        assert_eq!(hex_sha256(b""), EMPTY_SHA256);
    }

    #[tokio::test]
    async fn test_stream_digest_matches_bytes_and_rewinds() -> anyhow::Result<()> {
        let content = vec![b'x'; DIGEST_CHUNK_SIZE * 2 + 17];
        let mut body = Body::stream(Cursor::new(content.clone()));

        let digest = hex_sha256_body(&mut body).await?;
        assert_eq!(digest, hex_sha256(&content));

        let Body::Stream(stream) = &mut body else {
            panic!("body must stay a stream");
        };
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).await?;
        assert_eq!(rest, content);
        Ok(())
    }

    #[tokio::test]
    async fn test_stream_digest_starts_at_current_position() -> anyhow::Result<()> {
        let mut cursor = Cursor::new(b"skip:payload".to_vec());
        cursor.set_position(5);
        let mut body = Body::stream(cursor);

        assert_eq!(hex_sha256_body(&mut body).await?, hex_sha256(b"payload"));
        Ok(())
    }

    #[derive(Debug)]
    struct BrokenStream;

    impl AsyncRead for BrokenStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::other("disk on fire")))
        }
    }

    impl AsyncSeek for BrokenStream {
        fn start_seek(self: Pin<&mut Self>, _: SeekFrom) -> std::io::Result<()> {
            Ok(())
        }

        fn poll_complete(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<u64>> {
            Poll::Ready(Ok(0))
        }
    }

    #[tokio::test]
    async fn test_unreadable_stream_fails_signing() {
        let mut body = Body::stream(BrokenStream);
        let err = hex_sha256_body(&mut body).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SigningFailed);
    }
}
