/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! HTTP body representation for generated operations.

use bytes::Bytes;
use std::fmt;
use std::io::Read;

/// A lazily-consumed byte stream.
///
/// Streaming payload members pass through a request or response body without
/// buffering; the stream is only read when the caller drains it.
pub struct ByteStream {
    inner: Box<dyn Read + Send>,
}

impl ByteStream {
    pub fn new(read: impl Read + Send + 'static) -> Self {
        ByteStream {
            inner: Box::new(read),
        }
    }

    pub fn from_static(bytes: &'static [u8]) -> Self {
        ByteStream::new(bytes)
    }

    /// Drain the stream into memory.
    pub fn collect(mut self) -> std::io::Result<Bytes> {
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream").finish_non_exhaustive()
    }
}

/// Body of a request or response built by generated code.
#[derive(Debug)]
pub enum Body {
    /// No body at all. Distinct from `Bytes(empty)`.
    Empty,
    /// A fully buffered body.
    Bytes(Bytes),
    /// A streaming body, passed through unbuffered.
    Stream(ByteStream),
}

impl Body {
    pub fn empty() -> Self {
        Body::Empty
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Body::Bytes(bytes.into())
    }

    /// Buffered contents, if this body is not streaming.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Empty => Some(&[]),
            Body::Bytes(bytes) => Some(bytes),
            Body::Stream(_) => None,
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

#[cfg(test)]
mod test {
    use super::{Body, ByteStream};

    #[test]
    fn empty_vs_bytes() {
        assert_eq!(Body::empty().bytes(), Some(&[][..]));
        assert_eq!(Body::from_bytes(vec![1u8, 2]).bytes(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn stream_collects_lazily() {
        let stream = ByteStream::from_static(b"streaming");
        let body = Body::Stream(stream);
        assert!(body.bytes().is_none());
        match body {
            Body::Stream(stream) => {
                assert_eq!(stream.collect().unwrap().as_ref(), b"streaming");
            }
            _ => unreachable!(),
        }
    }
}
