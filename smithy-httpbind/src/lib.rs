/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Runtime support for code emitted by `smithy-httpbind-codegen`.
//!
//! Generated (de)serializers are written against the capabilities in this
//! crate: the descriptor-driven [`schema`] interfaces for structured bodies,
//! the [`label`]/[`query`]/[`header`] helpers for HTTP bindings, and
//! [`instant`] for timestamp encodings. The [`json`] module is the reference
//! implementation of the structured serializer capability and is what the
//! test suites drive generated-shaped code through.

pub mod base64;
pub mod body;
pub mod header;
pub mod instant;
pub mod json;
pub mod label;
pub mod operation;
pub mod query;
pub mod schema;

pub use crate::instant::Instant;

/// Binary data.
///
/// Wrapped so that blobs are distinguishable from other byte buffers in
/// generated code, and so the base64 document encoding has a single choke
/// point.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Blob {
    inner: Vec<u8>,
}

impl Blob {
    pub fn new<T: Into<Vec<u8>>>(inp: T) -> Self {
        Blob { inner: inp.into() }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}
