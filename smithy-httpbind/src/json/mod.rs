/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Reference implementation of the structured-serializer capability.
//!
//! Generated code is format-agnostic; this module is the concrete codec the
//! test suites (and simple callers) plug in. It implements
//! [`StructSerializer`](crate::schema::StructSerializer) and
//! [`StructDeserializer`](crate::schema::StructDeserializer) over compact
//! JSON.

pub mod escape;

mod de;
mod ser;

pub use de::JsonDeserializer;
pub use ser::JsonSerializer;

/// Error produced by the JSON codec.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error(transparent)]
    Timestamp(#[from] crate::instant::FormatError),
    #[error(transparent)]
    TimestampParse(#[from] crate::instant::ParseError),
    #[error(transparent)]
    Base64(#[from] crate::base64::DecodeError),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character `{found}` at offset {offset}, expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: char,
        offset: usize,
    },
    #[error("input was not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid escape sequence in string at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },
    #[error("map entry written without a key")]
    MissingEntryKey,
    #[error("serializer finished with an open scope")]
    UnclosedScope,
}
