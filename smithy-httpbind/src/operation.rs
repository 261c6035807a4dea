/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Error types surfaced by generated (de)serializers at execution time.

use std::borrow::Cow;

/// Failure to turn a typed input into an HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A member required for the request line (e.g. a path label) was unset.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    /// A member failed to render (e.g. a timestamp out of range).
    #[error("failed to format field `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: Cow<'static, str>,
    },
    /// The structured body serializer reported an error.
    #[error("failed to serialize body: {0}")]
    Serialization(String),
    /// The assembled URI or headers were rejected by the HTTP layer.
    #[error("constructed request was invalid: {0}")]
    InvalidRequest(String),
}

impl BuildError {
    pub fn missing_field(field: &'static str) -> Self {
        BuildError::MissingField { field }
    }

    pub fn invalid_field(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        BuildError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

/// Failure to turn an HTTP response into a typed output or error value.
///
/// Unknown body fields are never an error; generated deserializers skip
/// them. These variants cover malformed values for fields the model does
/// know about.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid value for header `{header}`")]
    InvalidHeader { header: &'static str },
    #[error("response body was not valid for the expected payload: {message}")]
    InvalidPayload { message: Cow<'static, str> },
    #[error("failed to deserialize body: {0}")]
    Deserialization(String),
}

impl ParseError {
    pub fn invalid_header(header: &'static str) -> Self {
        ParseError::InvalidHeader { header }
    }

    pub fn invalid_payload(message: impl Into<Cow<'static, str>>) -> Self {
        ParseError::InvalidPayload {
            message: message.into(),
        }
    }
}
