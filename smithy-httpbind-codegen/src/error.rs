/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Generation-time configuration errors.
//!
//! Every variant names the shape (and member, where there is one) it was
//! raised for; a failure is fatal for that shape's emission but the run
//! continues with unrelated shapes so all errors surface in one pass.

use crate::model::{ShapeId, ShapeKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("shape `{shape}` is referenced but not present in the model")]
    MissingShape { shape: ShapeId },

    #[error("`{shape}`: expected a {expected:?} shape, found {found:?}")]
    UnexpectedShapeKind {
        shape: ShapeId,
        expected: ShapeKind,
        found: ShapeKind,
    },

    #[error("operation `{shape}` has no HTTP trait")]
    MissingHttpTrait { shape: ShapeId },

    #[error("invalid path template `{uri}`: {reason}")]
    InvalidUriTemplate { uri: String, reason: String },

    #[error(
        "member `{shape}${member}` carries conflicting HTTP bindings `{first}` and `{second}`"
    )]
    ConflictingBindings {
        shape: ShapeId,
        member: String,
        first: &'static str,
        second: &'static str,
    },

    #[error(
        "`{shape}` declares more than one explicit payload member (`{first}` and `{second}`)"
    )]
    MultiplePayloads {
        shape: ShapeId,
        first: String,
        second: String,
    },

    #[error(
        "`{shape}` mixes the explicit payload member `{payload}` with the document member `{document}`"
    )]
    PayloadWithDocumentMembers {
        shape: ShapeId,
        payload: String,
        document: String,
    },

    #[error("label member `{shape}${member}` has no matching placeholder in `{uri}`")]
    LabelWithoutPlaceholder {
        shape: ShapeId,
        member: String,
        uri: String,
    },

    #[error("placeholder `{{{label}}}` in `{uri}` has no label-bound member on `{shape}`")]
    PlaceholderWithoutLabel {
        shape: ShapeId,
        label: String,
        uri: String,
    },

    #[error(
        "member `{shape}${member}` cannot be bound to {location}: `{target}` is not usable there"
    )]
    UnsupportedBinding {
        shape: ShapeId,
        member: String,
        location: &'static str,
        target: ShapeId,
    },

    #[error("member `{shape}${member}` targets `{target}`, which cannot appear in a document body")]
    InvalidMemberTarget {
        shape: ShapeId,
        member: String,
        target: ShapeId,
    },

    #[error("a source unit named `{name}` was already generated (for shape `{shape}`)")]
    DuplicateUnit { name: String, shape: ShapeId },
}

#[cfg(test)]
mod test {
    use super::Error;
    use crate::model::ShapeId;

    #[test]
    fn errors_carry_shape_and_member_identity() {
        let err = Error::ConflictingBindings {
            shape: ShapeId::new("com.example#Input"),
            member: "token".to_string(),
            first: "httpHeader",
            second: "httpPayload",
        };
        let message = err.to_string();
        assert!(message.contains("com.example#Input$token"));
        assert!(message.contains("httpHeader"));
        assert!(message.contains("httpPayload"));
    }
}
