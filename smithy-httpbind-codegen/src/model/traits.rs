/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Typed traits attached to shapes and members.
//!
//! The model is closed: every trait the generator understands is a variant
//! of [`KnownTrait`], resolved at generation time by [`TraitKind`] rather
//! than by runtime reflection.

use smithy_httpbind::instant::Format;

/// Discriminant used to query a [`TraitSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKind {
    Http,
    HttpLabel,
    HttpHeader,
    HttpPrefixHeaders,
    HttpQuery,
    HttpPayload,
    TimestampFormat,
    Streaming,
    Required,
    Enum,
    Error,
}

/// The HTTP trait attached to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTrait {
    pub method: String,
    /// Raw path template; parsed by [`crate::uri::UriTemplate`].
    pub uri: String,
    /// Expected success status code.
    pub code: u16,
}

impl HttpTrait {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        HttpTrait {
            method: method.into(),
            uri: uri.into(),
            code: 200,
        }
    }
}

/// One value of an enum shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    /// The wire value.
    pub value: String,
    /// Optional display name used for the generated variant.
    pub name: Option<String>,
}

/// Whether an error shape is the caller's fault or the service's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFault {
    Client,
    Server,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KnownTrait {
    Http(HttpTrait),
    HttpLabel,
    HttpHeader(String),
    HttpPrefixHeaders(String),
    HttpQuery(String),
    HttpPayload,
    TimestampFormat(Format),
    Streaming,
    Required,
    Enum(Vec<EnumVariant>),
    Error(ErrorFault),
}

impl KnownTrait {
    pub fn kind(&self) -> TraitKind {
        match self {
            KnownTrait::Http(_) => TraitKind::Http,
            KnownTrait::HttpLabel => TraitKind::HttpLabel,
            KnownTrait::HttpHeader(_) => TraitKind::HttpHeader,
            KnownTrait::HttpPrefixHeaders(_) => TraitKind::HttpPrefixHeaders,
            KnownTrait::HttpQuery(_) => TraitKind::HttpQuery,
            KnownTrait::HttpPayload => TraitKind::HttpPayload,
            KnownTrait::TimestampFormat(_) => TraitKind::TimestampFormat,
            KnownTrait::Streaming => TraitKind::Streaming,
            KnownTrait::Required => TraitKind::Required,
            KnownTrait::Enum(_) => TraitKind::Enum,
            KnownTrait::Error(_) => TraitKind::Error,
        }
    }

    /// Short human name, used in configuration-error messages.
    pub fn describe(&self) -> &'static str {
        match self.kind() {
            TraitKind::Http => "http",
            TraitKind::HttpLabel => "httpLabel",
            TraitKind::HttpHeader => "httpHeader",
            TraitKind::HttpPrefixHeaders => "httpPrefixHeaders",
            TraitKind::HttpQuery => "httpQuery",
            TraitKind::HttpPayload => "httpPayload",
            TraitKind::TimestampFormat => "timestampFormat",
            TraitKind::Streaming => "streaming",
            TraitKind::Required => "required",
            TraitKind::Enum => "enum",
            TraitKind::Error => "error",
        }
    }
}

/// The traits attached to one shape or member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitSet {
    traits: Vec<KnownTrait>,
}

impl TraitSet {
    pub fn new() -> Self {
        TraitSet::default()
    }

    pub fn of(traits: impl IntoIterator<Item = KnownTrait>) -> Self {
        TraitSet {
            traits: traits.into_iter().collect(),
        }
    }

    /// Attach a trait. Last insertion of a kind wins.
    pub fn insert(&mut self, value: KnownTrait) {
        self.traits.retain(|t| t.kind() != value.kind());
        self.traits.push(value);
    }

    pub fn with(mut self, value: KnownTrait) -> Self {
        self.insert(value);
        self
    }

    pub fn get(&self, kind: TraitKind) -> Option<&KnownTrait> {
        self.traits.iter().find(|t| t.kind() == kind)
    }

    pub fn contains(&self, kind: TraitKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownTrait> {
        self.traits.iter()
    }

    /// The member-level timestamp format override, if any.
    pub fn timestamp_format(&self) -> Option<Format> {
        match self.get(TraitKind::TimestampFormat) {
            Some(KnownTrait::TimestampFormat(format)) => Some(*format),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{HttpTrait, KnownTrait, TraitKind, TraitSet};
    use smithy_httpbind::instant::Format;

    #[test]
    fn query_by_kind() {
        let traits = TraitSet::of([
            KnownTrait::HttpHeader("x-token".to_string()),
            KnownTrait::Required,
        ]);
        assert!(traits.contains(TraitKind::HttpHeader));
        assert!(traits.contains(TraitKind::Required));
        assert!(!traits.contains(TraitKind::HttpPayload));
        match traits.get(TraitKind::HttpHeader) {
            Some(KnownTrait::HttpHeader(name)) => assert_eq!(name, "x-token"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn last_insert_of_a_kind_wins() {
        let mut traits = TraitSet::new();
        traits.insert(KnownTrait::TimestampFormat(Format::DateTime));
        traits.insert(KnownTrait::TimestampFormat(Format::EpochSeconds));
        assert_eq!(traits.timestamp_format(), Some(Format::EpochSeconds));
        assert_eq!(traits.iter().count(), 1);
    }

    #[test]
    fn http_trait_defaults() {
        let http = HttpTrait::new("GET", "/widgets/{id}");
        assert_eq!(http.code, 200);
        assert_eq!(KnownTrait::Http(http).describe(), "http");
    }
}
