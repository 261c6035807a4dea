/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Parsed HTTP path templates.
//!
//! A template is a `/`-separated path whose segments are literals or
//! `{label}` placeholders (`{label+}` for greedy, multi-segment labels),
//! optionally followed by `?` and literal query-string pairs that are
//! emitted on every request.

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Literal(String),
    Label { name: String, greedy: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    segments: Vec<PathSegment>,
    query_literals: Vec<(String, Option<String>)>,
}

impl UriTemplate {
    pub fn parse(uri: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidUriTemplate {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };
        if !path.starts_with('/') {
            return Err(invalid("path must start with `/`"));
        }

        let mut segments = Vec::new();
        let mut greedy_seen = false;
        for segment in path[1..].split('/') {
            if segment.is_empty() {
                // trailing slash or root path
                continue;
            }
            if let Some(inner) = segment.strip_prefix('{') {
                let inner = inner
                    .strip_suffix('}')
                    .ok_or_else(|| invalid("unterminated placeholder"))?;
                let (name, greedy) = match inner.strip_suffix('+') {
                    Some(name) => (name, true),
                    None => (inner, false),
                };
                if name.is_empty() {
                    return Err(invalid("empty placeholder name"));
                }
                if greedy {
                    if greedy_seen {
                        return Err(invalid("at most one greedy placeholder is allowed"));
                    }
                    greedy_seen = true;
                } else if greedy_seen {
                    return Err(invalid("greedy placeholder must be the final placeholder"));
                }
                if segments.iter().any(|s| matches!(s, PathSegment::Label { name: n, .. } if n == name)) {
                    return Err(invalid("duplicate placeholder name"));
                }
                segments.push(PathSegment::Label {
                    name: name.to_string(),
                    greedy,
                });
            } else if segment.contains('{') || segment.contains('}') {
                return Err(invalid("placeholder must occupy an entire segment"));
            } else {
                segments.push(PathSegment::Literal(segment.to_string()));
            }
        }

        let mut query_literals = Vec::new();
        if let Some(query) = query {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((key, value)) => {
                        query_literals.push((key.to_string(), Some(value.to_string())))
                    }
                    None => query_literals.push((pair.to_string(), None)),
                }
            }
        }

        Ok(UriTemplate {
            raw: uri.to_string(),
            segments,
            query_literals,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Literal query pairs appended to every request. `None` is a bare key
    /// (`?flag`); `Some("")` is an explicitly empty value (`?empty=`).
    pub fn query_literals(&self) -> &[(String, Option<String>)] {
        &self.query_literals
    }

    /// Whether the template has a placeholder named `name`; returns its
    /// greediness.
    pub fn label(&self, name: &str) -> Option<bool> {
        self.segments.iter().find_map(|segment| match segment {
            PathSegment::Label { name: n, greedy } if n == name => Some(*greedy),
            _ => None,
        })
    }

    /// Placeholder names in path order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, bool)> {
        self.segments.iter().filter_map(|segment| match segment {
            PathSegment::Label { name, greedy } => Some((name.as_str(), *greedy)),
            _ => None,
        })
    }
}
