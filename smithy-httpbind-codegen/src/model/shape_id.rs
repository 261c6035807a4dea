/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// Identity of a shape in the model.
///
/// Format: `namespace#shapeName`, or `namespace#shapeName$memberName` for a
/// member. Ordering is lexicographic on the full identity, which is what
/// gives generation its stable visitation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId {
    value: String,
}

impl ShapeId {
    pub fn new(value: impl Into<String>) -> Self {
        ShapeId {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// `namespace` from `namespace#shapeName`.
    pub fn namespace(&self) -> Option<&str> {
        self.value.split_once('#').map(|(ns, _)| ns)
    }

    /// `shapeName` from `namespace#shapeName($memberName)?`.
    pub fn shape_name(&self) -> &str {
        let after_ns = self
            .value
            .split_once('#')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.value);
        after_ns
            .split_once('$')
            .map(|(name, _)| name)
            .unwrap_or(after_ns)
    }

    /// `memberName` if this identifies a member.
    pub fn member_name(&self) -> Option<&str> {
        self.value.split_once('$').map(|(_, member)| member)
    }

    /// The identity of `member` within this shape.
    pub fn member(&self, member: &str) -> ShapeId {
        ShapeId::new(format!("{}${}", self.value, member))
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        ShapeId::new(value)
    }
}

impl From<String> for ShapeId {
    fn from(value: String) -> Self {
        ShapeId::new(value)
    }
}

#[cfg(test)]
mod test {
    use super::ShapeId;

    #[test]
    fn parts() {
        let id = ShapeId::new("com.example#Widget");
        assert_eq!(id.namespace(), Some("com.example"));
        assert_eq!(id.shape_name(), "Widget");
        assert_eq!(id.member_name(), None);
    }

    #[test]
    fn member_parts() {
        let id = ShapeId::new("com.example#Widget").member("name");
        assert_eq!(id.as_str(), "com.example#Widget$name");
        assert_eq!(id.shape_name(), "Widget");
        assert_eq!(id.member_name(), Some("name"));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![
            ShapeId::new("com.example#Zeta"),
            ShapeId::new("com.example#Alpha"),
            ShapeId::new("aaa#Widget"),
        ];
        ids.sort();
        assert_eq!(
            ids.iter().map(ShapeId::as_str).collect::<Vec<_>>(),
            vec!["aaa#Widget", "com.example#Alpha", "com.example#Zeta"]
        );
    }
}
