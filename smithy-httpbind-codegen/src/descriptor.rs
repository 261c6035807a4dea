/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Field and object descriptors for structured-body (de)serialization.
//!
//! A structure's document-bound members become an ordered descriptor set
//! with stable integer indices assigned in declaration order. Descriptors
//! are memoized per shape for the run; the serializer and deserializer of a
//! shape fetch the same cache entry, which is what guarantees their indices
//! agree.

use crate::error::Error;
use crate::model::{Member, Model, ShapeId, ShapeKind};
use smithy_httpbind::schema::SerKind;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Which member subset a descriptor covers.
///
/// A shape used as an operation input/output serializes only its
/// document-bound members into the body; the same shape referenced from
/// another shape serializes its entire member set. The two descriptor sets
/// are cached under different keys and never conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DescriptorScope {
    /// Every member, for shapes nested inside a document.
    Nested,
    /// Only the document-bound members of an HTTP-bound structure.
    HttpBody,
}

/// (wire name, serialization kind, stable index) for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub wire_name: String,
    pub kind: SerKind,
    pub index: usize,
}

/// The ordered descriptor set for one structure or union.
#[derive(Debug, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub shape: ShapeId,
    pub scope: DescriptorScope,
    pub fields: Vec<FieldDescriptor>,
}

/// Per-run descriptor memoization, keyed by shape identity and scope.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    cache: RefCell<BTreeMap<(ShapeId, DescriptorScope), Rc<ObjectDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        DescriptorCache::default()
    }

    /// Descriptor for `shape_id` over `members`, built once and reused on
    /// every later request for the same (shape, scope) pair.
    pub fn object_descriptor<'m>(
        &self,
        model: &Model,
        shape_id: &ShapeId,
        scope: DescriptorScope,
        members: impl Iterator<Item = &'m Member>,
    ) -> Result<Rc<ObjectDescriptor>, Error> {
        if let Some(cached) = self.cache.borrow().get(&(shape_id.clone(), scope)) {
            return Ok(Rc::clone(cached));
        }
        let mut fields = Vec::new();
        for (index, member) in members.enumerate() {
            fields.push(FieldDescriptor {
                wire_name: member.name.clone(),
                kind: ser_kind(model, shape_id, member)?,
                index,
            });
        }
        let descriptor = Rc::new(ObjectDescriptor {
            shape: shape_id.clone(),
            scope,
            fields,
        });
        self.cache
            .borrow_mut()
            .insert((shape_id.clone(), scope), Rc::clone(&descriptor));
        Ok(descriptor)
    }
}

/// Map a member's target shape kind to its serialization kind.
pub fn ser_kind(model: &Model, shape_id: &ShapeId, member: &Member) -> Result<SerKind, Error> {
    let kind = match model.kind_of(&member.target)? {
        ShapeKind::Boolean => SerKind::Boolean,
        ShapeKind::Byte => SerKind::Byte,
        ShapeKind::Short => SerKind::Short,
        ShapeKind::Integer => SerKind::Integer,
        ShapeKind::Long => SerKind::Long,
        ShapeKind::Float => SerKind::Float,
        ShapeKind::Double => SerKind::Double,
        ShapeKind::String | ShapeKind::Enum => SerKind::String,
        ShapeKind::Blob => SerKind::Blob,
        ShapeKind::Timestamp => SerKind::Timestamp,
        ShapeKind::Document => SerKind::Document,
        ShapeKind::List => SerKind::List,
        ShapeKind::Map => SerKind::Map,
        ShapeKind::Structure => SerKind::Struct,
        ShapeKind::Union => SerKind::Union,
        ShapeKind::Operation => {
            return Err(Error::InvalidMemberTarget {
                shape: shape_id.clone(),
                member: member.name.clone(),
                target: member.target.clone(),
            })
        }
    };
    Ok(kind)
}

#[cfg(test)]
mod test {
    use super::{DescriptorCache, DescriptorScope};
    use crate::model::{Member, Model, Shape, ShapeId, StructureShape, TraitSet};
    use smithy_httpbind::schema::SerKind;
    use std::rc::Rc;

    fn fixture() -> (Model, StructureShape) {
        let mut model = Model::with_prelude();
        let nested = StructureShape {
            id: ShapeId::new("test#Nested"),
            members: vec![Member::new("inner", "smithy.api#String")],
            traits: TraitSet::new(),
        };
        model.insert(Shape::Structure(nested));
        let shape = StructureShape {
            id: ShapeId::new("test#PayloadConfig"),
            members: vec![
                Member::new("payload1", "smithy.api#String"),
                Member::new("payload2", "smithy.api#Integer"),
                Member::new("payload3", "test#Nested"),
            ],
            traits: TraitSet::new(),
        };
        model.insert(Shape::Structure(shape.clone()));
        (model, shape)
    }

    #[test]
    fn indices_follow_declaration_order() {
        let (model, shape) = fixture();
        let cache = DescriptorCache::new();
        let descriptor = cache
            .object_descriptor(
                &model,
                &shape.id,
                DescriptorScope::Nested,
                shape.members.iter(),
            )
            .unwrap();
        let summary: Vec<_> = descriptor
            .fields
            .iter()
            .map(|f| (f.wire_name.as_str(), f.kind, f.index))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("payload1", SerKind::String, 0),
                ("payload2", SerKind::Integer, 1),
                ("payload3", SerKind::Struct, 2),
            ]
        );
    }

    #[test]
    fn repeated_lookups_share_one_descriptor() {
        let (model, shape) = fixture();
        let cache = DescriptorCache::new();
        let first = cache
            .object_descriptor(
                &model,
                &shape.id,
                DescriptorScope::Nested,
                shape.members.iter(),
            )
            .unwrap();
        let second = cache
            .object_descriptor(
                &model,
                &shape.id,
                DescriptorScope::Nested,
                shape.members.iter(),
            )
            .unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn scopes_are_cached_separately() {
        let (model, shape) = fixture();
        let cache = DescriptorCache::new();
        let nested = cache
            .object_descriptor(
                &model,
                &shape.id,
                DescriptorScope::Nested,
                shape.members.iter(),
            )
            .unwrap();
        // http-body scope with a filtered subset
        let body = cache
            .object_descriptor(
                &model,
                &shape.id,
                DescriptorScope::HttpBody,
                shape.members.iter().take(1),
            )
            .unwrap();
        assert_eq!(nested.fields.len(), 3);
        assert_eq!(body.fields.len(), 1);
    }
}
