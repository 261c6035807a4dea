/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Classification of structure members into wire locations.
//!
//! Every direct member of an operation's input, output, or error structure
//! lands in exactly one [`BindingLocation`]. Members carrying two binding
//! traits are a configuration error, never silently resolved by precedence.

use crate::error::Error;
use crate::model::{
    KnownTrait, Member, Model, ShapeKind, StructureShape, TraitKind,
};
use crate::uri::UriTemplate;

/// Which side of the wire a structure is being bound for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

/// The wire location of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingLocation {
    /// Substituted into a path placeholder of the same name.
    Label { greedy: bool },
    /// A query-string parameter.
    Query(String),
    /// A single named header.
    Header(String),
    /// A map expanded into one header per entry under a name prefix.
    PrefixHeaders(String),
    /// The entire request/response body.
    Payload,
    /// A field of the structured document body.
    Document,
}

impl BindingLocation {
    pub fn describe(&self) -> &'static str {
        match self {
            BindingLocation::Label { .. } => "a path label",
            BindingLocation::Query(_) => "a query parameter",
            BindingLocation::Header(_) => "a header",
            BindingLocation::PrefixHeaders(_) => "prefix headers",
            BindingLocation::Payload => "the payload",
            BindingLocation::Document => "the document body",
        }
    }
}

/// One member together with its resolved location.
#[derive(Debug)]
pub struct HttpBinding<'a> {
    pub member: &'a Member,
    pub location: BindingLocation,
}

/// Binding classification for every direct member of one structure.
#[derive(Debug)]
pub struct HttpBindingIndex<'a> {
    bindings: Vec<HttpBinding<'a>>,
}

impl<'a> HttpBindingIndex<'a> {
    /// Classify `shape`'s members against the operation's path template.
    ///
    /// Validates the invariants here rather than during emission: one
    /// binding trait per member, at most one payload member, payload and
    /// document members never mixed, every placeholder matched by exactly
    /// one label member, and target kinds usable in their location.
    pub fn resolve(
        model: &Model,
        shape: &'a StructureShape,
        uri: &UriTemplate,
        direction: Direction,
    ) -> Result<Self, Error> {
        let mut bindings = Vec::with_capacity(shape.members.len());
        for member in &shape.members {
            let location = resolve_member(model, shape, member, uri, direction)?;
            bindings.push(HttpBinding { member, location });
        }

        let mut payload: Option<&Member> = None;
        for binding in &bindings {
            if binding.location == BindingLocation::Payload {
                if let Some(first) = payload {
                    return Err(Error::MultiplePayloads {
                        shape: shape.id.clone(),
                        first: first.name.clone(),
                        second: binding.member.name.clone(),
                    });
                }
                payload = Some(binding.member);
            }
        }
        if let Some(payload) = payload {
            if let Some(document) = bindings
                .iter()
                .find(|b| b.location == BindingLocation::Document)
            {
                return Err(Error::PayloadWithDocumentMembers {
                    shape: shape.id.clone(),
                    payload: payload.name.clone(),
                    document: document.member.name.clone(),
                });
            }
        }

        if direction == Direction::Request {
            for (label, _) in uri.labels() {
                let bound = bindings.iter().any(|b| {
                    matches!(b.location, BindingLocation::Label { .. }) && b.member.name == label
                });
                if !bound {
                    return Err(Error::PlaceholderWithoutLabel {
                        shape: shape.id.clone(),
                        label: label.to_string(),
                        uri: uri.raw().to_string(),
                    });
                }
            }
        }

        tracing::trace!(shape = %shape.id, bindings = bindings.len(), "resolved HTTP bindings");
        Ok(HttpBindingIndex { bindings })
    }

    pub fn bindings(&self) -> &[HttpBinding<'a>] {
        &self.bindings
    }

    /// Members serialized into the structured document body, in declaration
    /// order. Disjoint from every other location by construction.
    pub fn document_members(&self) -> impl Iterator<Item = &'a Member> + '_ {
        self.bindings.iter().filter_map(|b| match b.location {
            BindingLocation::Document => Some(b.member),
            _ => None,
        })
    }

    /// The explicit payload binding, if the structure has one.
    pub fn payload(&self) -> Option<&HttpBinding<'a>> {
        self.bindings
            .iter()
            .find(|b| b.location == BindingLocation::Payload)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&'a Member, &str)> + '_ {
        self.bindings.iter().filter_map(|b| match &b.location {
            BindingLocation::Header(name) => Some((b.member, name.as_str())),
            _ => None,
        })
    }

    pub fn prefix_headers(&self) -> impl Iterator<Item = (&'a Member, &str)> + '_ {
        self.bindings.iter().filter_map(|b| match &b.location {
            BindingLocation::PrefixHeaders(prefix) => Some((b.member, prefix.as_str())),
            _ => None,
        })
    }

    pub fn queries(&self) -> impl Iterator<Item = (&'a Member, &str)> + '_ {
        self.bindings.iter().filter_map(|b| match &b.location {
            BindingLocation::Query(name) => Some((b.member, name.as_str())),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = (&'a Member, bool)> + '_ {
        self.bindings.iter().filter_map(|b| match b.location {
            BindingLocation::Label { greedy } => Some((b.member, greedy)),
            _ => None,
        })
    }

    /// True when no member is bound anywhere but the document body, i.e.
    /// the entire member set serializes into the body.
    pub fn is_document_only(&self) -> bool {
        self.bindings
            .iter()
            .all(|b| b.location == BindingLocation::Document)
    }
}

const BINDING_TRAITS: [TraitKind; 5] = [
    TraitKind::HttpPayload,
    TraitKind::HttpHeader,
    TraitKind::HttpPrefixHeaders,
    TraitKind::HttpQuery,
    TraitKind::HttpLabel,
];

fn resolve_member(
    model: &Model,
    shape: &StructureShape,
    member: &Member,
    uri: &UriTemplate,
    direction: Direction,
) -> Result<BindingLocation, Error> {
    let mut present = member
        .traits
        .iter()
        .filter(|t| BINDING_TRAITS.contains(&t.kind()));
    let first = present.next();
    if let (Some(first), Some(second)) = (first, present.next()) {
        return Err(Error::ConflictingBindings {
            shape: shape.id.clone(),
            member: member.name.clone(),
            first: first.describe(),
            second: second.describe(),
        });
    }

    let location = match first {
        None => return Ok(BindingLocation::Document),
        Some(KnownTrait::HttpPayload) => BindingLocation::Payload,
        Some(KnownTrait::HttpHeader(name)) => BindingLocation::Header(name.clone()),
        Some(KnownTrait::HttpPrefixHeaders(prefix)) => {
            BindingLocation::PrefixHeaders(prefix.clone())
        }
        Some(KnownTrait::HttpQuery(name)) => BindingLocation::Query(name.clone()),
        Some(KnownTrait::HttpLabel) => match direction {
            Direction::Response => {
                return Err(Error::UnsupportedBinding {
                    shape: shape.id.clone(),
                    member: member.name.clone(),
                    location: "a path label in a response",
                    target: member.target.clone(),
                })
            }
            Direction::Request => match uri.label(&member.name) {
                Some(greedy) => BindingLocation::Label { greedy },
                None => {
                    return Err(Error::LabelWithoutPlaceholder {
                        shape: shape.id.clone(),
                        member: member.name.clone(),
                        uri: uri.raw().to_string(),
                    })
                }
            },
        },
        Some(_) => unreachable!("filtered to binding traits above"),
    };
    check_target(model, shape, member, &location)?;
    if direction == Direction::Response {
        if let BindingLocation::Query(_) = location {
            return Err(Error::UnsupportedBinding {
                shape: shape.id.clone(),
                member: member.name.clone(),
                location: "a query parameter in a response",
                target: member.target.clone(),
            });
        }
    }
    Ok(location)
}

/// Reject trait/kind pairings the generator cannot bind.
fn check_target(
    model: &Model,
    shape: &StructureShape,
    member: &Member,
    location: &BindingLocation,
) -> Result<(), Error> {
    let unsupported = |location: &'static str| Error::UnsupportedBinding {
        shape: shape.id.clone(),
        member: member.name.clone(),
        location,
        target: member.target.clone(),
    };
    let target_kind = model.kind_of(&member.target)?;
    match location {
        BindingLocation::Label { .. } => {
            if !target_kind.is_scalar() {
                return Err(unsupported("a path label"));
            }
        }
        BindingLocation::Query(_) => {
            if !target_kind.is_scalar() && !is_list_of_scalars(model, member)? {
                return Err(unsupported("a query parameter"));
            }
        }
        BindingLocation::Header(_) => {
            if !target_kind.is_scalar() && !is_list_of_scalars(model, member)? {
                return Err(unsupported("a header"));
            }
        }
        BindingLocation::PrefixHeaders(_) => {
            let valid = match model.expect(&member.target)? {
                crate::model::Shape::Map(map) => {
                    model.kind_of(&map.value.target)?.is_scalar()
                }
                _ => false,
            };
            if !valid {
                return Err(unsupported("prefix headers"));
            }
        }
        BindingLocation::Payload => {
            if !matches!(
                target_kind,
                ShapeKind::String
                    | ShapeKind::Enum
                    | ShapeKind::Blob
                    | ShapeKind::Structure
                    | ShapeKind::Union
            ) {
                return Err(unsupported("the payload"));
            }
        }
        BindingLocation::Document => {}
    }
    Ok(())
}

fn is_list_of_scalars(model: &Model, member: &Member) -> Result<bool, Error> {
    match model.expect(&member.target)? {
        crate::model::Shape::List(list) => Ok(model.kind_of(&list.member.target)?.is_scalar()),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod test {
    use super::{BindingLocation, Direction, HttpBindingIndex};
    use crate::error::Error;
    use crate::model::{
        KnownTrait, Member, Model, Shape, ShapeId, StructureShape, TraitSet,
    };
    use crate::uri::UriTemplate;

    fn model_with(structure: StructureShape) -> Model {
        let mut model = Model::with_prelude();
        model.insert(Shape::Structure(structure));
        model
    }

    fn structure(members: Vec<Member>) -> StructureShape {
        StructureShape {
            id: ShapeId::new("test#Input"),
            members,
            traits: TraitSet::new(),
        }
    }

    fn resolve<'a>(
        model: &Model,
        shape: &'a StructureShape,
        uri: &str,
    ) -> Result<HttpBindingIndex<'a>, Error> {
        HttpBindingIndex::resolve(
            model,
            shape,
            &UriTemplate::parse(uri).unwrap(),
            Direction::Request,
        )
    }

    #[test]
    fn members_without_traits_are_document_bound() {
        let shape = structure(vec![
            Member::new("payload1", "smithy.api#String"),
            Member::new("payload2", "smithy.api#Integer"),
        ]);
        let model = model_with(shape.clone());
        let index = resolve(&model, &shape, "/things").unwrap();
        assert!(index.is_document_only());
        assert_eq!(index.document_members().count(), 2);
    }

    #[test]
    fn trait_precedence_classifies_each_location() {
        let shape = structure(vec![
            Member::new("id", "smithy.api#String")
                .with_traits(TraitSet::of([KnownTrait::HttpLabel])),
            Member::new("kind", "smithy.api#String")
                .with_traits(TraitSet::of([KnownTrait::HttpQuery("kind".to_string())])),
            Member::new("token", "smithy.api#String")
                .with_traits(TraitSet::of([KnownTrait::HttpHeader("x-token".to_string())])),
            Member::new("note", "smithy.api#String"),
        ]);
        let model = model_with(shape.clone());
        let index = resolve(&model, &shape, "/things/{id}").unwrap();
        assert_eq!(index.labels().count(), 1);
        assert_eq!(index.queries().count(), 1);
        assert_eq!(index.headers().count(), 1);
        let document: Vec<_> = index.document_members().map(|m| m.name.as_str()).collect();
        assert_eq!(document, vec!["note"]);
    }

    #[test]
    fn bound_members_never_reach_the_document_set() {
        let shape = structure(vec![
            Member::new("id", "smithy.api#String")
                .with_traits(TraitSet::of([KnownTrait::HttpLabel])),
            Member::new("token", "smithy.api#String")
                .with_traits(TraitSet::of([KnownTrait::HttpHeader("x-token".to_string())])),
        ]);
        let model = model_with(shape.clone());
        let index = resolve(&model, &shape, "/things/{id}").unwrap();
        assert_eq!(index.document_members().count(), 0);
    }

    #[test]
    fn conflicting_traits_are_a_hard_error() {
        let shape = structure(vec![Member::new("data", "smithy.api#String").with_traits(
            TraitSet::of([
                KnownTrait::HttpHeader("x-data".to_string()),
                KnownTrait::HttpPayload,
            ]),
        )]);
        let model = model_with(shape.clone());
        match resolve(&model, &shape, "/things") {
            Err(Error::ConflictingBindings { member, .. }) => assert_eq!(member, "data"),
            other => panic!("expected ConflictingBindings, got {:?}", other),
        }
    }

    #[test]
    fn two_payload_members_are_rejected() {
        let shape = structure(vec![
            Member::new("a", "smithy.api#Blob").with_traits(TraitSet::of([KnownTrait::HttpPayload])),
            Member::new("b", "smithy.api#Blob").with_traits(TraitSet::of([KnownTrait::HttpPayload])),
        ]);
        let model = model_with(shape.clone());
        assert!(matches!(
            resolve(&model, &shape, "/things"),
            Err(Error::MultiplePayloads { .. })
        ));
    }

    #[test]
    fn payload_mixed_with_document_members_is_rejected() {
        let shape = structure(vec![
            Member::new("data", "smithy.api#Blob")
                .with_traits(TraitSet::of([KnownTrait::HttpPayload])),
            Member::new("note", "smithy.api#String"),
        ]);
        let model = model_with(shape.clone());
        assert!(matches!(
            resolve(&model, &shape, "/things"),
            Err(Error::PayloadWithDocumentMembers { .. })
        ));
    }

    #[test]
    fn payload_with_header_members_is_allowed() {
        let shape = structure(vec![
            Member::new("data", "smithy.api#Blob")
                .with_traits(TraitSet::of([KnownTrait::HttpPayload])),
            Member::new("token", "smithy.api#String")
                .with_traits(TraitSet::of([KnownTrait::HttpHeader("x-token".to_string())])),
        ]);
        let model = model_with(shape.clone());
        let index = resolve(&model, &shape, "/things").unwrap();
        assert!(index.payload().is_some());
        assert_eq!(index.headers().count(), 1);
    }

    #[test]
    fn label_without_placeholder_is_rejected() {
        let shape = structure(vec![Member::new("id", "smithy.api#String")
            .with_traits(TraitSet::of([KnownTrait::HttpLabel]))]);
        let model = model_with(shape.clone());
        assert!(matches!(
            resolve(&model, &shape, "/things"),
            Err(Error::LabelWithoutPlaceholder { .. })
        ));
    }

    #[test]
    fn placeholder_without_label_is_rejected() {
        let shape = structure(vec![Member::new("note", "smithy.api#String")]);
        let model = model_with(shape.clone());
        assert!(matches!(
            resolve(&model, &shape, "/things/{id}"),
            Err(Error::PlaceholderWithoutLabel { .. })
        ));
    }

    #[test]
    fn structure_bound_to_header_is_unsupported() {
        let nested = StructureShape {
            id: ShapeId::new("test#Nested"),
            members: vec![],
            traits: TraitSet::new(),
        };
        let shape = structure(vec![Member::new("nested", "test#Nested")
            .with_traits(TraitSet::of([KnownTrait::HttpHeader("x-nested".to_string())]))]);
        let mut model = model_with(shape.clone());
        model.insert(Shape::Structure(nested));
        assert!(matches!(
            resolve(&model, &shape, "/things"),
            Err(Error::UnsupportedBinding { .. })
        ));
    }

    #[test]
    fn greedy_label_is_reported() {
        let shape = structure(vec![Member::new("key", "smithy.api#String")
            .with_traits(TraitSet::of([KnownTrait::HttpLabel]))]);
        let model = model_with(shape.clone());
        let index = resolve(&model, &shape, "/objects/{key+}").unwrap();
        let (_, greedy) = index.labels().next().unwrap();
        assert!(greedy);
    }

    #[test]
    fn labels_are_rejected_in_responses() {
        let shape = structure(vec![Member::new("id", "smithy.api#String")
            .with_traits(TraitSet::of([KnownTrait::HttpLabel]))]);
        let model = model_with(shape.clone());
        let result = HttpBindingIndex::resolve(
            &model,
            &shape,
            &UriTemplate::parse("/things/{id}").unwrap(),
            Direction::Response,
        );
        assert!(matches!(result, Err(Error::UnsupportedBinding { .. })));
    }
}
