/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Reachability analysis over the shape graph.
//!
//! Starting from every operation's input, output, and error shapes, the
//! walker computes the set of aggregate shapes that need a standalone
//! document (de)serializer. A shape is recorded in the seen-set before its
//! members are traversed, so cycles and diamonds terminate and each shape is
//! found exactly once no matter how many paths reach it.

use crate::model::{Model, Shape, ShapeId, ShapeKind};
use std::collections::BTreeSet;

/// Output of the walk, all sets ordered by shape identity.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReachableShapes {
    /// Operations, in identity order. Each gets HTTP-aware entry points.
    pub operations: Vec<ShapeId>,
    /// Structures that are an operation input/output/error. These receive
    /// the full HTTP-aware serializer or deserializer.
    pub http_shapes: BTreeSet<ShapeId>,
    /// Aggregates reachable through member edges that need a standalone
    /// document (de)serializer, without HTTP entry points. A shape may be
    /// in both sets; it then gets both units, under different unit names.
    pub document_shapes: BTreeSet<ShapeId>,
}

#[derive(Debug)]
pub struct ReachabilityWalker<'a> {
    model: &'a Model,
}

impl<'a> ReachabilityWalker<'a> {
    pub fn new(model: &'a Model) -> Self {
        ReachabilityWalker { model }
    }

    pub fn walk(&self) -> ReachableShapes {
        let mut reachable = ReachableShapes::default();
        let mut roots = BTreeSet::new();
        for operation in self.model.operations() {
            reachable.operations.push(operation.id.clone());
            for root in operation
                .input
                .iter()
                .chain(operation.output.iter())
                .chain(operation.errors.iter())
            {
                reachable.http_shapes.insert(root.clone());
                roots.insert(root.clone());
            }
        }

        let mut seen = BTreeSet::new();
        for root in &roots {
            // the root's own unit is HTTP-aware; only what hangs off its
            // members needs document units
            if seen.insert(root.clone()) {
                self.visit_members(root, &mut seen, &mut reachable.document_shapes);
            }
        }
        tracing::debug!(
            operations = reachable.operations.len(),
            http = reachable.http_shapes.len(),
            document = reachable.document_shapes.len(),
            "reachability walk complete"
        );
        reachable
    }

    fn visit_members(
        &self,
        id: &ShapeId,
        seen: &mut BTreeSet<ShapeId>,
        out: &mut BTreeSet<ShapeId>,
    ) {
        let Some(shape) = self.model.get(id) else {
            // dangling reference; surfaced later by the emitters
            return;
        };
        for member in shape.member_targets() {
            self.visit_target(&member.target, seen, out);
        }
    }

    fn visit_target(
        &self,
        target: &ShapeId,
        seen: &mut BTreeSet<ShapeId>,
        out: &mut BTreeSet<ShapeId>,
    ) {
        let Some(shape) = self.model.get(target) else {
            return;
        };
        match shape.kind() {
            ShapeKind::Structure | ShapeKind::Union => {
                out.insert(target.clone());
            }
            ShapeKind::List | ShapeKind::Map => {
                if needs_standalone_unit(self.model, target) {
                    out.insert(target.clone());
                }
            }
            _ => return,
        }
        // mark seen before recursing: this is the cycle breaker
        if seen.insert(target.clone()) {
            self.visit_members(target, seen, out);
        }
    }

}

/// Whether an aggregate needs its own generated serializer unit: it is a
/// structure or union, or a list/map whose leaf element is one (possibly
/// through further lists and maps). Lists and maps of scalars are inlined
/// by their parent.
pub fn needs_standalone_unit(model: &Model, id: &ShapeId) -> bool {
    fn inner(model: &Model, id: &ShapeId, visiting: &mut BTreeSet<ShapeId>) -> bool {
        if !visiting.insert(id.clone()) {
            return false;
        }
        match model.get(id) {
            Some(Shape::Structure(_) | Shape::Union(_)) => true,
            Some(Shape::List(list)) => inner(model, &list.member.target, visiting),
            Some(Shape::Map(map)) => inner(model, &map.value.target, visiting),
            _ => false,
        }
    }
    inner(model, id, &mut BTreeSet::new())
}

#[cfg(test)]
mod test {
    use super::ReachabilityWalker;
    use crate::model::{
        HttpTrait, KnownTrait, ListShape, MapShape, Member, Model, OperationShape, Shape, ShapeId,
        StructureShape, TraitSet, UnionShape,
    };

    fn operation(name: &str, input: Option<&str>, output: Option<&str>, errors: &[&str]) -> Shape {
        Shape::Operation(OperationShape {
            id: ShapeId::new(name),
            input: input.map(ShapeId::new),
            output: output.map(ShapeId::new),
            errors: errors.iter().map(|e| ShapeId::new(*e)).collect(),
            traits: TraitSet::of([KnownTrait::Http(HttpTrait::new("POST", "/op"))]),
        })
    }

    fn structure(name: &str, members: Vec<Member>) -> Shape {
        Shape::Structure(StructureShape {
            id: ShapeId::new(name),
            members,
            traits: TraitSet::new(),
        })
    }

    #[test]
    fn diamond_references_are_found_once() {
        let mut model = Model::with_prelude();
        model.insert(operation("test#OpA", Some("test#InputA"), None, &[]));
        model.insert(operation("test#OpB", Some("test#InputB"), None, &[]));
        model.insert(structure(
            "test#InputA",
            vec![Member::new("shared", "test#Shared")],
        ));
        model.insert(structure(
            "test#InputB",
            vec![
                Member::new("shared", "test#Shared"),
                Member::new("viaNested", "test#Nested"),
            ],
        ));
        model.insert(structure(
            "test#Nested",
            vec![Member::new("shared", "test#Shared")],
        ));
        model.insert(structure(
            "test#Shared",
            vec![Member::new("value", "smithy.api#String")],
        ));

        let reachable = ReachabilityWalker::new(&model).walk();
        let document: Vec<_> = reachable
            .document_shapes
            .iter()
            .map(|id| id.as_str())
            .collect();
        // Shared is referenced from three places but appears exactly once
        assert_eq!(document, vec!["test#Nested", "test#Shared"]);
    }

    #[test]
    fn cycles_terminate_and_generate_once() {
        let mut model = Model::with_prelude();
        model.insert(operation("test#Op", Some("test#Input"), None, &[]));
        model.insert(structure(
            "test#Input",
            vec![Member::new("node", "test#Node")],
        ));
        model.insert(structure(
            "test#Node",
            vec![
                Member::new("value", "smithy.api#String"),
                Member::new("next", "test#Node"),
                Member::new("other", "test#Other"),
            ],
        ));
        model.insert(structure(
            "test#Other",
            vec![Member::new("back", "test#Node")],
        ));

        let reachable = ReachabilityWalker::new(&model).walk();
        let document: Vec<_> = reachable
            .document_shapes
            .iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(document, vec!["test#Node", "test#Other"]);
    }

    #[test]
    fn lists_of_scalars_get_no_standalone_unit() {
        let mut model = Model::with_prelude();
        model.insert(operation("test#Op", Some("test#Input"), None, &[]));
        model.insert(Shape::List(ListShape {
            id: ShapeId::new("test#Tags"),
            member: Member::new("member", "smithy.api#String"),
            traits: TraitSet::new(),
        }));
        model.insert(structure(
            "test#Input",
            vec![Member::new("tags", "test#Tags")],
        ));

        let reachable = ReachabilityWalker::new(&model).walk();
        assert!(reachable.document_shapes.is_empty());
    }

    #[test]
    fn lists_and_maps_of_structures_get_units() {
        let mut model = Model::with_prelude();
        model.insert(operation("test#Op", Some("test#Input"), None, &[]));
        model.insert(Shape::List(ListShape {
            id: ShapeId::new("test#WidgetList"),
            member: Member::new("member", "test#Widget"),
            traits: TraitSet::new(),
        }));
        model.insert(Shape::Map(MapShape {
            id: ShapeId::new("test#WidgetMap"),
            key: Member::new("key", "smithy.api#String"),
            value: Member::new("value", "test#WidgetList"),
            traits: TraitSet::new(),
        }));
        model.insert(structure(
            "test#Widget",
            vec![Member::new("name", "smithy.api#String")],
        ));
        model.insert(structure(
            "test#Input",
            vec![Member::new("byName", "test#WidgetMap")],
        ));

        let reachable = ReachabilityWalker::new(&model).walk();
        let document: Vec<_> = reachable
            .document_shapes
            .iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(
            document,
            vec!["test#Widget", "test#WidgetList", "test#WidgetMap"]
        );
    }

    #[test]
    fn top_level_shape_nested_elsewhere_appears_in_both_sets() {
        let mut model = Model::with_prelude();
        model.insert(operation("test#Op", Some("test#Input"), Some("test#Echo"), &[]));
        model.insert(structure(
            "test#Input",
            vec![Member::new("echo", "test#Echo")],
        ));
        model.insert(structure(
            "test#Echo",
            vec![Member::new("value", "smithy.api#String")],
        ));

        let reachable = ReachabilityWalker::new(&model).walk();
        assert!(reachable.http_shapes.contains(&ShapeId::new("test#Echo")));
        assert!(reachable
            .document_shapes
            .contains(&ShapeId::new("test#Echo")));
        // Input is top-level only
        assert!(!reachable
            .document_shapes
            .contains(&ShapeId::new("test#Input")));
    }

    #[test]
    fn unions_are_reachable_aggregates() {
        let mut model = Model::with_prelude();
        model.insert(operation("test#Op", Some("test#Input"), None, &["test#Oops"]));
        model.insert(Shape::Union(UnionShape {
            id: ShapeId::new("test#Choice"),
            members: vec![
                Member::new("a", "smithy.api#String"),
                Member::new("b", "smithy.api#Integer"),
            ],
            traits: TraitSet::new(),
        }));
        model.insert(structure(
            "test#Input",
            vec![Member::new("choice", "test#Choice")],
        ));
        model.insert(structure(
            "test#Oops",
            vec![Member::new("message", "smithy.api#String")],
        ));

        let reachable = ReachabilityWalker::new(&model).walk();
        assert!(reachable
            .document_shapes
            .contains(&ShapeId::new("test#Choice")));
        assert!(reachable.http_shapes.contains(&ShapeId::new("test#Oops")));
    }
}
