/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-run generation state: settings, symbol resolution, descriptor cache,
//! and the collected output.

use crate::descriptor::DescriptorCache;
use crate::error::Error;
use crate::model::{Member, Model, ShapeId};
use smithy_httpbind::instant::Format;
use std::collections::BTreeMap;

/// Protocol-level settings for a generation run. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CodegenSettings {
    /// Blanket timestamp format declared by the protocol. Overrides the
    /// location defaults but never a member-level trait.
    pub default_timestamp_format: Option<Format>,
}

/// Maps shapes to the names emitted code uses for them.
///
/// Real symbol/namespace allocation lives outside this crate; this trait is
/// the seam it plugs into.
pub trait SymbolProvider {
    /// The Rust type name for a shape (e.g. `GetWidgetInput`).
    fn type_name(&self, id: &ShapeId) -> String;

    /// The Rust field/variable name for a member (e.g. `date_time`).
    fn member_name(&self, member: &Member) -> String;

    /// The snake_case stem used in function and unit names.
    fn fn_stem(&self, id: &ShapeId) -> String {
        to_snake_case(id.shape_name())
    }

    /// The SCREAMING_SNAKE stem used for descriptor constants.
    fn const_stem(&self, id: &ShapeId) -> String {
        to_snake_case(id.shape_name()).to_uppercase()
    }
}

/// Naive provider used in tests and simple callers: type names are the
/// shape name verbatim, member names are snake_cased.
#[derive(Debug, Default)]
pub struct DefaultSymbolProvider;

impl SymbolProvider for DefaultSymbolProvider {
    fn type_name(&self, id: &ShapeId) -> String {
        id.shape_name().to_string()
    }

    fn member_name(&self, member: &Member) -> String {
        to_snake_case(&member.name)
    }
}

pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c == '-' || c == ' ' {
            out.push('_');
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// One self-contained generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Module-style unit name, unique within the run.
    pub name: String,
    /// The shape this unit was generated for.
    pub shape: ShapeId,
    pub content: String,
}

/// Collected source units, keyed and ordered by unit name.
///
/// Duplicate names are rejected, which is what turns "generated twice" bugs
/// into loud failures instead of silently clobbered files.
#[derive(Debug, Default)]
pub struct SourceFileSet {
    units: BTreeMap<String, SourceUnit>,
}

impl SourceFileSet {
    pub fn new() -> Self {
        SourceFileSet::default()
    }

    pub fn insert(&mut self, unit: SourceUnit) -> Result<(), Error> {
        if self.units.contains_key(&unit.name) {
            return Err(Error::DuplicateUnit {
                name: unit.name,
                shape: unit.shape,
            });
        }
        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SourceUnit> {
        self.units.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// A configuration error raised while generating one shape. The run carries
/// on with unrelated shapes so every failure surfaces in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub shape: ShapeId,
    pub error: Error,
}

/// Everything a generation run produced.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub files: SourceFileSet,
    pub failures: Vec<Failure>,
}

/// Immutable bundle threaded through every component of a run.
pub struct GenerationContext<'a> {
    pub model: &'a Model,
    pub symbols: &'a dyn SymbolProvider,
    pub settings: CodegenSettings,
    pub descriptors: DescriptorCache,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        model: &'a Model,
        symbols: &'a dyn SymbolProvider,
        settings: CodegenSettings,
    ) -> Self {
        GenerationContext {
            model,
            symbols,
            settings,
            descriptors: DescriptorCache::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{
        to_snake_case, DefaultSymbolProvider, SourceFileSet, SourceUnit, SymbolProvider,
    };
    use crate::error::Error;
    use crate::model::ShapeId;

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("GetWidget"), "get_widget");
        assert_eq!(to_snake_case("tsLabel"), "ts_label");
        assert_eq!(to_snake_case("HTTPThing"), "httpthing");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn default_symbols() {
        let symbols = DefaultSymbolProvider;
        let id = ShapeId::new("com.example#GetWidgetInput");
        assert_eq!(symbols.type_name(&id), "GetWidgetInput");
        assert_eq!(symbols.fn_stem(&id), "get_widget_input");
        assert_eq!(symbols.const_stem(&id), "GET_WIDGET_INPUT");
    }

    #[test]
    fn duplicate_unit_names_are_rejected() {
        let mut files = SourceFileSet::new();
        let unit = SourceUnit {
            name: "serde_widget".to_string(),
            shape: ShapeId::new("test#Widget"),
            content: String::new(),
        };
        files.insert(unit.clone()).unwrap();
        assert!(matches!(
            files.insert(unit),
            Err(Error::DuplicateUnit { .. })
        ));
    }

    #[test]
    fn units_iterate_in_name_order() {
        let mut files = SourceFileSet::new();
        for name in ["serde_b", "deser_a", "ser_c"] {
            files
                .insert(SourceUnit {
                    name: name.to_string(),
                    shape: ShapeId::new("test#X"),
                    content: String::new(),
                })
                .unwrap();
        }
        let names: Vec<_> = files.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["deser_a", "ser_c", "serde_b"]);
    }
}
