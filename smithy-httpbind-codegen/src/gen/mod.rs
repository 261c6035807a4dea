/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Source emission.
//!
//! One source unit per generated (de)serializer: `ser_<operation>` and
//! `deser_<operation>` for HTTP-aware entry points, `deser_error_<shape>`
//! for error shapes, and `serde_<shape>` for aggregates reachable inside
//! document bodies. Units reference each other through `crate::<unit>::`
//! paths and are otherwise self-contained.

mod deserialize;
mod serde_unit;
mod serialize;
mod writer;

pub(crate) use writer::CodeWriter;

use crate::context::{Failure, GenerationContext, GenerationReport, SourceUnit};
use crate::descriptor::ObjectDescriptor;
use crate::error::Error;
use crate::model::{Model, Shape, ShapeId, ShapeKind};
use crate::walk::ReachabilityWalker;
use smithy_httpbind::instant::Format;
use smithy_httpbind::schema::SerKind;
use std::collections::BTreeSet;

/// Run the full generation pass: walk, classify, and emit.
///
/// A configuration error is fatal only for the shape that raised it; the
/// report carries every failure alongside the units that did generate.
pub fn generate(ctx: &GenerationContext<'_>) -> GenerationReport {
    let reachable = ReachabilityWalker::new(ctx.model).walk();
    let mut report = GenerationReport::default();

    let record = |report: &mut GenerationReport, shape: &ShapeId, result: Result<SourceUnit, Error>| {
        let outcome = result.and_then(|unit| report.files.insert(unit));
        if let Err(error) = outcome {
            tracing::debug!(shape = %shape, %error, "skipping shape after configuration error");
            report.failures.push(Failure {
                shape: shape.clone(),
                error,
            });
        }
    };

    let mut error_shapes = BTreeSet::new();
    for op_id in &reachable.operations {
        let operation = match ctx.model.expect(op_id) {
            Ok(Shape::Operation(op)) => op,
            Ok(_) | Err(_) => continue,
        };
        record(
            &mut report,
            op_id,
            serialize::request_serializer_unit(ctx, operation),
        );
        if operation.output.is_some() {
            record(
                &mut report,
                op_id,
                deserialize::response_deserializer_unit(ctx, operation),
            );
        }
        error_shapes.extend(operation.errors.iter().cloned());
    }

    for shape_id in &error_shapes {
        record(
            &mut report,
            shape_id,
            deserialize::error_deserializer_unit(ctx, shape_id),
        );
    }

    for shape_id in &reachable.document_shapes {
        record(
            &mut report,
            shape_id,
            serde_unit::document_unit(ctx, shape_id),
        );
    }

    tracing::debug!(
        units = report.files.len(),
        failures = report.failures.len(),
        "generation pass complete"
    );
    report
}

/// Standard file header for every emitted unit.
pub(crate) fn unit_header(w: &mut CodeWriter, title: &str) {
    w.line("// Code generated by smithy-httpbind-codegen. DO NOT EDIT.");
    w.blank();
    w.line(format!("//! {}", title));
    w.blank();
}

/// The `SerKind::…` token for a descriptor constant.
pub(crate) fn ser_kind_token(kind: SerKind) -> &'static str {
    match kind {
        SerKind::Boolean => "SerKind::Boolean",
        SerKind::Byte => "SerKind::Byte",
        SerKind::Short => "SerKind::Short",
        SerKind::Integer => "SerKind::Integer",
        SerKind::Long => "SerKind::Long",
        SerKind::Float => "SerKind::Float",
        SerKind::Double => "SerKind::Double",
        SerKind::String => "SerKind::String",
        SerKind::Blob => "SerKind::Blob",
        SerKind::Timestamp => "SerKind::Timestamp",
        SerKind::Document => "SerKind::Document",
        SerKind::Struct => "SerKind::Struct",
        SerKind::Union => "SerKind::Union",
        SerKind::List => "SerKind::List",
        SerKind::Map => "SerKind::Map",
        _ => "SerKind::Document",
    }
}

/// The `Format::…` token for a resolved timestamp encoding.
pub(crate) fn format_token(format: Format) -> &'static str {
    match format {
        Format::DateTime => "smithy_httpbind::instant::Format::DateTime",
        Format::HttpDate => "smithy_httpbind::instant::Format::HttpDate",
        Format::EpochSeconds => "smithy_httpbind::instant::Format::EpochSeconds",
    }
}

/// Emit a `pub const NAME: ObjectDescriptor = …;` table.
pub(crate) fn descriptor_const(w: &mut CodeWriter, name: &str, descriptor: &ObjectDescriptor) {
    w.open(format!("pub const {}: ObjectDescriptor = ObjectDescriptor::new(", name));
    w.line(format!("\"{}\",", descriptor.shape));
    w.open("&[");
    for field in &descriptor.fields {
        w.line(format!(
            "FieldDescriptor::new(\"{}\", {}, {}),",
            field.wire_name,
            ser_kind_token(field.kind),
            field.index
        ));
    }
    w.close("],");
    w.close(");");
}

/// The Rust type emitted code uses for a shape.
pub(crate) fn rust_type(ctx: &GenerationContext<'_>, id: &ShapeId) -> Result<String, Error> {
    let model = ctx.model;
    Ok(match model.kind_of(id)? {
        ShapeKind::Boolean => "bool".to_string(),
        ShapeKind::Byte => "i8".to_string(),
        ShapeKind::Short => "i16".to_string(),
        ShapeKind::Integer => "i32".to_string(),
        ShapeKind::Long => "i64".to_string(),
        ShapeKind::Float => "f32".to_string(),
        ShapeKind::Double => "f64".to_string(),
        ShapeKind::String => "String".to_string(),
        ShapeKind::Document => "String".to_string(),
        ShapeKind::Blob => "smithy_httpbind::Blob".to_string(),
        ShapeKind::Timestamp => "smithy_httpbind::Instant".to_string(),
        ShapeKind::Enum | ShapeKind::Structure | ShapeKind::Union => {
            ctx.symbols.type_name(id)
        }
        ShapeKind::List => {
            let element = list_member_target(model, id)?;
            format!("Vec<{}>", rust_type(ctx, &element)?)
        }
        ShapeKind::Map => {
            let value = map_value_target(model, id)?;
            format!(
                "std::collections::HashMap<String, {}>",
                rust_type(ctx, &value)?
            )
        }
        ShapeKind::Operation => {
            return Err(Error::UnexpectedShapeKind {
                shape: id.clone(),
                expected: ShapeKind::Structure,
                found: ShapeKind::Operation,
            })
        }
    })
}

pub(crate) fn list_member_target(model: &Model, id: &ShapeId) -> Result<ShapeId, Error> {
    match model.expect(id)? {
        Shape::List(list) => Ok(list.member.target.clone()),
        other => Err(Error::UnexpectedShapeKind {
            shape: id.clone(),
            expected: ShapeKind::List,
            found: other.kind(),
        }),
    }
}

pub(crate) fn map_value_target(model: &Model, id: &ShapeId) -> Result<ShapeId, Error> {
    match model.expect(id)? {
        Shape::Map(map) => Ok(map.value.target.clone()),
        other => Err(Error::UnexpectedShapeKind {
            shape: id.clone(),
            expected: ShapeKind::Map,
            found: other.kind(),
        }),
    }
}

/// Unit (and module) name for a document shape's serde unit.
pub(crate) fn serde_unit_name(ctx: &GenerationContext<'_>, id: &ShapeId) -> String {
    format!("serde_{}", ctx.symbols.fn_stem(id))
}
