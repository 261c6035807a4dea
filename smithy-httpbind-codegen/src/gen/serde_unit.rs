/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Document (de)serializer units for aggregates reachable inside bodies.
//!
//! These units carry no HTTP logic: a structure or union gets a fields
//! writer plus a dispatch-loop reader over its full member set, and a
//! list/map whose leaves are structures gets element writers/readers. The
//! field write/read helpers here are shared with the operation emitters,
//! which is what keeps document fields encoded identically whether a shape
//! is an operation body or nested three levels deep.

use crate::binding::BindingLocation;
use crate::context::{GenerationContext, SourceUnit};
use crate::descriptor::DescriptorScope;
use crate::error::Error;
use crate::gen::{
    descriptor_const, format_token, rust_type, serde_unit_name, unit_header, CodeWriter,
};
use crate::model::{Member, Shape, ShapeId, ShapeKind, TraitSet};
use crate::timestamp;
use crate::walk::needs_standalone_unit;
use smithy_httpbind::instant::Format;

/// Emit the `serde_<shape>` unit for one reachable document shape.
pub(crate) fn document_unit(
    ctx: &GenerationContext<'_>,
    shape_id: &ShapeId,
) -> Result<SourceUnit, Error> {
    tracing::trace!(shape = %shape_id, "emitting document serde unit");
    match ctx.model.expect(shape_id)? {
        Shape::Structure(_) | Shape::Union(_) => structure_or_union_unit(ctx, shape_id),
        Shape::List(_) => list_unit(ctx, shape_id),
        Shape::Map(_) => map_unit(ctx, shape_id),
        other => Err(Error::UnexpectedShapeKind {
            shape: shape_id.clone(),
            expected: ShapeKind::Structure,
            found: other.kind(),
        }),
    }
}

fn structure_or_union_unit(
    ctx: &GenerationContext<'_>,
    shape_id: &ShapeId,
) -> Result<SourceUnit, Error> {
    let (members, is_union) = match ctx.model.expect(shape_id)? {
        Shape::Structure(shape) => (&shape.members, false),
        Shape::Union(shape) => (&shape.members, true),
        _ => unreachable!("dispatched on shape kind in document_unit"),
    };
    let descriptor = ctx.descriptors.object_descriptor(
        ctx.model,
        shape_id,
        DescriptorScope::Nested,
        members.iter(),
    )?;
    let type_name = ctx.symbols.type_name(shape_id);
    let stem = ctx.symbols.fn_stem(shape_id);
    let const_name = ctx.symbols.const_stem(shape_id);

    let mut w = CodeWriter::new();
    unit_header(
        &mut w,
        &format!("Document (de)serializers for `{}`.", shape_id),
    );
    w.line("use smithy_httpbind::schema::{FieldDescriptor, ObjectDescriptor, SerKind, StructDeserializer, StructSerializer};");
    w.blank();
    descriptor_const(&mut w, &const_name, &descriptor);
    w.blank();

    // serializer
    w.line(format!(
        "pub fn serialize_{}_fields<S>(value: &{}, ser: &mut S) -> Result<(), S::Error>",
        stem, type_name
    ));
    w.line("where");
    w.line("    S: StructSerializer,");
    w.open("{");
    w.line(format!("let fields = {}.fields();", const_name));
    if is_union {
        w.open("match value {");
        for (index, member) in members.iter().enumerate() {
            let variant = variant_name(&member.name);
            w.open(format!("{}::{}(inner) => {{", type_name, variant));
            emit_value_write(ctx, &mut w, member, &format!("&fields[{}]", index), "inner")?;
            w.close("}");
        }
        w.line(format!("{}::Unknown => {{}}", type_name));
        w.close("}");
    } else {
        for (index, member) in members.iter().enumerate() {
            let field_name = ctx.symbols.member_name(member);
            w.open(format!("if let Some(inner) = &value.{} {{", field_name));
            emit_value_write(ctx, &mut w, member, &format!("&fields[{}]", index), "inner")?;
            w.close("}");
        }
    }
    w.line("Ok(())");
    w.close("}");
    w.blank();

    // deserializer
    w.line(format!(
        "pub fn deserialize_{}<D>(de: &mut D) -> Result<{}, D::Error>",
        stem, type_name
    ));
    w.line("where");
    w.line("    D: StructDeserializer,");
    w.open("{");
    if is_union {
        w.open(format!(
            "let value = de.deserialize_struct(&{}, None, |_, field, de| {{",
            const_name
        ));
        w.open("Ok(match field.index() {");
        for (index, member) in members.iter().enumerate() {
            let variant = variant_name(&member.name);
            w.open(format!("{} => {{", index));
            emit_value_read(ctx, &mut w, &member.traits, &member.target)?;
            w.line(format!("Some({}::{}(value))", type_name, variant));
            w.close("}");
        }
        w.open("_ => {");
        w.line("de.skip_value()?;");
        w.line("None");
        w.close("}");
        w.close("})");
        w.close("})?;");
        w.line(format!("Ok(value.unwrap_or({}::Unknown))", type_name));
    } else {
        w.open(format!(
            "let builder = de.deserialize_struct(&{}, {}::builder(), |mut builder, field, de| {{",
            const_name, type_name
        ));
        w.open("match field.index() {");
        for (index, member) in members.iter().enumerate() {
            let field_name = ctx.symbols.member_name(member);
            w.open(format!("{} => {{", index));
            emit_value_read(ctx, &mut w, &member.traits, &member.target)?;
            w.line(format!("builder.{} = Some(value);", field_name));
            w.close("}");
        }
        w.line("_ => de.skip_value()?,");
        w.close("}");
        w.line("Ok(builder)");
        w.close("})?;");
        w.line("Ok(builder.build())");
    }
    w.close("}");

    Ok(SourceUnit {
        name: serde_unit_name(ctx, shape_id),
        shape: shape_id.clone(),
        content: w.finish(),
    })
}

fn list_unit(ctx: &GenerationContext<'_>, shape_id: &ShapeId) -> Result<SourceUnit, Error> {
    let list = match ctx.model.expect(shape_id)? {
        Shape::List(list) => list,
        _ => unreachable!("dispatched on shape kind in document_unit"),
    };
    let stem = ctx.symbols.fn_stem(shape_id);
    let element_type = rust_type(ctx, &list.member.target)?;
    let member_const = format!("{}_MEMBER", ctx.symbols.const_stem(shape_id));
    let member_kind =
        crate::descriptor::ser_kind(ctx.model, shape_id, &list.member)?;

    let mut w = CodeWriter::new();
    unit_header(
        &mut w,
        &format!("Document (de)serializers for `{}`.", shape_id),
    );
    w.line("use smithy_httpbind::schema::{FieldDescriptor, SerKind, StructDeserializer, StructSerializer};");
    w.blank();
    w.line(format!(
        "pub const {}: FieldDescriptor = FieldDescriptor::new(\"{}\", {}, 0);",
        member_const,
        list.member.name,
        crate::gen::ser_kind_token(member_kind)
    ));
    w.blank();

    w.line(format!(
        "pub fn serialize_{}<S>(value: &[{}], ser: &mut S) -> Result<(), S::Error>",
        stem, element_type
    ));
    w.line("where");
    w.line("    S: StructSerializer,");
    w.open("{");
    w.open("for item in value {");
    emit_value_write(
        ctx,
        &mut w,
        &list.member,
        &member_const_ref(&member_const),
        "item",
    )?;
    w.close("}");
    w.line("Ok(())");
    w.close("}");
    w.blank();

    w.line(format!(
        "pub fn deserialize_{}<D>(de: &mut D) -> Result<Vec<{}>, D::Error>",
        stem, element_type
    ));
    w.line("where");
    w.line("    D: StructDeserializer,");
    w.open("{");
    w.open("de.deserialize_list(Vec::new(), |mut items, de| {");
    {
        let field_expr = member_const_ref(&member_const);
        emit_value_read_with_field(ctx, &mut w, &list.member.traits, &list.member.target, &field_expr)?;
    }
    w.line("items.push(value);");
    w.line("Ok(items)");
    w.close("})");
    w.close("}");

    Ok(SourceUnit {
        name: serde_unit_name(ctx, shape_id),
        shape: shape_id.clone(),
        content: w.finish(),
    })
}

fn map_unit(ctx: &GenerationContext<'_>, shape_id: &ShapeId) -> Result<SourceUnit, Error> {
    let map = match ctx.model.expect(shape_id)? {
        Shape::Map(map) => map,
        _ => unreachable!("dispatched on shape kind in document_unit"),
    };
    let stem = ctx.symbols.fn_stem(shape_id);
    let value_type = rust_type(ctx, &map.value.target)?;
    let value_const = format!("{}_VALUE", ctx.symbols.const_stem(shape_id));
    let value_kind = crate::descriptor::ser_kind(ctx.model, shape_id, &map.value)?;

    let mut w = CodeWriter::new();
    unit_header(
        &mut w,
        &format!("Document (de)serializers for `{}`.", shape_id),
    );
    w.line("use smithy_httpbind::schema::{FieldDescriptor, SerKind, StructDeserializer, StructSerializer};");
    w.blank();
    w.line(format!(
        "pub const {}: FieldDescriptor = FieldDescriptor::new(\"{}\", {}, 0);",
        value_const,
        map.value.name,
        crate::gen::ser_kind_token(value_kind)
    ));
    w.blank();

    w.line(format!(
        "pub fn serialize_{}<S>(value: &std::collections::HashMap<String, {}>, ser: &mut S) -> Result<(), S::Error>",
        stem, value_type
    ));
    w.line("where");
    w.line("    S: StructSerializer,");
    w.open("{");
    w.open("for (key, item) in value {");
    w.line("ser.entry_key(key)?;");
    emit_value_write(
        ctx,
        &mut w,
        &map.value,
        &member_const_ref(&value_const),
        "item",
    )?;
    w.close("}");
    w.line("Ok(())");
    w.close("}");
    w.blank();

    w.line(format!(
        "pub fn deserialize_{}<D>(de: &mut D) -> Result<std::collections::HashMap<String, {}>, D::Error>",
        stem, value_type
    ));
    w.line("where");
    w.line("    D: StructDeserializer,");
    w.open("{");
    w.open("de.deserialize_map(std::collections::HashMap::new(), |mut entries, key, de| {");
    {
        let field_expr = member_const_ref(&value_const);
        emit_value_read_with_field(ctx, &mut w, &map.value.traits, &map.value.target, &field_expr)?;
    }
    w.line("entries.insert(key, value);");
    w.line("Ok(entries)");
    w.close("})");
    w.close("}");

    Ok(SourceUnit {
        name: serde_unit_name(ctx, shape_id),
        shape: shape_id.clone(),
        content: w.finish(),
    })
}

fn member_const_ref(const_name: &str) -> String {
    format!("&{}", const_name)
}

/// PascalCase union variant name for a member.
pub(crate) fn variant_name(member_name: &str) -> String {
    let mut out = String::with_capacity(member_name.len());
    let mut upper_next = true;
    for c in member_name.chars() {
        if c == '_' || c == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Emit the write call(s) for one document value.
///
/// `value_expr` is a binding holding `&T` for the member's target type;
/// `field_expr` is the `&FieldDescriptor` expression for the field slot.
/// Timestamps are rendered per the resolved format before the handoff and
/// blobs are base64-encoded; both propagate failures through `S::Error`.
pub(crate) fn emit_value_write(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    member: &Member,
    field_expr: &str,
    value_expr: &str,
) -> Result<(), Error> {
    let model = ctx.model;
    let target = &member.target;
    match model.kind_of(target)? {
        ShapeKind::String => {
            w.line(format!("ser.write_string({}, {})?;", field_expr, value_expr));
        }
        ShapeKind::Enum => {
            w.line(format!(
                "ser.write_string({}, {}.as_str())?;",
                field_expr, value_expr
            ));
        }
        ShapeKind::Boolean => {
            w.line(format!(
                "ser.write_boolean({}, *{})?;",
                field_expr, value_expr
            ));
        }
        ShapeKind::Byte => {
            w.line(format!("ser.write_byte({}, *{})?;", field_expr, value_expr));
        }
        ShapeKind::Short => {
            w.line(format!("ser.write_short({}, *{})?;", field_expr, value_expr));
        }
        ShapeKind::Integer => {
            w.line(format!(
                "ser.write_integer({}, *{})?;",
                field_expr, value_expr
            ));
        }
        ShapeKind::Long => {
            w.line(format!("ser.write_long({}, *{})?;", field_expr, value_expr));
        }
        ShapeKind::Float => {
            w.line(format!("ser.write_float({}, *{})?;", field_expr, value_expr));
        }
        ShapeKind::Double => {
            w.line(format!(
                "ser.write_double({}, *{})?;",
                field_expr, value_expr
            ));
        }
        ShapeKind::Blob => {
            w.line(format!(
                "ser.write_string({}, &smithy_httpbind::base64::encode({}.as_ref()))?;",
                field_expr, value_expr
            ));
        }
        ShapeKind::Timestamp => {
            let format = timestamp::resolve(
                &member.traits,
                &BindingLocation::Document,
                ctx.settings.default_timestamp_format,
            );
            w.line(format!(
                "let encoded = {}.fmt({})?;",
                value_expr,
                format_token(format)
            ));
            if format == Format::EpochSeconds {
                w.line(format!("ser.write_raw({}, &encoded)?;", field_expr));
            } else {
                w.line(format!("ser.write_string({}, &encoded)?;", field_expr));
            }
        }
        ShapeKind::Document => {
            w.line(format!("ser.write_raw({}, {})?;", field_expr, value_expr));
        }
        ShapeKind::Structure | ShapeKind::Union => {
            let unit = serde_unit_name(ctx, target);
            let stem = ctx.symbols.fn_stem(target);
            let const_name = ctx.symbols.const_stem(target);
            w.open(format!(
                "ser.field_struct({}, &crate::{}::{}, |ser| {{",
                field_expr, unit, const_name
            ));
            w.line(format!(
                "crate::{}::serialize_{}_fields({}, ser)",
                unit, stem, value_expr
            ));
            w.close("})?;");
        }
        ShapeKind::List => {
            if needs_standalone_unit(model, target) {
                let unit = serde_unit_name(ctx, target);
                let stem = ctx.symbols.fn_stem(target);
                w.open(format!("ser.field_list({}, |ser| {{", field_expr));
                w.line(format!(
                    "crate::{}::serialize_{}({}, ser)",
                    unit, stem, value_expr
                ));
                w.close("})?;");
            } else {
                let element_member = match model.expect(target)? {
                    Shape::List(list) => list.member.clone(),
                    _ => unreachable!("kind checked above"),
                };
                w.open(format!("ser.field_list({}, |ser| {{", field_expr));
                w.open(format!("for item in {} {{", value_expr));
                emit_value_write(ctx, w, &element_member, field_expr, "item")?;
                w.close("}");
                w.line("Ok(())");
                w.close("})?;");
            }
        }
        ShapeKind::Map => {
            if needs_standalone_unit(model, target) {
                let unit = serde_unit_name(ctx, target);
                let stem = ctx.symbols.fn_stem(target);
                w.open(format!("ser.field_map({}, |ser| {{", field_expr));
                w.line(format!(
                    "crate::{}::serialize_{}({}, ser)",
                    unit, stem, value_expr
                ));
                w.close("})?;");
            } else {
                let value_member = match model.expect(target)? {
                    Shape::Map(map) => map.value.clone(),
                    _ => unreachable!("kind checked above"),
                };
                w.open(format!("ser.field_map({}, |ser| {{", field_expr));
                w.open(format!("for (key, item) in {} {{", value_expr));
                w.line("ser.entry_key(key)?;");
                emit_value_write(ctx, w, &value_member, field_expr, "item")?;
                w.close("}");
                w.line("Ok(())");
                w.close("})?;");
            }
        }
        ShapeKind::Operation => {
            return Err(Error::InvalidMemberTarget {
                shape: target.clone(),
                member: member.name.clone(),
                target: target.clone(),
            })
        }
    }
    Ok(())
}

/// Emit lines producing a deserialized local named `value` for a document
/// field, reading through the dispatch loop's `field` descriptor binding.
pub(crate) fn emit_value_read(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    traits: &TraitSet,
    target: &ShapeId,
) -> Result<(), Error> {
    emit_value_read_with_field(ctx, w, traits, target, "field")
}

fn emit_value_read_with_field(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    traits: &TraitSet,
    target: &ShapeId,
    field_expr: &str,
) -> Result<(), Error> {
    let model = ctx.model;
    match model.kind_of(target)? {
        ShapeKind::String => {
            w.line(format!("let value = de.read_string({})?;", field_expr));
        }
        ShapeKind::Enum => {
            w.line(format!(
                "let value = {}::from(de.read_string({})?.as_str());",
                ctx.symbols.type_name(target),
                field_expr
            ));
        }
        ShapeKind::Boolean => {
            w.line(format!("let value = de.read_boolean({})?;", field_expr));
        }
        ShapeKind::Byte => {
            w.line(format!("let value = de.read_byte({})?;", field_expr));
        }
        ShapeKind::Short => {
            w.line(format!("let value = de.read_short({})?;", field_expr));
        }
        ShapeKind::Integer => {
            w.line(format!("let value = de.read_integer({})?;", field_expr));
        }
        ShapeKind::Long => {
            w.line(format!("let value = de.read_long({})?;", field_expr));
        }
        ShapeKind::Float => {
            w.line(format!("let value = de.read_float({})?;", field_expr));
        }
        ShapeKind::Double => {
            w.line(format!("let value = de.read_double({})?;", field_expr));
        }
        ShapeKind::Blob => {
            w.line(format!("let raw = de.read_string({})?;", field_expr));
            w.line(
                "let value = smithy_httpbind::Blob::new(smithy_httpbind::base64::decode(&raw)?);",
            );
        }
        ShapeKind::Timestamp => {
            let format = timestamp::resolve(
                traits,
                &BindingLocation::Document,
                ctx.settings.default_timestamp_format,
            );
            if format == Format::EpochSeconds {
                w.line(format!("let raw = de.read_raw({})?;", field_expr));
            } else {
                w.line(format!("let raw = de.read_string({})?;", field_expr));
            }
            w.line(format!(
                "let value = smithy_httpbind::Instant::from_str(&raw, {})?;",
                format_token(format)
            ));
        }
        ShapeKind::Document => {
            w.line(format!("let value = de.read_raw({})?;", field_expr));
        }
        ShapeKind::Structure | ShapeKind::Union => {
            let unit = serde_unit_name(ctx, target);
            let stem = ctx.symbols.fn_stem(target);
            w.line(format!(
                "let value = crate::{}::deserialize_{}(de)?;",
                unit, stem
            ));
        }
        ShapeKind::List => {
            if needs_standalone_unit(model, target) {
                let unit = serde_unit_name(ctx, target);
                let stem = ctx.symbols.fn_stem(target);
                w.line(format!(
                    "let value = crate::{}::deserialize_{}(de)?;",
                    unit, stem
                ));
            } else {
                let element_member = match model.expect(target)? {
                    Shape::List(list) => list.member.clone(),
                    _ => unreachable!("kind checked above"),
                };
                w.open("let value = de.deserialize_list(Vec::new(), |mut items, de| {");
                emit_value_read_with_field(
                    ctx,
                    w,
                    &element_member.traits,
                    &element_member.target,
                    field_expr,
                )?;
                w.line("items.push(value);");
                w.line("Ok(items)");
                w.close("})?;");
            }
        }
        ShapeKind::Map => {
            if needs_standalone_unit(model, target) {
                let unit = serde_unit_name(ctx, target);
                let stem = ctx.symbols.fn_stem(target);
                w.line(format!(
                    "let value = crate::{}::deserialize_{}(de)?;",
                    unit, stem
                ));
            } else {
                let value_member = match model.expect(target)? {
                    Shape::Map(map) => map.value.clone(),
                    _ => unreachable!("kind checked above"),
                };
                w.open("let value = de.deserialize_map(std::collections::HashMap::new(), |mut entries, key, de| {");
                emit_value_read_with_field(
                    ctx,
                    w,
                    &value_member.traits,
                    &value_member.target,
                    field_expr,
                )?;
                w.line("entries.insert(key, value);");
                w.line("Ok(entries)");
                w.close("})?;");
            }
        }
        ShapeKind::Operation => {
            return Err(Error::InvalidMemberTarget {
                shape: target.clone(),
                member: target.shape_name().to_string(),
                target: target.clone(),
            })
        }
    }
    Ok(())
}
