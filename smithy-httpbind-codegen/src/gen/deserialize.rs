/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Response and error deserializer emission.
//!
//! Mirrors the serializer: bound members are extracted from response
//! headers (absent header leaves the field unset), then the body is either
//! taken as the explicit payload or parsed through the descriptor-driven
//! dispatch loop. Unrecognized body fields are skipped without decoding,
//! which keeps old consumers compatible with newer server responses.

use crate::binding::{BindingLocation, Direction, HttpBindingIndex};
use crate::context::{GenerationContext, SourceUnit};
use crate::descriptor::DescriptorScope;
use crate::error::Error;
use crate::gen::serde_unit::emit_value_read;
use crate::gen::{descriptor_const, format_token, serde_unit_name, unit_header, CodeWriter};
use crate::model::{Member, OperationShape, Shape, ShapeId, ShapeKind, TraitKind};
use crate::timestamp;
use crate::uri::UriTemplate;

pub(crate) fn response_deserializer_unit(
    ctx: &GenerationContext<'_>,
    op: &OperationShape,
) -> Result<SourceUnit, Error> {
    tracing::trace!(operation = %op.id, "emitting response deserializer");
    let output_id = op
        .output
        .as_ref()
        .expect("caller only emits a response deserializer for operations with output");
    let op_stem = ctx.symbols.fn_stem(&op.id);
    emit_deserializer(
        ctx,
        output_id,
        &op.id,
        format!("deser_{}", op_stem),
        format!("deserialize_{}_response", op_stem),
        format!("Response deserializer for `{}`.", op.id),
    )
}

pub(crate) fn error_deserializer_unit(
    ctx: &GenerationContext<'_>,
    shape_id: &ShapeId,
) -> Result<SourceUnit, Error> {
    tracing::trace!(shape = %shape_id, "emitting error deserializer");
    let stem = ctx.symbols.fn_stem(shape_id);
    emit_deserializer(
        ctx,
        shape_id,
        shape_id,
        format!("deser_error_{}", stem),
        format!("deserialize_{}_error", stem),
        format!("Error deserializer for `{}`.", shape_id),
    )
}

fn emit_deserializer(
    ctx: &GenerationContext<'_>,
    shape_id: &ShapeId,
    unit_shape: &ShapeId,
    unit_name: String,
    fn_name: String,
    title: String,
) -> Result<SourceUnit, Error> {
    let shape = ctx.model.expect_structure(shape_id)?;
    // responses have no path template; labels/queries are rejected
    let no_uri = UriTemplate::parse("/")?;
    let bindings = HttpBindingIndex::resolve(ctx.model, shape, &no_uri, Direction::Response)?;
    let document_members: Vec<&Member> = bindings.document_members().collect();
    let descriptor = if document_members.is_empty() {
        None
    } else {
        Some(ctx.descriptors.object_descriptor(
            ctx.model,
            shape_id,
            DescriptorScope::HttpBody,
            document_members.iter().copied(),
        )?)
    };
    let payload = bindings.payload().map(|b| b.member);
    let payload_kind = match payload {
        Some(member) => Some(ctx.model.kind_of(&member.target)?),
        None => None,
    };
    let streaming_payload = match payload {
        Some(member) => is_streaming(ctx, member),
        None => false,
    };
    let struct_payload = matches!(
        payload_kind,
        Some(ShapeKind::Structure | ShapeKind::Union)
    );
    let needs_de_param = descriptor.is_some() || struct_payload;
    // string/enum/blob/streaming payloads consume the response body
    let by_value = payload.is_some() && !struct_payload;
    let has_headers =
        bindings.headers().next().is_some() || bindings.prefix_headers().next().is_some();
    let type_name = ctx.symbols.type_name(shape_id);
    let const_name = format!("{}_BODY", ctx.symbols.const_stem(shape_id));

    let mut w = CodeWriter::new();
    unit_header(&mut w, &title);
    w.line("use smithy_httpbind::body::Body;");
    w.line("use smithy_httpbind::operation::ParseError;");
    if descriptor.is_some() {
        w.line("use smithy_httpbind::schema::{FieldDescriptor, ObjectDescriptor, SerKind, StructDeserializer};");
    } else if struct_payload {
        w.line("use smithy_httpbind::schema::StructDeserializer;");
    }
    w.blank();

    if let Some(descriptor) = &descriptor {
        descriptor_const(&mut w, &const_name, descriptor);
        w.blank();
    }

    let response_type = if by_value {
        "http::Response<Body>"
    } else {
        "&http::Response<Body>"
    };
    let response_var = if by_value || has_headers {
        "response"
    } else {
        "_response"
    };
    if needs_de_param {
        w.line(format!("pub fn {}<D>(", fn_name));
        w.line(format!("    {}: {},", response_var, response_type));
        w.line("    mut body_deserializer: D,");
        w.line(format!(") -> Result<{}, ParseError>", type_name));
        w.line("where");
        w.line("    D: StructDeserializer,");
        w.open("{");
    } else {
        w.open(format!(
            "pub fn {}({}: {}) -> Result<{}, ParseError> {{",
            fn_name, response_var, response_type, type_name
        ));
    }

    if by_value {
        if has_headers {
            w.line("let (parts, body) = response.into_parts();");
            w.line("let headers = &parts.headers;");
        } else {
            w.line("let (_parts, body) = response.into_parts();");
        }
    } else if has_headers {
        w.line("let headers = response.headers();");
    }
    if has_headers || payload.is_some() {
        w.line(format!("let mut builder = {}::builder();", type_name));
    } else {
        w.line(format!("let builder = {}::builder();", type_name));
    }

    for (member, name) in bindings.headers() {
        emit_header_member(ctx, &mut w, member, name)?;
    }
    for (member, prefix) in bindings.prefix_headers() {
        emit_prefix_headers_member(ctx, &mut w, member, prefix)?;
    }

    if let Some(member) = payload {
        w.blank();
        emit_payload(ctx, &mut w, member, payload_kind.unwrap(), streaming_payload)?;
        w.blank();
        w.line("Ok(builder.build())");
    } else if descriptor.is_some() {
        w.blank();
        w.open("let builder = body_deserializer");
        w.open(format!(
            ".deserialize_struct(&{}, builder, |mut builder, field, de| {{",
            const_name
        ));
        w.open("match field.index() {");
        for (index, member) in document_members.iter().enumerate() {
            let field_name = ctx.symbols.member_name(member);
            w.open(format!("{} => {{", index));
            emit_value_read(ctx, &mut w, &member.traits, &member.target)?;
            w.line(format!("builder.{} = Some(value);", field_name));
            w.close("}");
        }
        w.line("_ => de.skip_value()?,");
        w.close("}");
        w.line("Ok(builder)");
        w.close("})");
        w.line(".map_err(|err| ParseError::Deserialization(err.to_string()))?;");
        w.dedent();
        w.line("Ok(builder.build())");
    } else {
        w.blank();
        w.line("Ok(builder.build())");
    }
    w.close("}");

    Ok(SourceUnit {
        name: unit_name,
        shape: unit_shape.clone(),
        content: w.finish(),
    })
}

fn is_streaming(ctx: &GenerationContext<'_>, member: &Member) -> bool {
    if member.traits.contains(TraitKind::Streaming) {
        return true;
    }
    matches!(
        ctx.model.get(&member.target),
        Some(shape) if shape.traits().contains(TraitKind::Streaming)
    )
}

fn emit_header_member(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    member: &Member,
    name: &str,
) -> Result<(), Error> {
    let var = ctx.symbols.member_name(member);
    match ctx.model.kind_of(&member.target)? {
        ShapeKind::String => {
            w.open(format!("if let Some(raw) = headers.get(\"{}\") {{", name));
            w.line("let value = raw");
            w.line("    .to_str()");
            w.line(format!(
                "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                name
            ));
            w.line(format!("builder.{} = Some(value.to_string());", var));
            w.close("}");
        }
        ShapeKind::Enum => {
            let enum_type = ctx.symbols.type_name(&member.target);
            w.open(format!("if let Some(raw) = headers.get(\"{}\") {{", name));
            w.line("let value = raw");
            w.line("    .to_str()");
            w.line(format!(
                "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                name
            ));
            w.line(format!("builder.{} = Some({}::from(value));", var, enum_type));
            w.close("}");
        }
        ShapeKind::Timestamp => {
            let format = timestamp::resolve(
                &member.traits,
                &BindingLocation::Header(name.to_string()),
                ctx.settings.default_timestamp_format,
            );
            w.open(format!("if let Some(raw) = headers.get(\"{}\") {{", name));
            w.line("let value = raw");
            w.line("    .to_str()");
            w.line(format!(
                "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                name
            ));
            w.open(format!("builder.{} = Some(", var));
            w.line(format!(
                "smithy_httpbind::Instant::from_str(value, {})",
                format_token(format)
            ));
            w.line(format!(
                "    .map_err(|_| ParseError::invalid_header(\"{}\"))?,",
                name
            ));
            w.close(");");
            w.close("}");
        }
        ShapeKind::List => {
            let element = match ctx.model.expect(&member.target)? {
                Shape::List(list) => list.member.clone(),
                _ => unreachable!("kind checked by the binding resolver"),
            };
            match ctx.model.kind_of(&element.target)? {
                ShapeKind::String => {
                    w.line(format!(
                        "let values = smithy_httpbind::header::read_many_strings(headers, \"{}\")",
                        name
                    ));
                    w.line(format!(
                        "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                        name
                    ));
                    w.open("if !values.is_empty() {");
                    w.line(format!("builder.{} = Some(values);", var));
                    w.close("}");
                }
                ShapeKind::Enum => {
                    let enum_type = ctx.symbols.type_name(&element.target);
                    w.line(format!(
                        "let values = smithy_httpbind::header::read_many_strings(headers, \"{}\")",
                        name
                    ));
                    w.line(format!(
                        "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                        name
                    ));
                    w.open("if !values.is_empty() {");
                    w.line(format!(
                        "builder.{} = Some(values.iter().map(|value| {}::from(value.as_str())).collect());",
                        var, enum_type
                    ));
                    w.close("}");
                }
                ShapeKind::Timestamp => {
                    let format = timestamp::resolve(
                        &element.traits,
                        &BindingLocation::Header(name.to_string()),
                        ctx.settings.default_timestamp_format,
                    );
                    w.line(format!(
                        "let values = smithy_httpbind::header::many_dates(headers, \"{}\", {})",
                        name,
                        format_token(format)
                    ));
                    w.line(format!(
                        "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                        name
                    ));
                    w.open("if !values.is_empty() {");
                    w.line(format!("builder.{} = Some(values);", var));
                    w.close("}");
                }
                kind if kind.is_scalar() => {
                    let rust = scalar_rust_type(kind);
                    w.line(format!(
                        "let values = smithy_httpbind::header::read_many::<{}>(headers, \"{}\")",
                        rust, name
                    ));
                    w.line(format!(
                        "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                        name
                    ));
                    w.open("if !values.is_empty() {");
                    w.line(format!("builder.{} = Some(values);", var));
                    w.close("}");
                }
                _ => {
                    return Err(Error::UnsupportedBinding {
                        shape: member.target.clone(),
                        member: member.name.clone(),
                        location: "a header",
                        target: element.target.clone(),
                    })
                }
            }
        }
        kind if kind.is_scalar() => {
            let rust = scalar_rust_type(kind);
            w.line(format!(
                "builder.{} = smithy_httpbind::header::read_one::<{}>(headers, \"{}\")",
                var, rust, name
            ));
            w.line(format!(
                "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                name
            ));
        }
        _ => {
            return Err(Error::UnsupportedBinding {
                shape: member.target.clone(),
                member: member.name.clone(),
                location: "a header",
                target: member.target.clone(),
            })
        }
    }
    Ok(())
}

fn scalar_rust_type(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Boolean => "bool",
        ShapeKind::Byte => "i8",
        ShapeKind::Short => "i16",
        ShapeKind::Integer => "i32",
        ShapeKind::Long => "i64",
        ShapeKind::Float => "f32",
        ShapeKind::Double => "f64",
        _ => "String",
    }
}

fn emit_prefix_headers_member(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    member: &Member,
    prefix: &str,
) -> Result<(), Error> {
    let var = ctx.symbols.member_name(member);
    let value_member = match ctx.model.expect(&member.target)? {
        Shape::Map(map) => map.value.clone(),
        other => {
            return Err(Error::UnsupportedBinding {
                shape: member.target.clone(),
                member: member.name.clone(),
                location: "prefix headers",
                target: other.id().clone(),
            })
        }
    };
    w.line("let mut entries = std::collections::HashMap::new();");
    w.open(format!(
        "for (key, value) in smithy_httpbind::header::headers_for_prefix(headers, \"{}\") {{",
        prefix
    ));
    w.line("let value = value");
    w.line("    .to_str()");
    w.line(format!(
        "    .map_err(|_| ParseError::invalid_header(\"{}\"))?;",
        prefix
    ));
    match ctx.model.kind_of(&value_member.target)? {
        ShapeKind::String | ShapeKind::Enum => {
            w.line("entries.insert(key, value.to_string());");
        }
        kind if kind.is_scalar() && kind != ShapeKind::Timestamp => {
            let rust = scalar_rust_type(kind);
            w.open(format!("let value = value.trim().parse::<{}>()", rust));
            w.line(format!(
                ".map_err(|_| ParseError::invalid_header(\"{}\"))?;",
                prefix
            ));
            w.dedent();
            w.line("entries.insert(key, value);");
        }
        _ => {
            return Err(Error::UnsupportedBinding {
                shape: member.target.clone(),
                member: member.name.clone(),
                location: "prefix headers",
                target: value_member.target.clone(),
            })
        }
    }
    w.close("}");
    w.open("if !entries.is_empty() {");
    w.line(format!("builder.{} = Some(entries);", var));
    w.close("}");
    Ok(())
}

fn emit_payload(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    member: &Member,
    kind: ShapeKind,
    streaming: bool,
) -> Result<(), Error> {
    let var = ctx.symbols.member_name(member);
    match kind {
        ShapeKind::Blob if streaming => {
            // wrap the response body as a lazy stream, never buffering it
            w.open(format!("builder.{} = Some(match body {{", var));
            w.line("Body::Stream(stream) => stream,");
            w.open("Body::Bytes(bytes) => {");
            w.line("smithy_httpbind::body::ByteStream::new(std::io::Cursor::new(bytes.to_vec()))");
            w.close("}");
            w.line("Body::Empty => smithy_httpbind::body::ByteStream::from_static(b\"\"),");
            w.close("});");
        }
        ShapeKind::Blob => {
            emit_buffered_bytes(w);
            w.open("if !bytes.is_empty() {");
            w.line(format!(
                "builder.{} = Some(smithy_httpbind::Blob::new(bytes.to_vec()));",
                var
            ));
            w.close("}");
        }
        ShapeKind::String => {
            emit_buffered_bytes(w);
            w.open("if !bytes.is_empty() {");
            w.open(format!("builder.{} = Some(", var));
            w.line("std::str::from_utf8(bytes)");
            w.line("    .map_err(|_| ParseError::invalid_payload(\"body was not valid UTF-8\"))?");
            w.line("    .to_string(),");
            w.close(");");
            w.close("}");
        }
        ShapeKind::Enum => {
            let enum_type = ctx.symbols.type_name(&member.target);
            emit_buffered_bytes(w);
            w.open("if !bytes.is_empty() {");
            w.open(format!("builder.{} = Some({}::from(", var, enum_type));
            w.line("std::str::from_utf8(bytes)");
            w.line("    .map_err(|_| ParseError::invalid_payload(\"body was not valid UTF-8\"))?,");
            w.close("));");
            w.close("}");
        }
        ShapeKind::Structure | ShapeKind::Union => {
            let unit = serde_unit_name(ctx, &member.target);
            let stem = ctx.symbols.fn_stem(&member.target);
            w.open(format!("builder.{} = Some(", var));
            w.line(format!(
                "crate::{}::deserialize_{}(&mut body_deserializer)",
                unit, stem
            ));
            w.line("    .map_err(|err| ParseError::Deserialization(err.to_string()))?,");
            w.close(");");
        }
        _ => {
            return Err(Error::UnsupportedBinding {
                shape: member.target.clone(),
                member: member.name.clone(),
                location: "the payload",
                target: member.target.clone(),
            })
        }
    }
    Ok(())
}

fn emit_buffered_bytes(w: &mut CodeWriter) {
    w.line("let bytes = body");
    w.line("    .bytes()");
    w.line("    .ok_or_else(|| ParseError::invalid_payload(\"expected a buffered body\"))?;");
}
