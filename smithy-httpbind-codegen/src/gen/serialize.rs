/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Request serializer emission.
//!
//! Per operation, one `ser_<operation>` unit whose function takes the typed
//! input plus (when the shape has a structured body) an abstract
//! `StructSerializer`, and produces an `http::Request` by setting method and
//! path, appending query pairs, setting headers, and encoding the body.

use crate::binding::{BindingLocation, Direction, HttpBindingIndex};
use crate::context::{GenerationContext, SourceUnit};
use crate::descriptor::DescriptorScope;
use crate::error::Error;
use crate::gen::serde_unit::emit_value_write;
use crate::gen::{descriptor_const, format_token, serde_unit_name, unit_header, CodeWriter};
use crate::model::{Member, Model, OperationShape, Shape, ShapeKind, TraitKind};
use crate::timestamp;
use crate::uri::{PathSegment, UriTemplate};
use smithy_httpbind::query;

pub(crate) fn request_serializer_unit(
    ctx: &GenerationContext<'_>,
    op: &OperationShape,
) -> Result<SourceUnit, Error> {
    tracing::trace!(operation = %op.id, "emitting request serializer");
    let http = op.http()?.clone();
    let uri = UriTemplate::parse(&http.uri)?;
    let op_stem = ctx.symbols.fn_stem(&op.id);

    let mut w = CodeWriter::new();
    unit_header(&mut w, &format!("Request serializer for `{}`.", op.id));

    let input_id = match &op.input {
        Some(id) => id,
        None => {
            w.line("use smithy_httpbind::body::Body;");
            w.line("use smithy_httpbind::operation::BuildError;");
            w.blank();
            w.open(format!(
                "pub fn serialize_{}_request() -> Result<http::Request<Body>, BuildError> {{",
                op_stem
            ));
            w.line("let mut uri = String::new();");
            emit_static_path(&mut w, &uri);
            emit_query_literals_only(&mut w, &uri);
            w.blank();
            w.line(format!(
                "let builder = http::Request::builder().method(\"{}\").uri(uri);",
                http.method
            ));
            w.blank();
            w.line("builder");
            w.line("    .body(Body::empty())");
            w.line("    .map_err(|err| BuildError::InvalidRequest(err.to_string()))");
            w.close("}");
            return Ok(SourceUnit {
                name: format!("ser_{}", op_stem),
                shape: op.id.clone(),
                content: w.finish(),
            });
        }
    };

    let input_shape = ctx.model.expect_structure(input_id)?;
    let bindings = HttpBindingIndex::resolve(ctx.model, input_shape, &uri, Direction::Request)?;
    let document_members: Vec<&Member> = bindings.document_members().collect();
    let descriptor = if document_members.is_empty() {
        None
    } else {
        Some(ctx.descriptors.object_descriptor(
            ctx.model,
            input_id,
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
        Some(member) => is_streaming(ctx.model, member),
        None => false,
    };
    let struct_payload = matches!(
        payload_kind,
        Some(ShapeKind::Structure | ShapeKind::Union)
    );
    let needs_ser_param = descriptor.is_some() || struct_payload;
    let input_type = ctx.symbols.type_name(input_id);
    let const_name = format!("{}_BODY", ctx.symbols.const_stem(input_id));
    let has_headers = bindings.headers().next().is_some() || bindings.prefix_headers().next().is_some();
    let has_query = bindings.queries().next().is_some() || !uri.query_literals().is_empty();
    let input_var = if input_shape.members.is_empty() {
        "_input"
    } else {
        "input"
    };

    w.line("use smithy_httpbind::body::Body;");
    w.line("use smithy_httpbind::operation::BuildError;");
    if descriptor.is_some() {
        w.line("use smithy_httpbind::schema::{FieldDescriptor, ObjectDescriptor, SerKind, StructSerializer};");
    } else if struct_payload {
        w.line("use smithy_httpbind::schema::StructSerializer;");
    }
    w.blank();

    if let Some(descriptor) = &descriptor {
        descriptor_const(&mut w, &const_name, descriptor);
        w.blank();
    }

    if needs_ser_param {
        w.line(format!("pub fn serialize_{}_request<S>(", op_stem));
        w.line(format!("    {}: {},", input_var, input_type));
        w.line("    mut body_serializer: S,");
        w.line(") -> Result<http::Request<Body>, BuildError>");
        w.line("where");
        w.line("    S: StructSerializer<Output = Vec<u8>>,");
        w.open("{");
    } else {
        w.open(format!(
            "pub fn serialize_{}_request({}: {}) -> Result<http::Request<Body>, BuildError> {{",
            op_stem, input_var, input_type
        ));
    }

    // method and raw path, labels substituted
    w.line("let mut uri = String::new();");
    let mut literal = String::new();
    let mut any_segment = false;
    for segment in uri.segments() {
        any_segment = true;
        match segment {
            PathSegment::Literal(text) => {
                literal.push('/');
                literal.push_str(text);
            }
            PathSegment::Label { name, greedy } => {
                literal.push('/');
                w.line(format!("uri.push_str(\"{}\");", literal));
                literal.clear();
                let member = bindings
                    .labels()
                    .map(|(member, _)| member)
                    .find(|member| &member.name == name)
                    .expect("resolver verified every placeholder has a label member");
                emit_label(ctx, &mut w, member, *greedy)?;
            }
        }
    }
    if !literal.is_empty() {
        w.line(format!("uri.push_str(\"{}\");", literal));
    }
    if !any_segment {
        w.line("uri.push_str(\"/\");");
    }

    // query members, then the template's literal constants
    if has_query {
        w.blank();
        w.line("let mut query = smithy_httpbind::query::QueryWriter::new();");
        for (member, key) in bindings.queries() {
            emit_query_member(ctx, &mut w, member, key)?;
        }
        emit_query_literal_pushes(&mut w, &uri);
        w.line("uri.push_str(&query.finish());");
    }

    w.blank();
    if has_headers {
        w.line(format!(
            "let mut builder = http::Request::builder().method(\"{}\").uri(uri);",
            http.method
        ));
        for (member, name) in bindings.headers() {
            emit_header_member(ctx, &mut w, member, name)?;
        }
        for (member, prefix) in bindings.prefix_headers() {
            emit_prefix_headers_member(ctx, &mut w, member, prefix)?;
        }
    } else {
        w.line(format!(
            "let builder = http::Request::builder().method(\"{}\").uri(uri);",
            http.method
        ));
    }

    w.blank();
    if let Some(member) = payload {
        emit_payload(ctx, &mut w, member, payload_kind.unwrap(), streaming_payload)?;
    } else if let Some(descriptor) = &descriptor {
        w.line(format!("let body_fields = {}.fields();", const_name));
        w.open("body_serializer");
        w.open(format!(".serialize_struct(&{}, |ser| {{", const_name));
        for (index, member) in descriptor
            .fields
            .iter()
            .map(|f| f.index)
            .zip(document_members.iter())
        {
            let field_name = ctx.symbols.member_name(member);
            w.open(format!("if let Some(inner) = &input.{} {{", field_name));
            emit_value_write(ctx, &mut w, member, &format!("&body_fields[{}]", index), "inner")?;
            w.close("}");
        }
        w.line("Ok(())");
        w.close("})");
        w.line(".map_err(|err| BuildError::Serialization(err.to_string()))?;");
        w.dedent();
        w.open("let body = Body::from_bytes(");
        w.line("body_serializer");
        w.line("    .finish()");
        w.line("    .map_err(|err| BuildError::Serialization(err.to_string()))?,");
        w.close(");");
    } else {
        w.line("let body = Body::empty();");
    }

    w.blank();
    w.line("builder");
    w.line("    .body(body)");
    w.line("    .map_err(|err| BuildError::InvalidRequest(err.to_string()))");
    w.close("}");

    Ok(SourceUnit {
        name: format!("ser_{}", op_stem),
        shape: op.id.clone(),
        content: w.finish(),
    })
}

/// Streaming applies when the member or its target blob carries the trait.
fn is_streaming(model: &Model, member: &Member) -> bool {
    if member.traits.contains(TraitKind::Streaming) {
        return true;
    }
    matches!(
        model.get(&member.target),
        Some(shape) if shape.traits().contains(TraitKind::Streaming)
    )
}

fn emit_static_path(w: &mut CodeWriter, uri: &UriTemplate) {
    let mut path = String::new();
    for segment in uri.segments() {
        if let PathSegment::Literal(text) = segment {
            path.push('/');
            path.push_str(text);
        }
    }
    if path.is_empty() {
        path.push('/');
    }
    w.line(format!("uri.push_str(\"{}\");", path));
}

fn emit_query_literals_only(w: &mut CodeWriter, uri: &UriTemplate) {
    if uri.query_literals().is_empty() {
        return;
    }
    w.blank();
    w.line("let mut query = smithy_httpbind::query::QueryWriter::new();");
    emit_query_literal_pushes(w, uri);
    w.line("uri.push_str(&query.finish());");
}

/// Literal constants are percent-encoded at generation time and appended
/// unconditionally, empty values included.
fn emit_query_literal_pushes(w: &mut CodeWriter, uri: &UriTemplate) {
    for (key, value) in uri.query_literals() {
        let key = query::fmt_string(key);
        match value {
            None => w.line(format!("query.push_kv(\"{}\", \"\");", key)),
            Some(value) if value.is_empty() => {
                w.line(format!("query.push_empty_value(\"{}\");", key))
            }
            Some(value) => w.line(format!(
                "query.push_kv(\"{}\", \"{}\");",
                key,
                query::fmt_string(value)
            )),
        }
    }
}

fn emit_label(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    member: &Member,
    greedy: bool,
) -> Result<(), Error> {
    let var = ctx.symbols.member_name(member);
    w.line(format!("let {} = input", var));
    w.line(format!("    .{}", var));
    w.line("    .as_ref()");
    w.line(format!(
        "    .ok_or_else(|| BuildError::missing_field(\"{}\"))?;",
        member.name
    ));
    match ctx.model.kind_of(&member.target)? {
        ShapeKind::String => {
            w.line(format!(
                "uri.push_str(&smithy_httpbind::label::fmt_string({}, {}));",
                var, greedy
            ));
        }
        ShapeKind::Enum => {
            w.line(format!(
                "uri.push_str(&smithy_httpbind::label::fmt_string({}.as_str(), {}));",
                var, greedy
            ));
        }
        ShapeKind::Timestamp => {
            let format = timestamp::resolve(
                &member.traits,
                &BindingLocation::Label { greedy },
                ctx.settings.default_timestamp_format,
            );
            w.line(format!("let {} = {}", var, var));
            w.line(format!("    .fmt({})", format_token(format)));
            w.line(format!(
                "    .map_err(|err| BuildError::invalid_field(\"{}\", err.to_string()))?;",
                member.name
            ));
            w.line(format!(
                "uri.push_str(&smithy_httpbind::label::fmt_string(&{}, {}));",
                var, greedy
            ));
        }
        kind if kind.is_scalar() => {
            w.line(format!(
                "uri.push_str(&smithy_httpbind::label::fmt_string(&{}.to_string(), {}));",
                var, greedy
            ));
        }
        _ => {
            return Err(Error::UnsupportedBinding {
                shape: member.target.clone(),
                member: member.name.clone(),
                location: "a path label",
                target: member.target.clone(),
            })
        }
    }
    Ok(())
}

fn emit_query_member(
    ctx: &GenerationContext<'_>,
    w: &mut CodeWriter,
    member: &Member,
    key: &str,
) -> Result<(), Error> {
    let var = ctx.symbols.member_name(member);
    let key = query::fmt_string(key);
    match ctx.model.kind_of(&member.target)? {
        ShapeKind::String => {
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.open("if !inner.is_empty() {");
            w.line(format!(
                "query.push_kv(\"{}\", &smithy_httpbind::query::fmt_string(inner));",
                key
            ));
            w.close("}");
            w.close("}");
        }
        ShapeKind::Enum => {
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line(format!(
                "query.push_kv(\"{}\", &smithy_httpbind::query::fmt_string(inner.as_str()));",
                key
            ));
            w.close("}");
        }
        ShapeKind::Timestamp => {
            let format = timestamp::resolve(
                &member.traits,
                &BindingLocation::Query(key.to_string()),
                ctx.settings.default_timestamp_format,
            );
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line("let value = inner");
            w.line(format!("    .fmt({})", format_token(format)));
            w.line(format!(
                "    .map_err(|err| BuildError::invalid_field(\"{}\", err.to_string()))?;",
                member.name
            ));
            w.line(format!(
                "query.push_kv(\"{}\", &smithy_httpbind::query::fmt_string(&value));",
                key
            ));
            w.close("}");
        }
        ShapeKind::List => {
            let element = match ctx.model.expect(&member.target)? {
                Shape::List(list) => list.member.clone(),
                _ => unreachable!("kind checked above"),
            };
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.open("for item in inner {");
            match ctx.model.kind_of(&element.target)? {
                ShapeKind::String => w.line(format!(
                    "query.push_kv(\"{}\", &smithy_httpbind::query::fmt_string(item));",
                    key
                )),
                ShapeKind::Enum => w.line(format!(
                    "query.push_kv(\"{}\", &smithy_httpbind::query::fmt_string(item.as_str()));",
                    key
                )),
                ShapeKind::Timestamp => {
                    let format = timestamp::resolve(
                        &element.traits,
                        &BindingLocation::Query(key.to_string()),
                        ctx.settings.default_timestamp_format,
                    );
                    w.line("let value = item");
                    w.line(format!("    .fmt({})", format_token(format)));
                    w.line(format!(
                        "    .map_err(|err| BuildError::invalid_field(\"{}\", err.to_string()))?;",
                        member.name
                    ));
                    w.line(format!(
                        "query.push_kv(\"{}\", &smithy_httpbind::query::fmt_string(&value));",
                        key
                    ));
                }
                kind if kind.is_scalar() => w.line(format!(
                    "query.push_kv(\"{}\", &item.to_string());",
                    key
                )),
                _ => {
                    return Err(Error::UnsupportedBinding {
                        shape: member.target.clone(),
                        member: member.name.clone(),
                        location: "a query parameter",
                        target: element.target.clone(),
                    })
                }
            }
            w.close("}");
            w.close("}");
        }
        kind if kind.is_scalar() => {
            // numbers and booleans need no percent-encoding
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line(format!("query.push_kv(\"{}\", &inner.to_string());", key));
            w.close("}");
        }
        _ => {
            return Err(Error::UnsupportedBinding {
                shape: member.target.clone(),
                member: member.name.clone(),
                location: "a query parameter",
                target: member.target.clone(),
            })
        }
    }
    Ok(())
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
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line(format!("builder = builder.header(\"{}\", inner.as_str());", name));
            w.close("}");
        }
        ShapeKind::Enum => {
            // the enum's underlying wire value, not its display name
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line(format!("builder = builder.header(\"{}\", inner.as_str());", name));
            w.close("}");
        }
        ShapeKind::Timestamp => {
            let format = timestamp::resolve(
                &member.traits,
                &BindingLocation::Header(name.to_string()),
                ctx.settings.default_timestamp_format,
            );
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line("let value = inner");
            w.line(format!("    .fmt({})", format_token(format)));
            w.line(format!(
                "    .map_err(|err| BuildError::invalid_field(\"{}\", err.to_string()))?;",
                member.name
            ));
            w.line(format!("builder = builder.header(\"{}\", value);", name));
            w.close("}");
        }
        ShapeKind::List => {
            let element = match ctx.model.expect(&member.target)? {
                Shape::List(list) => list.member.clone(),
                _ => unreachable!("kind checked above"),
            };
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line("let mut parts = Vec::new();");
            w.open("for item in inner {");
            match ctx.model.kind_of(&element.target)? {
                ShapeKind::String => {
                    w.line("parts.push(smithy_httpbind::header::quote_value(item));")
                }
                ShapeKind::Enum => {
                    w.line("parts.push(smithy_httpbind::header::quote_value(item.as_str()));")
                }
                ShapeKind::Timestamp => {
                    let format = timestamp::resolve(
                        &element.traits,
                        &BindingLocation::Header(name.to_string()),
                        ctx.settings.default_timestamp_format,
                    );
                    w.open("parts.push(");
                    w.line(format!("item.fmt({})", format_token(format)));
                    w.line(format!(
                        "    .map_err(|err| BuildError::invalid_field(\"{}\", err.to_string()))?,",
                        member.name
                    ));
                    w.close(");");
                }
                kind if kind.is_scalar() => w.line("parts.push(item.to_string());"),
                _ => {
                    return Err(Error::UnsupportedBinding {
                        shape: member.target.clone(),
                        member: member.name.clone(),
                        location: "a header",
                        target: element.target.clone(),
                    })
                }
            }
            w.close("}");
            w.line(format!(
                "builder = builder.header(\"{}\", smithy_httpbind::header::join_values(parts));",
                name
            ));
            w.close("}");
        }
        kind if kind.is_scalar() => {
            w.open(format!("if let Some(inner) = &input.{} {{", var));
            w.line(format!(
                "builder = builder.header(\"{}\", inner.to_string());",
                name
            ));
            w.close("}");
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
    w.open(format!("if let Some(inner) = &input.{} {{", var));
    w.open("for (key, value) in inner {");
    match ctx.model.kind_of(&value_member.target)? {
        ShapeKind::String | ShapeKind::Enum => {
            w.line(format!(
                "builder = builder.header(format!(\"{}{{}}\", key), value.as_str());",
                prefix
            ));
        }
        kind if kind.is_scalar() && kind != ShapeKind::Timestamp => {
            w.line(format!(
                "builder = builder.header(format!(\"{}{{}}\", key), value.to_string());",
                prefix
            ));
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
            // pass the stream through unbuffered
            w.open(format!("let body = match input.{} {{", var));
            w.line("Some(inner) => Body::Stream(inner),");
            w.line("None => Body::empty(),");
            w.close("};");
        }
        ShapeKind::Blob => {
            w.open(format!("let body = match input.{} {{", var));
            w.line("Some(inner) => Body::from_bytes(inner.into_inner()),");
            w.line("None => Body::empty(),");
            w.close("};");
        }
        ShapeKind::String => {
            // raw bytes of the string, not a document encoding
            w.open(format!("let body = match input.{} {{", var));
            w.line("Some(inner) => Body::from_bytes(inner.into_bytes()),");
            w.line("None => Body::empty(),");
            w.close("};");
        }
        ShapeKind::Enum => {
            w.open(format!("let body = match input.{} {{", var));
            w.line("Some(inner) => Body::from_bytes(inner.as_str().as_bytes().to_vec()),");
            w.line("None => Body::empty(),");
            w.close("};");
        }
        ShapeKind::Structure | ShapeKind::Union => {
            let unit = serde_unit_name(ctx, &member.target);
            let stem = ctx.symbols.fn_stem(&member.target);
            let const_name = ctx.symbols.const_stem(&member.target);
            w.open(format!("let body = match &input.{} {{", var));
            w.open("Some(inner) => {");
            w.open("body_serializer");
            w.open(format!(".serialize_struct(&crate::{}::{}, |ser| {{", unit, const_name));
            w.line(format!("crate::{}::serialize_{}_fields(inner, ser)", unit, stem));
            w.close("})");
            w.line(".map_err(|err| BuildError::Serialization(err.to_string()))?;");
            w.dedent();
            w.open("Body::from_bytes(");
            w.line("body_serializer");
            w.line("    .finish()");
            w.line("    .map_err(|err| BuildError::Serialization(err.to_string()))?,");
            w.close(")");
            w.close("}");
            w.line("None => Body::empty(),");
            w.close("};");
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
