/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Descriptor-driven (de)serialization interfaces.
//!
//! Generated code never names a concrete wire format. Structured bodies are
//! written through [`StructSerializer`] and read through
//! [`StructDeserializer`], with every field identified by a
//! [`FieldDescriptor`]. The deserializer dispatches on the descriptor's
//! stable integer index, so a serializer/deserializer pair for the same
//! shape must be generated from the same descriptor set.

use std::error::Error;

/// How a field is written to the serial format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SerKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Blob,
    Timestamp,
    Document,
    Struct,
    Union,
    List,
    Map,
}

/// Metadata for one field of a structure or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: SerKind,
    index: usize,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: SerKind, index: usize) -> Self {
        FieldDescriptor { name, kind, index }
    }

    /// The field's wire name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> SerKind {
        self.kind
    }

    /// Stable dispatch index. Identical between a shape's serializer and
    /// deserializer.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// The ordered field set for one structure or union shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectDescriptor {
    shape: &'static str,
    fields: &'static [FieldDescriptor],
}

impl ObjectDescriptor {
    pub const fn new(shape: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        ObjectDescriptor { shape, fields }
    }

    /// Identity of the shape this descriptor was generated from.
    pub fn shape(&self) -> &'static str {
        self.shape
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    pub fn field(&self, index: usize) -> Option<&'static FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Serializes a structured body one descriptor-tagged field at a time.
///
/// Scalar writes take the field's descriptor; inside a list scope the
/// descriptor's name is ignored, and inside a map scope the key comes from
/// [`entry_key`](StructSerializer::entry_key). Pre-formatted values
/// (timestamps rendered per their resolved format) go through
/// [`write_string`](StructSerializer::write_string) when the encoding is
/// textual or [`write_raw`](StructSerializer::write_raw) when it is a bare
/// serial token such as an epoch-seconds number.
pub trait StructSerializer: Sized {
    type Output;
    /// Pre-formatting a timestamp can fail, and generated field writers
    /// propagate that failure with `?`, so the codec error must absorb it.
    type Error: Error + From<crate::instant::FormatError>;

    /// Serialize a top-level structure or union.
    fn serialize_struct<F>(
        &mut self,
        descriptor: &ObjectDescriptor,
        fields: F,
    ) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Serialize a structure or union valued field.
    fn field_struct<F>(
        &mut self,
        field: &FieldDescriptor,
        descriptor: &ObjectDescriptor,
        fields: F,
    ) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Open a list sub-scope for `field` and write its elements.
    fn field_list<F>(&mut self, field: &FieldDescriptor, elements: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Open a map sub-scope for `field` and write its entries.
    fn field_map<F>(&mut self, field: &FieldDescriptor, entries: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Set the key for the next value written inside a map scope.
    fn entry_key(&mut self, key: &str) -> Result<(), Self::Error>;

    fn write_boolean(&mut self, field: &FieldDescriptor, value: bool) -> Result<(), Self::Error>;
    fn write_byte(&mut self, field: &FieldDescriptor, value: i8) -> Result<(), Self::Error>;
    fn write_short(&mut self, field: &FieldDescriptor, value: i16) -> Result<(), Self::Error>;
    fn write_integer(&mut self, field: &FieldDescriptor, value: i32) -> Result<(), Self::Error>;
    fn write_long(&mut self, field: &FieldDescriptor, value: i64) -> Result<(), Self::Error>;
    fn write_float(&mut self, field: &FieldDescriptor, value: f32) -> Result<(), Self::Error>;
    fn write_double(&mut self, field: &FieldDescriptor, value: f64) -> Result<(), Self::Error>;
    fn write_string(&mut self, field: &FieldDescriptor, value: &str) -> Result<(), Self::Error>;

    /// Write an already-formatted serial token verbatim.
    fn write_raw(&mut self, field: &FieldDescriptor, value: &str) -> Result<(), Self::Error>;

    fn write_null(&mut self, field: &FieldDescriptor) -> Result<(), Self::Error>;

    /// Finalize and return the encoded output.
    fn finish(self) -> Result<Self::Output, Self::Error>;
}

/// Deserializes a structured body by dispatching on descriptor indices.
///
/// [`deserialize_struct`](StructDeserializer::deserialize_struct) drives the
/// field loop: each serialized field whose wire name resolves to a
/// descriptor is handed to the consumer; fields with no matching descriptor
/// are skipped without decoding. The consumer dispatches on
/// [`FieldDescriptor::index`] and must call
/// [`skip_value`](StructDeserializer::skip_value) for any index it does not
/// populate, leaving the input positioned at the next field.
pub trait StructDeserializer: Sized {
    /// Generated field readers re-parse pre-formatted values (timestamps,
    /// base64 blobs) and propagate those failures with `?`.
    type Error: Error
        + From<crate::instant::ParseError>
        + From<crate::base64::DecodeError>;

    fn deserialize_struct<T, F>(
        &mut self,
        descriptor: &ObjectDescriptor,
        state: T,
        consumer: F,
    ) -> Result<T, Self::Error>
    where
        F: FnMut(T, &FieldDescriptor, &mut Self) -> Result<T, Self::Error>;

    /// Read a list scope, invoking `consumer` once per element.
    fn deserialize_list<T, F>(&mut self, state: T, consumer: F) -> Result<T, Self::Error>
    where
        F: FnMut(T, &mut Self) -> Result<T, Self::Error>;

    /// Read a map scope, invoking `consumer` once per entry with its key.
    fn deserialize_map<T, F>(&mut self, state: T, consumer: F) -> Result<T, Self::Error>
    where
        F: FnMut(T, String, &mut Self) -> Result<T, Self::Error>;

    fn read_boolean(&mut self, field: &FieldDescriptor) -> Result<bool, Self::Error>;
    fn read_byte(&mut self, field: &FieldDescriptor) -> Result<i8, Self::Error>;
    fn read_short(&mut self, field: &FieldDescriptor) -> Result<i16, Self::Error>;
    fn read_integer(&mut self, field: &FieldDescriptor) -> Result<i32, Self::Error>;
    fn read_long(&mut self, field: &FieldDescriptor) -> Result<i64, Self::Error>;
    fn read_float(&mut self, field: &FieldDescriptor) -> Result<f32, Self::Error>;
    fn read_double(&mut self, field: &FieldDescriptor) -> Result<f64, Self::Error>;
    fn read_string(&mut self, field: &FieldDescriptor) -> Result<String, Self::Error>;

    /// Read the next scalar as its literal serial text (used for
    /// pre-formatted values such as epoch-seconds timestamps).
    fn read_raw(&mut self, field: &FieldDescriptor) -> Result<String, Self::Error>;

    /// Whether the next value is the format's null.
    fn is_null(&mut self) -> bool;

    /// Skip the next value without decoding it.
    fn skip_value(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod test {
    use super::{FieldDescriptor, ObjectDescriptor, SerKind};

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("payload1", SerKind::String, 0),
        FieldDescriptor::new("payload2", SerKind::Integer, 1),
        FieldDescriptor::new("payload3", SerKind::Struct, 2),
    ];
    const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor::new("com.example#Payloads", FIELDS);

    #[test]
    fn lookup_by_name_and_index() {
        let field = DESCRIPTOR.field_by_name("payload2").unwrap();
        assert_eq!(field.index(), 1);
        assert_eq!(field.kind(), SerKind::Integer);
        assert_eq!(DESCRIPTOR.field(2).unwrap().name(), "payload3");
        assert!(DESCRIPTOR.field_by_name("payload9").is_none());
        assert!(DESCRIPTOR.field(3).is_none());
    }

    #[test]
    fn descriptor_identity() {
        assert_eq!(DESCRIPTOR.shape(), "com.example#Payloads");
        assert_eq!(DESCRIPTOR.fields().len(), 3);
    }
}
