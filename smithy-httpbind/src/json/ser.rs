/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::escape::escape_string;
use super::JsonError;
use crate::schema::{FieldDescriptor, ObjectDescriptor, StructSerializer};

#[derive(Debug)]
enum Scope {
    Struct { started: bool },
    List { started: bool },
    Map { started: bool, pending_value: bool },
}

/// Writes descriptor-tagged fields as compact JSON.
#[derive(Debug, Default)]
pub struct JsonSerializer {
    out: String,
    scopes: Vec<Scope>,
}

impl JsonSerializer {
    pub fn new() -> Self {
        JsonSerializer::default()
    }

    /// Position the writer for a new value: emit the separating comma and,
    /// in a struct scope, the field's key. Map values must have been keyed
    /// via `entry_key` first.
    fn begin_value(&mut self, field: &FieldDescriptor) -> Result<(), JsonError> {
        match self.scopes.last_mut() {
            None => Ok(()),
            Some(Scope::Struct { started }) => {
                if *started {
                    self.out.push(',');
                }
                *started = true;
                self.out.push('"');
                self.out.push_str(&escape_string(field.name()));
                self.out.push_str("\":");
                Ok(())
            }
            Some(Scope::List { started }) => {
                if *started {
                    self.out.push(',');
                }
                *started = true;
                Ok(())
            }
            Some(Scope::Map { pending_value, .. }) => {
                if !*pending_value {
                    return Err(JsonError::MissingEntryKey);
                }
                *pending_value = false;
                Ok(())
            }
        }
    }

    fn push_scope(&mut self, open: char, scope: Scope) {
        self.out.push(open);
        self.scopes.push(scope);
    }

    fn pop_scope(&mut self, close: char) {
        self.scopes.pop();
        self.out.push(close);
    }
}

impl StructSerializer for JsonSerializer {
    type Output = Vec<u8>;
    type Error = JsonError;

    fn serialize_struct<F>(
        &mut self,
        _descriptor: &ObjectDescriptor,
        fields: F,
    ) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.push_scope('{', Scope::Struct { started: false });
        fields(self)?;
        self.pop_scope('}');
        Ok(())
    }

    fn field_struct<F>(
        &mut self,
        field: &FieldDescriptor,
        _descriptor: &ObjectDescriptor,
        fields: F,
    ) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.begin_value(field)?;
        self.push_scope('{', Scope::Struct { started: false });
        fields(self)?;
        self.pop_scope('}');
        Ok(())
    }

    fn field_list<F>(&mut self, field: &FieldDescriptor, elements: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.begin_value(field)?;
        self.push_scope('[', Scope::List { started: false });
        elements(self)?;
        self.pop_scope(']');
        Ok(())
    }

    fn field_map<F>(&mut self, field: &FieldDescriptor, entries: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.begin_value(field)?;
        self.push_scope(
            '{',
            Scope::Map {
                started: false,
                pending_value: false,
            },
        );
        entries(self)?;
        self.pop_scope('}');
        Ok(())
    }

    fn entry_key(&mut self, key: &str) -> Result<(), Self::Error> {
        match self.scopes.last_mut() {
            Some(Scope::Map {
                started,
                pending_value,
            }) => {
                if *pending_value {
                    return Err(JsonError::MissingEntryKey);
                }
                if *started {
                    self.out.push(',');
                }
                *started = true;
                *pending_value = true;
            }
            _ => return Err(JsonError::MissingEntryKey),
        }
        self.out.push('"');
        self.out.push_str(&escape_string(key));
        self.out.push_str("\":");
        Ok(())
    }

    fn write_boolean(&mut self, field: &FieldDescriptor, value: bool) -> Result<(), Self::Error> {
        self.begin_value(field)?;
        self.out.push_str(if value { "true" } else { "false" });
        Ok(())
    }

    fn write_byte(&mut self, field: &FieldDescriptor, value: i8) -> Result<(), Self::Error> {
        self.write_long(field, value as i64)
    }

    fn write_short(&mut self, field: &FieldDescriptor, value: i16) -> Result<(), Self::Error> {
        self.write_long(field, value as i64)
    }

    fn write_integer(&mut self, field: &FieldDescriptor, value: i32) -> Result<(), Self::Error> {
        self.write_long(field, value as i64)
    }

    fn write_long(&mut self, field: &FieldDescriptor, value: i64) -> Result<(), Self::Error> {
        self.begin_value(field)?;
        self.out.push_str(itoa::Buffer::new().format(value));
        Ok(())
    }

    fn write_float(&mut self, field: &FieldDescriptor, value: f32) -> Result<(), Self::Error> {
        self.write_double(field, value as f64)
    }

    fn write_double(&mut self, field: &FieldDescriptor, value: f64) -> Result<(), Self::Error> {
        self.begin_value(field)?;
        if value.is_nan() || value.is_infinite() {
            // JSON has no non-finite numbers; match serde_json
            self.out.push_str("null");
        } else {
            self.out.push_str(ryu::Buffer::new().format_finite(value));
        }
        Ok(())
    }

    fn write_string(&mut self, field: &FieldDescriptor, value: &str) -> Result<(), Self::Error> {
        self.begin_value(field)?;
        self.out.push('"');
        self.out.push_str(&escape_string(value));
        self.out.push('"');
        Ok(())
    }

    fn write_raw(&mut self, field: &FieldDescriptor, value: &str) -> Result<(), Self::Error> {
        self.begin_value(field)?;
        self.out.push_str(value);
        Ok(())
    }

    fn write_null(&mut self, field: &FieldDescriptor) -> Result<(), Self::Error> {
        self.begin_value(field)?;
        self.out.push_str("null");
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, Self::Error> {
        if !self.scopes.is_empty() {
            return Err(JsonError::UnclosedScope);
        }
        Ok(self.out.into_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::JsonSerializer;
    use crate::schema::{FieldDescriptor, ObjectDescriptor, SerKind, StructSerializer};

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("name", SerKind::String, 0),
        FieldDescriptor::new("count", SerKind::Integer, 1),
        FieldDescriptor::new("tags", SerKind::List, 2),
        FieldDescriptor::new("attrs", SerKind::Map, 3),
        FieldDescriptor::new("nested", SerKind::Struct, 4),
    ];
    const DESCRIPTOR: ObjectDescriptor = ObjectDescriptor::new("test#Widget", FIELDS);

    #[test]
    fn writes_struct_fields() {
        let mut ser = JsonSerializer::new();
        ser.serialize_struct(&DESCRIPTOR, |s| {
            s.write_string(&FIELDS[0], "widget")?;
            s.write_integer(&FIELDS[1], 7)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            String::from_utf8(ser.finish().unwrap()).unwrap(),
            r#"{"name":"widget","count":7}"#
        );
    }

    #[test]
    fn writes_nested_scopes() {
        let mut ser = JsonSerializer::new();
        ser.serialize_struct(&DESCRIPTOR, |s| {
            s.field_list(&FIELDS[2], |s| {
                s.write_string(&FIELDS[2], "a")?;
                s.write_string(&FIELDS[2], "b")?;
                Ok(())
            })?;
            s.field_map(&FIELDS[3], |s| {
                s.entry_key("k")?;
                s.write_string(&FIELDS[3], "v")?;
                Ok(())
            })?;
            s.field_struct(&FIELDS[4], &DESCRIPTOR, |s| {
                s.write_boolean(&FIELDS[1], true)?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            String::from_utf8(ser.finish().unwrap()).unwrap(),
            r#"{"tags":["a","b"],"attrs":{"k":"v"},"nested":{"count":true}}"#
        );
    }

    #[test]
    fn raw_values_are_verbatim() {
        let mut ser = JsonSerializer::new();
        ser.serialize_struct(&DESCRIPTOR, |s| s.write_raw(&FIELDS[1], "1576540098.52"))
            .unwrap();
        assert_eq!(
            String::from_utf8(ser.finish().unwrap()).unwrap(),
            r#"{"count":1576540098.52}"#
        );
    }

    #[test]
    fn non_finite_doubles_are_null() {
        let mut ser = JsonSerializer::new();
        ser.serialize_struct(&DESCRIPTOR, |s| s.write_double(&FIELDS[1], f64::NAN))
            .unwrap();
        assert_eq!(
            String::from_utf8(ser.finish().unwrap()).unwrap(),
            r#"{"count":null}"#
        );
    }

    #[test]
    fn map_value_without_key_is_error() {
        let mut ser = JsonSerializer::new();
        let result = ser.serialize_struct(&DESCRIPTOR, |s| {
            s.field_map(&FIELDS[3], |s| s.write_string(&FIELDS[3], "v"))
        });
        assert!(result.is_err());
    }

    #[test]
    fn empty_struct() {
        let mut ser = JsonSerializer::new();
        ser.serialize_struct(&DESCRIPTOR, |_| Ok(())).unwrap();
        assert_eq!(String::from_utf8(ser.finish().unwrap()).unwrap(), "{}");
    }
}
