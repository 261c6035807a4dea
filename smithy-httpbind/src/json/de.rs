/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::escape::unescape_string;
use super::JsonError;
use crate::schema::{FieldDescriptor, ObjectDescriptor, StructDeserializer};

/// Reads compact or whitespace-formatted JSON, dispatching struct fields by
/// descriptor index and skipping fields the descriptor does not know.
#[derive(Debug)]
pub struct JsonDeserializer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> JsonDeserializer<'a> {
    pub fn new(input: &'a [u8]) -> Result<Self, JsonError> {
        let input = std::str::from_utf8(input).map_err(|_| JsonError::InvalidUtf8)?;
        Ok(JsonDeserializer { input, pos: 0 })
    }

    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
        self.pos += rest.len() - trimmed.len();
    }

    fn peek_byte(&mut self) -> Result<u8, JsonError> {
        self.skip_ws();
        self.input
            .as_bytes()
            .get(self.pos)
            .copied()
            .ok_or(JsonError::UnexpectedEof)
    }

    fn expect_byte(&mut self, expected: u8, what: &'static str) -> Result<(), JsonError> {
        let found = self.peek_byte()?;
        if found != expected {
            return Err(JsonError::UnexpectedToken {
                expected: what,
                found: found as char,
                offset: self.pos,
            });
        }
        self.pos += 1;
        Ok(())
    }

    /// Read `true`, `false`, `null`, or a number as its literal text.
    fn read_scalar_lexeme(&mut self) -> Result<&'a str, JsonError> {
        let start_byte = self.peek_byte()?;
        let start = self.pos;
        match start_byte {
            b't' | b'f' | b'n' => {
                let keyword = match start_byte {
                    b't' => "true",
                    b'f' => "false",
                    _ => "null",
                };
                if self.input[start..].starts_with(keyword) {
                    self.pos += keyword.len();
                    Ok(&self.input[start..self.pos])
                } else {
                    Err(JsonError::UnexpectedToken {
                        expected: "a JSON keyword",
                        found: start_byte as char,
                        offset: start,
                    })
                }
            }
            b'-' | b'0'..=b'9' => {
                let bytes = self.input.as_bytes();
                let mut end = self.pos;
                while end < bytes.len()
                    && matches!(bytes[end], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
                {
                    end += 1;
                }
                self.pos = end;
                Ok(&self.input[start..end])
            }
            found => Err(JsonError::UnexpectedToken {
                expected: "a scalar value",
                found: found as char,
                offset: start,
            }),
        }
    }

    /// Read a quoted string token and unescape it.
    fn read_string_token(&mut self) -> Result<String, JsonError> {
        let start = self.pos;
        self.expect_byte(b'"', "`\"`")?;
        let bytes = self.input.as_bytes();
        let mut end = self.pos;
        let mut escaped = false;
        loop {
            let byte = *bytes.get(end).ok_or(JsonError::UnexpectedEof)?;
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => break,
                _ => {}
            }
            end += 1;
        }
        let raw = &self.input[self.pos..end];
        self.pos = end + 1;
        unescape_string(raw)
            .map(|cow| cow.into_owned())
            .ok_or(JsonError::InvalidEscape { offset: start })
    }

    fn parse_number<T: std::str::FromStr>(&mut self) -> Result<T, JsonError> {
        let offset = self.pos;
        let lexeme = self.read_scalar_lexeme()?;
        lexeme
            .parse()
            .map_err(|_| JsonError::InvalidNumber { offset })
    }

    /// Ensure the whole input was consumed.
    pub fn finish(mut self) -> Result<(), JsonError> {
        self.skip_ws();
        match self.input.as_bytes().get(self.pos) {
            None => Ok(()),
            Some(&found) => Err(JsonError::UnexpectedToken {
                expected: "end of input",
                found: found as char,
                offset: self.pos,
            }),
        }
    }
}

impl<'a> StructDeserializer for JsonDeserializer<'a> {
    type Error = JsonError;

    fn deserialize_struct<T, F>(
        &mut self,
        descriptor: &ObjectDescriptor,
        state: T,
        mut consumer: F,
    ) -> Result<T, Self::Error>
    where
        F: FnMut(T, &FieldDescriptor, &mut Self) -> Result<T, Self::Error>,
    {
        let mut state = state;
        self.expect_byte(b'{', "`{`")?;
        if self.peek_byte()? == b'}' {
            self.pos += 1;
            return Ok(state);
        }
        loop {
            let key = self.read_string_token()?;
            self.expect_byte(b':', "`:`")?;
            match descriptor.field_by_name(&key) {
                Some(field) => state = consumer(state, field, self)?,
                // unknown field: forward compatibility, skip it
                None => self.skip_value()?,
            }
            match self.peek_byte()? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    return Ok(state);
                }
                found => {
                    return Err(JsonError::UnexpectedToken {
                        expected: "`,` or `}`",
                        found: found as char,
                        offset: self.pos,
                    })
                }
            }
        }
    }

    fn deserialize_list<T, F>(&mut self, state: T, mut consumer: F) -> Result<T, Self::Error>
    where
        F: FnMut(T, &mut Self) -> Result<T, Self::Error>,
    {
        let mut state = state;
        self.expect_byte(b'[', "`[`")?;
        if self.peek_byte()? == b']' {
            self.pos += 1;
            return Ok(state);
        }
        loop {
            state = consumer(state, self)?;
            match self.peek_byte()? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    return Ok(state);
                }
                found => {
                    return Err(JsonError::UnexpectedToken {
                        expected: "`,` or `]`",
                        found: found as char,
                        offset: self.pos,
                    })
                }
            }
        }
    }

    fn deserialize_map<T, F>(&mut self, state: T, mut consumer: F) -> Result<T, Self::Error>
    where
        F: FnMut(T, String, &mut Self) -> Result<T, Self::Error>,
    {
        let mut state = state;
        self.expect_byte(b'{', "`{`")?;
        if self.peek_byte()? == b'}' {
            self.pos += 1;
            return Ok(state);
        }
        loop {
            let key = self.read_string_token()?;
            self.expect_byte(b':', "`:`")?;
            state = consumer(state, key, self)?;
            match self.peek_byte()? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    return Ok(state);
                }
                found => {
                    return Err(JsonError::UnexpectedToken {
                        expected: "`,` or `}`",
                        found: found as char,
                        offset: self.pos,
                    })
                }
            }
        }
    }

    fn read_boolean(&mut self, _field: &FieldDescriptor) -> Result<bool, Self::Error> {
        let offset = self.pos;
        match self.read_scalar_lexeme()? {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(JsonError::UnexpectedToken {
                expected: "`true` or `false`",
                found: self.input.as_bytes()[offset] as char,
                offset,
            }),
        }
    }

    fn read_byte(&mut self, _field: &FieldDescriptor) -> Result<i8, Self::Error> {
        self.parse_number()
    }

    fn read_short(&mut self, _field: &FieldDescriptor) -> Result<i16, Self::Error> {
        self.parse_number()
    }

    fn read_integer(&mut self, _field: &FieldDescriptor) -> Result<i32, Self::Error> {
        self.parse_number()
    }

    fn read_long(&mut self, _field: &FieldDescriptor) -> Result<i64, Self::Error> {
        self.parse_number()
    }

    fn read_float(&mut self, _field: &FieldDescriptor) -> Result<f32, Self::Error> {
        self.parse_number()
    }

    fn read_double(&mut self, _field: &FieldDescriptor) -> Result<f64, Self::Error> {
        self.parse_number()
    }

    fn read_string(&mut self, _field: &FieldDescriptor) -> Result<String, Self::Error> {
        self.read_string_token()
    }

    fn read_raw(&mut self, _field: &FieldDescriptor) -> Result<String, Self::Error> {
        if self.peek_byte()? == b'"' {
            self.read_string_token()
        } else {
            Ok(self.read_scalar_lexeme()?.to_string())
        }
    }

    fn is_null(&mut self) -> bool {
        matches!(self.peek_byte(), Ok(b'n'))
            && self.input[self.pos..].starts_with("null")
    }

    fn skip_value(&mut self) -> Result<(), Self::Error> {
        match self.peek_byte()? {
            b'"' => {
                self.read_string_token()?;
            }
            b'{' => {
                self.pos += 1;
                if self.peek_byte()? == b'}' {
                    self.pos += 1;
                    return Ok(());
                }
                loop {
                    self.read_string_token()?;
                    self.expect_byte(b':', "`:`")?;
                    self.skip_value()?;
                    match self.peek_byte()? {
                        b',' => self.pos += 1,
                        b'}' => {
                            self.pos += 1;
                            return Ok(());
                        }
                        found => {
                            return Err(JsonError::UnexpectedToken {
                                expected: "`,` or `}`",
                                found: found as char,
                                offset: self.pos,
                            })
                        }
                    }
                }
            }
            b'[' => {
                self.pos += 1;
                if self.peek_byte()? == b']' {
                    self.pos += 1;
                    return Ok(());
                }
                loop {
                    self.skip_value()?;
                    match self.peek_byte()? {
                        b',' => self.pos += 1,
                        b']' => {
                            self.pos += 1;
                            return Ok(());
                        }
                        found => {
                            return Err(JsonError::UnexpectedToken {
                                expected: "`,` or `]`",
                                found: found as char,
                                offset: self.pos,
                            })
                        }
                    }
                }
            }
            _ => {
                self.read_scalar_lexeme()?;
            }
        }
        Ok(())
    }
}
