/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Formatting for query string keys and values.

use crate::instant::{Format, FormatError, Instant};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn fmt_string<T: AsRef<str>>(t: T) -> String {
    utf8_percent_encode(t.as_ref(), QUERY).to_string()
}

pub fn fmt_timestamp(t: &Instant, format: Format) -> Result<String, FormatError> {
    Ok(fmt_string(t.fmt(format)?))
}

/// Assembles a query string from percent-encoded pairs.
///
/// A pair with an empty value renders as a bare key (`?flag`), matching how
/// literal query constants from the path template are carried.
#[derive(Debug, Default)]
pub struct QueryWriter {
    out: String,
}

impl QueryWriter {
    pub fn new() -> Self {
        QueryWriter::default()
    }

    /// Append a pair whose key and value are already percent-encoded.
    pub fn push_kv(&mut self, key: &str, value: &str) {
        self.out.push(if self.out.is_empty() { '?' } else { '&' });
        self.out.push_str(key);
        if !value.is_empty() {
            self.out.push('=');
            self.out.push_str(value);
        }
    }

    /// Append a pair with an explicitly empty value (`k=`).
    pub fn push_empty_value(&mut self, key: &str) {
        self.out.push(if self.out.is_empty() { '?' } else { '&' });
        self.out.push_str(key);
        self.out.push('=');
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod test {
    use super::{fmt_string, QueryWriter};
    use crate::instant::{Format, Instant};

    #[test]
    fn encodes_reserved() {
        assert_eq!(fmt_string("a&b=c"), "a%26b%3Dc");
        assert_eq!(fmt_string("hello world"), "hello%20world");
    }

    #[test]
    fn timestamp_query_value() {
        let instant = Instant::from_epoch_seconds(1577836800);
        assert_eq!(
            super::fmt_timestamp(&instant, Format::DateTime).unwrap(),
            "2020-01-01T00%3A00%3A00Z"
        );
    }

    #[test]
    fn writer_builds_query() {
        let mut writer = QueryWriter::new();
        writer.push_kv("qtime", "2020-01-01T00%3A00%3A00Z");
        writer.push_kv("flag", "");
        writer.push_empty_value("empty");
        assert_eq!(
            writer.finish(),
            "?qtime=2020-01-01T00%3A00%3A00Z&flag&empty="
        );
    }

    #[test]
    fn empty_writer_is_empty() {
        assert_eq!(QueryWriter::new().finish(), "");
    }
}
