/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Utilities for reading and writing bound values in HTTP headers.

use crate::instant::{Format, Instant};
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid header value")]
pub struct ParseError;

/// Read all the dates from the header map at `key` according to `format`.
///
/// Separate from [`read_many`] because HTTP-date values contain commas and
/// need `Instant::read`'s terminator-aware splitting.
pub fn many_dates(
    headers: &http::HeaderMap,
    key: &str,
    format: Format,
) -> Result<Vec<Instant>, ParseError> {
    let mut out = vec![];
    for header in headers.get_all(key).iter() {
        let mut remaining = header.to_str().map_err(|_| ParseError)?;
        while !remaining.is_empty() {
            let (value, next) = Instant::read(remaining, format, ',').map_err(|_| ParseError)?;
            out.push(value);
            remaining = next;
        }
    }
    Ok(out)
}

/// Read many comma/header delimited values for `FromStr` types.
pub fn read_many<T>(headers: &http::HeaderMap, key: &str) -> Result<Vec<T>, ParseError>
where
    T: FromStr,
{
    let mut out = vec![];
    for header in headers.get_all(key).iter() {
        let value = header.to_str().map_err(|_| ParseError)?;
        for part in split_list_header(value) {
            out.push(T::from_str(part.trim()).map_err(|_| ParseError)?);
        }
    }
    Ok(out)
}

/// Read many comma/header delimited string values, honoring quoting.
pub fn read_many_strings(headers: &http::HeaderMap, key: &str) -> Result<Vec<String>, ParseError> {
    let mut out = vec![];
    for header in headers.get_all(key).iter() {
        let value = header.to_str().map_err(|_| ParseError)?;
        for part in split_list_header(value) {
            out.push(unquote(part.trim())?);
        }
    }
    Ok(out)
}

/// Read a single scalar value from the header map, if present.
pub fn read_one<T>(headers: &http::HeaderMap, key: &str) -> Result<Option<T>, ParseError>
where
    T: FromStr,
{
    match headers.get(key) {
        None => Ok(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| ParseError)?;
            Ok(Some(T::from_str(value.trim()).map_err(|_| ParseError)?))
        }
    }
}

/// Quote a list-header element if it contains a delimiter or quote.
pub fn quote_value(value: &str) -> String {
    if value.is_empty()
        || value.contains(',')
        || value.contains('"')
        || value.starts_with(' ')
        || value.ends_with(' ')
    {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('"');
        for c in value.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
        out
    } else {
        value.to_string()
    }
}

/// Join already-quoted list-header elements per the HTTP list rules.
pub fn join_values<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for value in values {
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(value.as_ref());
    }
    out
}

/// Iterate `(suffix, value)` pairs for every header whose name starts with
/// `prefix`, stripping the prefix from the name.
pub fn headers_for_prefix<'a>(
    headers: &'a http::HeaderMap,
    prefix: &'a str,
) -> impl Iterator<Item = (String, &'a http::HeaderValue)> {
    headers.iter().filter_map(move |(name, value)| {
        let name = name.as_str();
        name.strip_prefix(prefix)
            .filter(|suffix| !suffix.is_empty())
            .map(|suffix| (suffix.to_string(), value))
    })
}

fn split_list_header(value: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unquote(value: &str) -> Result<String, ParseError> {
    if !value.starts_with('"') {
        return Ok(value.to_string());
    }
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError)?;
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        match c {
            _ if escaped => {
                out.push(c);
                escaped = false;
            }
            '\\' => escaped = true,
            '"' => return Err(ParseError),
            _ => out.push(c),
        }
    }
    if escaped {
        return Err(ParseError);
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use http::header::{HeaderMap, HeaderName, HeaderValue};

    fn header_map(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(
                HeaderName::from_static(k),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        map
    }

    #[test]
    fn read_many_numbers() {
        let headers = header_map(&[("x-count", "1,2"), ("x-count", "3")]);
        let values: Vec<i32> = read_many(&headers, "x-count").unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn read_many_strings_with_quoting() {
        let headers = header_map(&[("x-names", r#"foo, "bar, baz", "say \"hi\"""#)]);
        let values = read_many_strings(&headers, "x-names").unwrap();
        assert_eq!(values, vec!["foo", "bar, baz", "say \"hi\""]);
    }

    #[test]
    fn read_one_absent_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(read_one::<i32>(&headers, "x-missing").unwrap(), None);
    }

    #[test]
    fn read_one_invalid_is_error() {
        let headers = header_map(&[("x-count", "zebra")]);
        assert!(read_one::<i32>(&headers, "x-count").is_err());
    }

    #[test]
    fn many_dates_http_date() {
        let headers = header_map(&[(
            "x-dates",
            "Mon, 16 Dec 2019 23:48:18 GMT, Tue, 17 Dec 2019 23:48:18 GMT",
        )]);
        let values = many_dates(&headers, "x-dates", crate::instant::Format::HttpDate).unwrap();
        assert_eq!(
            values,
            vec![
                crate::Instant::from_epoch_seconds(1576540098),
                crate::Instant::from_epoch_seconds(1576626498)
            ]
        );
    }

    #[test]
    fn quote_and_join() {
        let joined = join_values(["a", "b, c", "d\"e"].map(|v| quote_value(v)));
        assert_eq!(joined, r#"a, "b, c", "d\"e""#);
    }

    #[test]
    fn prefix_headers() {
        let headers = header_map(&[
            ("x-meta-color", "red"),
            ("x-meta-size", "large"),
            ("x-other", "ignored"),
            ("x-meta-", "empty suffix ignored"),
        ]);
        let mut collected: Vec<(String, String)> = headers_for_prefix(&headers, "x-meta-")
            .map(|(k, v)| (k, v.to_str().unwrap().to_string()))
            .collect();
        collected.sort();
        assert_eq!(
            collected,
            vec![
                ("color".to_string(), "red".to_string()),
                ("size".to_string(), "large".to_string())
            ]
        );
    }
}
