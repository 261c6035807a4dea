/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! IMF-fixdate (RFC 7231 §7.1.1.1) rendering and parsing.
//!
//! Fractional seconds are not part of the RFC but are accepted and produced
//! to millisecond precision for parity with the other encodings.

use super::{Format, FormatError, Instant, ParseError, NANOS_PER_SECOND};
use chrono::NaiveDateTime;

/// Ok: `Mon, 16 Dec 2019 23:48:18 GMT`
/// Ok: `Mon, 16 Dec 2019 23:48:18.123 GMT`
/// Not Ok: `Mon, 16 Dec 2019 23:48:18.1234 GMT`
pub(super) fn format(instant: &Instant) -> Result<String, FormatError> {
    let datetime = instant.to_chrono().map_err(|_| FormatError {
        format: Format::HttpDate,
    })?;
    let mut out = datetime.format("%a, %d %b %Y %H:%M:%S").to_string();
    if instant.subsecond_nanos != 0 {
        let millis = instant.subsecond_nanos / (NANOS_PER_SECOND / 1000);
        out.push('.');
        out.push_str(&format!("{:03}", millis));
    }
    out.push_str(" GMT");
    Ok(out)
}

pub(super) fn parse(s: &str) -> Result<Instant, ParseError> {
    let format = Format::HttpDate;
    if !s.is_ascii() {
        return Err(ParseError::new(format, "not ascii"));
    }
    let s = s.trim();
    let base = s
        .strip_suffix(" GMT")
        .ok_or_else(|| ParseError::new(format, "missing GMT suffix"))?;
    let (base, nanos) = match base.split_once('.') {
        Some((datetime, fraction)) => {
            if fraction.is_empty()
                || fraction.len() > 3
                || !fraction.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(ParseError::new(format, "invalid fractional seconds"));
            }
            let digits: u32 = fraction
                .parse()
                .expect("validated as 1-3 ascii digits above");
            let nanos = digits * 10u32.pow(9 - fraction.len() as u32);
            (datetime, nanos)
        }
        None => (base, 0),
    };
    let datetime = NaiveDateTime::parse_from_str(base, "%a, %d %b %Y %H:%M:%S")
        .map_err(|_| ParseError::new(format, "invalid IMF-fixdate"))?;
    Ok(Instant::from_secs_and_nanos(
        datetime.and_utc().timestamp(),
        nanos,
    ))
}

#[cfg(test)]
mod test {
    use super::{format, parse};
    use crate::instant::Instant;

    #[test]
    fn format_basic() {
        let instant = Instant::from_epoch_seconds(1576540098);
        assert_eq!(format(&instant).unwrap(), "Mon, 16 Dec 2019 23:48:18 GMT");
    }

    #[test]
    fn parse_basic() {
        assert_eq!(
            parse("Mon, 16 Dec 2019 23:48:18 GMT").unwrap(),
            Instant::from_epoch_seconds(1576540098)
        );
    }

    #[test]
    fn parse_fractional() {
        assert_eq!(
            parse("Mon, 16 Dec 2019 23:48:18.12 GMT").unwrap(),
            Instant::from_secs_and_nanos(1576540098, 120_000_000)
        );
        assert_eq!(
            parse("Mon, 16 Dec 2019 23:48:18.000 GMT").unwrap(),
            Instant::from_epoch_seconds(1576540098)
        );
    }

    #[test]
    fn parse_rejects_excess_precision() {
        assert!(parse("Mon, 16 Dec 2019 23:48:18.1234 GMT").is_err());
        assert!(parse("Mon, 16 Dec 2019 23:48:18. GMT").is_err());
    }

    #[test]
    fn parse_rejects_wrong_weekday() {
        assert!(parse("Tue, 16 Dec 2019 23:48:18 GMT").is_err());
    }

    #[test]
    fn round_trip() {
        for epoch_secs in (0..100_000).step_by(997) {
            let instant = Instant::from_epoch_seconds(epoch_secs);
            let rendered = format(&instant).unwrap();
            assert_eq!(parse(&rendered).unwrap(), instant, "{}", rendered);
        }
    }
}
