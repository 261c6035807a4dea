/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Instant-in-time type with the three wire encodings used by HTTP bindings.

use chrono::{DateTime as ChronoDateTime, SecondsFormat, Utc};

mod http_date;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// An instant in time, stored as seconds (and subsecond nanos) since the
/// Unix epoch. Nanos always count forward from `seconds`, so instants before
/// the epoch round `seconds` down.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Instant {
    seconds: i64,
    subsecond_nanos: u32,
}

/// Wire encodings for [`Instant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// RFC 3339 / ISO-8601 string, e.g. `2020-01-01T00:00:00Z`
    DateTime,
    /// IMF-fixdate, e.g. `Wed, 01 Jan 2020 00:00:00 GMT`
    HttpDate,
    /// Number of seconds since the Unix epoch, e.g. `1576540098.52`
    EpochSeconds,
}

impl Format {
    /// The identifier used for this format in generated code and models.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::DateTime => "date-time",
            Format::HttpDate => "http-date",
            Format::EpochSeconds => "epoch-seconds",
        }
    }
}

/// Error returned when an instant cannot be rendered in a given format.
#[derive(Debug, thiserror::Error)]
#[error("timestamp out of range for {}", .format.as_str())]
pub struct FormatError {
    format: Format,
}

/// Error returned when a string cannot be parsed in a given format.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse timestamp as {}: {}", .format.as_str(), .reason)]
pub struct ParseError {
    format: Format,
    reason: &'static str,
}

impl ParseError {
    fn new(format: Format, reason: &'static str) -> Self {
        ParseError { format, reason }
    }
}

impl Instant {
    pub fn from_epoch_seconds(epoch_seconds: i64) -> Self {
        Instant {
            seconds: epoch_seconds,
            subsecond_nanos: 0,
        }
    }

    pub fn from_secs_and_nanos(seconds: i64, subsecond_nanos: u32) -> Self {
        assert!(
            subsecond_nanos < NANOS_PER_SECOND,
            "subsecond_nanos must be < 1 second"
        );
        Instant {
            seconds,
            subsecond_nanos,
        }
    }

    pub fn from_fractional_seconds(epoch_seconds: i64, fraction: f64) -> Self {
        Instant {
            seconds: epoch_seconds,
            subsecond_nanos: (fraction * NANOS_PER_SECOND as f64) as u32,
        }
    }

    pub fn from_f64(epoch_seconds: f64) -> Self {
        let seconds = epoch_seconds.floor();
        Instant::from_fractional_seconds(seconds as i64, epoch_seconds - seconds)
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.seconds
    }

    pub fn subsecond_nanos(&self) -> u32 {
        self.subsecond_nanos
    }

    pub fn has_nanos(&self) -> bool {
        self.subsecond_nanos != 0
    }

    fn to_chrono(&self) -> Result<ChronoDateTime<Utc>, FormatError> {
        ChronoDateTime::from_timestamp(self.seconds, self.subsecond_nanos)
            .ok_or(FormatError {
                format: Format::DateTime,
            })
    }

    /// Render this instant in `format`.
    pub fn fmt(&self, format: Format) -> Result<String, FormatError> {
        match format {
            Format::DateTime => {
                let rfc3339 = self
                    .to_chrono()?
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true);
                Ok(trim_fraction(rfc3339))
            }
            Format::HttpDate => http_date::format(self),
            Format::EpochSeconds => Ok(self.fmt_epoch_seconds()),
        }
    }

    fn fmt_epoch_seconds(&self) -> String {
        if self.subsecond_nanos == 0 {
            return self.seconds.to_string();
        }
        let (whole, frac) = if self.seconds >= 0 {
            (self.seconds.to_string(), self.subsecond_nanos)
        } else {
            // nanos count forward, so (-2, 500ms) displays as -1.5
            let whole = self.seconds + 1;
            let rendered = if whole == 0 {
                "-0".to_string()
            } else {
                whole.to_string()
            };
            (rendered, NANOS_PER_SECOND - self.subsecond_nanos)
        };
        let digits = format!("{:0>9}", frac);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }

    /// Parse `s` as an instant rendered in `format`.
    pub fn from_str(s: &str, format: Format) -> Result<Self, ParseError> {
        match format {
            Format::DateTime => {
                let parsed = ChronoDateTime::parse_from_rfc3339(s)
                    .map_err(|_| ParseError::new(format, "invalid RFC 3339 date"))?;
                Ok(Instant::from_secs_and_nanos(
                    parsed.timestamp(),
                    parsed.timestamp_subsec_nanos(),
                ))
            }
            Format::HttpDate => http_date::parse(s),
            Format::EpochSeconds => parse_epoch_seconds(s),
        }
    }

    /// Parse one instant from the front of `s`, returning the remainder
    /// after `delim`.
    ///
    /// HTTP-date values themselves contain a comma, so list-header parsing
    /// cannot naively split on the delimiter; this looks for the ` GMT`
    /// terminator instead.
    pub fn read<'a>(
        s: &'a str,
        format: Format,
        delim: char,
    ) -> Result<(Self, &'a str), ParseError> {
        let (value, rest) = match format {
            Format::HttpDate => {
                let end = s
                    .find(" GMT")
                    .map(|idx| idx + " GMT".len())
                    .ok_or_else(|| ParseError::new(format, "missing GMT suffix"))?;
                (&s[..end], &s[end..])
            }
            _ => {
                let end = s.find(delim).unwrap_or(s.len());
                (&s[..end], &s[end..])
            }
        };
        let rest = match rest.strip_prefix(delim) {
            Some(r) => r.trim_start(),
            None if rest.is_empty() => rest,
            None => return Err(ParseError::new(format, "expected delimiter")),
        };
        Ok((Instant::from_str(value.trim(), format)?, rest))
    }
}

/// `AutoSi` pads the fraction to a whole SI unit; wire output drops the
/// trailing zeros (and the dot, if nothing remains).
fn trim_fraction(rfc3339: String) -> String {
    if !rfc3339.contains('.') {
        return rfc3339;
    }
    let body = rfc3339.trim_end_matches('Z').trim_end_matches('0');
    let body = body.strip_suffix('.').unwrap_or(body);
    let mut out = body.to_string();
    out.push('Z');
    out
}

fn parse_epoch_seconds(s: &str) -> Result<Instant, ParseError> {
    let format = Format::EpochSeconds;
    let negative = s.starts_with('-');
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(format, "invalid integer part"));
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(format, "invalid fractional part"));
    }
    if frac_part.len() > 9 {
        return Err(ParseError::new(format, "sub-nanosecond precision"));
    }
    let magnitude: i64 = int_part
        .parse()
        .map_err(|_| ParseError::new(format, "integer part out of range"))?;
    let mut nanos: u32 = 0;
    if !frac_part.is_empty() {
        let digits: u32 = frac_part
            .parse()
            .map_err(|_| ParseError::new(format, "fractional part out of range"))?;
        nanos = digits * 10u32.pow(9 - frac_part.len() as u32);
    }
    let instant = match (negative, nanos) {
        (false, n) => Instant::from_secs_and_nanos(magnitude, n),
        (true, 0) => Instant::from_epoch_seconds(-magnitude),
        (true, n) => Instant::from_secs_and_nanos(-magnitude - 1, NANOS_PER_SECOND - n),
    };
    Ok(instant)
}

#[cfg(test)]
mod test {
    use super::{Format, Instant};

    #[test]
    fn fmt_all_formats() {
        let instant = Instant::from_epoch_seconds(1576540098);
        assert_eq!(instant.fmt(Format::DateTime).unwrap(), "2019-12-16T23:48:18Z");
        assert_eq!(instant.fmt(Format::EpochSeconds).unwrap(), "1576540098");
        assert_eq!(
            instant.fmt(Format::HttpDate).unwrap(),
            "Mon, 16 Dec 2019 23:48:18 GMT"
        );

        let instant = Instant::from_fractional_seconds(1576540098, 0.52);
        assert_eq!(
            instant.fmt(Format::DateTime).unwrap(),
            "2019-12-16T23:48:18.52Z"
        );
        assert_eq!(instant.fmt(Format::EpochSeconds).unwrap(), "1576540098.52");
        assert_eq!(
            instant.fmt(Format::HttpDate).unwrap(),
            "Mon, 16 Dec 2019 23:48:18.520 GMT"
        );
    }

    #[test]
    fn fmt_datetime_trailing_zero_seconds() {
        let instant = Instant::from_epoch_seconds(1577836800);
        assert_eq!(instant.fmt(Format::DateTime).unwrap(), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn parse_datetime() {
        assert_eq!(
            Instant::from_str("2020-01-01T00:00:00Z", Format::DateTime).unwrap(),
            Instant::from_epoch_seconds(1577836800)
        );
        assert_eq!(
            Instant::from_str("2021-05-24T15:34:50.123Z", Format::DateTime).unwrap(),
            Instant::from_secs_and_nanos(1621870490, 123_000_000)
        );
        assert!(Instant::from_str("not a date", Format::DateTime).is_err());
    }

    #[test]
    fn epoch_seconds_round_trip() {
        for (repr, instant) in [
            ("1576540098", Instant::from_epoch_seconds(1576540098)),
            ("1576540098.52", Instant::from_secs_and_nanos(1576540098, 520_000_000)),
            ("-1.5", Instant::from_secs_and_nanos(-2, 500_000_000)),
            ("-0.5", Instant::from_secs_and_nanos(-1, 500_000_000)),
            ("0", Instant::from_epoch_seconds(0)),
        ] {
            assert_eq!(instant.fmt(Format::EpochSeconds).unwrap(), repr, "{}", repr);
            assert_eq!(
                Instant::from_str(repr, Format::EpochSeconds).unwrap(),
                instant,
                "{}",
                repr
            );
        }
    }

    #[test]
    fn read_list_of_http_dates() {
        let header = "Mon, 16 Dec 2019 23:48:18 GMT, Tue, 17 Dec 2019 23:48:18 GMT";
        let (first, rest) = Instant::read(header, Format::HttpDate, ',').unwrap();
        assert_eq!(first, Instant::from_epoch_seconds(1576540098));
        let (second, rest) = Instant::read(rest, Format::HttpDate, ',').unwrap();
        assert_eq!(second, Instant::from_epoch_seconds(1576626498));
        assert!(rest.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn epoch_seconds_survives_round_trip(secs in -4102444800i64..4102444800, millis in 0u32..1000) {
            let instant = Instant::from_secs_and_nanos(secs, millis * 1_000_000);
            let rendered = instant.fmt(Format::EpochSeconds).unwrap();
            proptest::prop_assert_eq!(Instant::from_str(&rendered, Format::EpochSeconds).unwrap(), instant);
        }

        #[test]
        fn datetime_survives_round_trip(secs in -4102444800i64..4102444800, millis in 0u32..1000) {
            let instant = Instant::from_secs_and_nanos(secs, millis * 1_000_000);
            let rendered = instant.fmt(Format::DateTime).unwrap();
            proptest::prop_assert_eq!(Instant::from_str(&rendered, Format::DateTime).unwrap(), instant);
        }
    }
}
