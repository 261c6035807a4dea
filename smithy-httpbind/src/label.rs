/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Formatting for URI path labels.
//!
//! Everything outside the RFC 3986 unreserved set is percent-encoded. Greedy
//! labels span multiple path segments, so they leave `/` intact.

use crate::instant::{Format, FormatError, Instant};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const LABEL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const GREEDY_LABEL: &AsciiSet = &LABEL.remove(b'/');

pub fn fmt_string<T: AsRef<str>>(t: T, greedy: bool) -> String {
    let set = if greedy { GREEDY_LABEL } else { LABEL };
    utf8_percent_encode(t.as_ref(), set).to_string()
}

pub fn fmt_timestamp(t: &Instant, format: Format) -> Result<String, FormatError> {
    Ok(fmt_string(t.fmt(format)?, false))
}

#[cfg(test)]
mod test {
    use super::fmt_string;
    use crate::instant::{Format, Instant};

    #[test]
    fn percent_encodes_reserved() {
        assert_eq!(fmt_string("a/b", false), "a%2Fb");
        assert_eq!(fmt_string("a/b", true), "a/b");
        assert_eq!(fmt_string("a b:c", false), "a%20b%3Ac");
        assert_eq!(fmt_string("unreserved-._~", false), "unreserved-._~");
    }

    #[test]
    fn greedy_still_encodes_non_separators(){
        assert_eq!(fmt_string("a/b c", true), "a/b%20c");
    }

    #[test]
    fn timestamp_label() {
        let instant = Instant::from_epoch_seconds(1577836800);
        assert_eq!(
            super::fmt_timestamp(&instant, Format::DateTime).unwrap(),
            "2020-01-01T00%3A00%3A00Z"
        );
    }
}
