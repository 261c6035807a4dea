/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Timestamp encoding resolution.
//!
//! Precedence: a `timestampFormat` trait on the member, then the protocol's
//! blanket default, then the binding location's default. The resolved format
//! drives both the serialize-side formatting call and the deserialize-side
//! parsing call, so the two always agree for a member.

use crate::binding::BindingLocation;
use crate::model::TraitSet;
use smithy_httpbind::instant::Format;

/// Resolve the concrete encoding for a timestamp member.
pub fn resolve(
    member_traits: &TraitSet,
    location: &BindingLocation,
    protocol_default: Option<Format>,
) -> Format {
    if let Some(format) = member_traits.timestamp_format() {
        return format;
    }
    if let Some(format) = protocol_default {
        return format;
    }
    match location {
        BindingLocation::Header(_) | BindingLocation::PrefixHeaders(_) => Format::HttpDate,
        BindingLocation::Label { .. }
        | BindingLocation::Query(_)
        | BindingLocation::Payload
        | BindingLocation::Document => Format::DateTime,
    }
}

#[cfg(test)]
mod test {
    use super::resolve;
    use crate::binding::BindingLocation;
    use crate::model::{KnownTrait, TraitSet};
    use smithy_httpbind::instant::Format;

    fn header() -> BindingLocation {
        BindingLocation::Header("x-date".to_string())
    }

    #[test]
    fn header_defaults_to_http_date() {
        assert_eq!(resolve(&TraitSet::new(), &header(), None), Format::HttpDate);
    }

    #[test]
    fn query_and_document_default_to_iso8601() {
        for location in [
            BindingLocation::Query("when".to_string()),
            BindingLocation::Document,
            BindingLocation::Label { greedy: false },
        ] {
            assert_eq!(resolve(&TraitSet::new(), &location, None), Format::DateTime);
        }
    }

    #[test]
    fn protocol_default_overrides_location_default() {
        assert_eq!(
            resolve(&TraitSet::new(), &header(), Some(Format::EpochSeconds)),
            Format::EpochSeconds
        );
        assert_eq!(
            resolve(
                &TraitSet::new(),
                &BindingLocation::Document,
                Some(Format::HttpDate)
            ),
            Format::HttpDate
        );
    }

    #[test]
    fn member_override_always_wins() {
        let traits = TraitSet::of([KnownTrait::TimestampFormat(Format::EpochSeconds)]);
        assert_eq!(resolve(&traits, &header(), None), Format::EpochSeconds);
        assert_eq!(
            resolve(&traits, &BindingLocation::Document, Some(Format::HttpDate)),
            Format::EpochSeconds
        );
    }

    #[test]
    fn same_member_renders_differently_by_location() {
        let traits = TraitSet::new();
        assert_eq!(resolve(&traits, &header(), None), Format::HttpDate);
        assert_eq!(
            resolve(&traits, &BindingLocation::Document, None),
            Format::DateTime
        );
    }
}
