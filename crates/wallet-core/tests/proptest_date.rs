// crates/wallet-core/tests/proptest_date.rs
// ============================================================================
// Module: Date Property-Based Tests
// Description: Property tests for date ordering and interval membership.
// Purpose: Detect panics and ordering violations across wide input ranges.
// ============================================================================

//! Property-based tests for date and interval invariants.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use wallet_core::{Color, Date, TimeInterval};

/// Seconds between 1971 and 8999, inside the sentinel range.
fn timestamp() -> impl Strategy<Value = i64> {
    31_536_000_i64..221_845_392_000_i64
}

fn date_at(seconds: i64) -> Date {
    Date::from_instant(&Utc.timestamp_opt(seconds, 0).unwrap())
}

proptest! {
    #[test]
    fn defined_dates_order_like_their_instants(a in timestamp(), b in timestamp()) {
        let (left, right) = (date_at(a), date_at(b));
        prop_assert_eq!(left.partial_cmp(&right), Some(a.cmp(&b)));
        prop_assert_eq!(left == right, a == b);
    }

    #[test]
    fn undefined_orders_after_every_defined_date(a in timestamp()) {
        let defined = date_at(a);
        prop_assert!(defined < Date::undefined());
        prop_assert!(Date::undefined() > defined);
        prop_assert!(defined != Date::undefined());
    }

    #[test]
    fn unbounded_interval_contains_every_defined_date(a in timestamp()) {
        prop_assert!(TimeInterval::from_iso_strings(None, None).contains(&date_at(a)));
    }

    #[test]
    fn interval_membership_matches_bounds(
        start in timestamp(),
        end in timestamp(),
        probe in timestamp(),
    ) {
        let interval = TimeInterval::new(date_at(start), date_at(end));
        let expected = start <= probe && probe <= end;
        prop_assert_eq!(interval.contains(&date_at(probe)), expected);
    }

    #[test]
    fn rfc3339_text_parses_back_to_the_same_instant(a in timestamp()) {
        let date = date_at(a);
        prop_assert_eq!(Date::from_iso_string(&date.to_string()), date);
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".{0,40}") {
        let _ = Date::from_iso_string(&text);
        let _ = Color::from_css(&text);
    }

    #[test]
    fn hex_colors_parse_channel_by_channel(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let color = Color::from_css(&format!("#{r:02x}{g:02X}{b:02x}")).unwrap();
        prop_assert_eq!(color.as_tuple(), (r, g, b));
        prop_assert_eq!(color.inverted().inverted(), color);
    }
}
