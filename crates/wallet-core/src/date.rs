//! Timezone-aware points in time read from pass documents.
//!
//! Pass producers write timestamps in whatever ISO-8601 flavour their tooling
//! emits: with or without a `Z` suffix, with or without fractional seconds,
//! with or without an offset. [`Date`] absorbs those variations and collapses
//! anything it cannot understand into the *undefined* date, which the rest of
//! the crate treats as "unspecified" or "never".
//!
//! # Ordering
//!
//! `Date` is deliberately only [`PartialOrd`]:
//!
//! - two defined dates compare by instant;
//! - a defined date is always earlier than an undefined one;
//! - two undefined dates are neither equal nor ordered.
//!
//! This makes an undefined expiration behave like "far future" without ever
//! claiming that two unknown dates are the same.

use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::i18n::{MessageKey, Translator};

/// A two-digit fraction directly followed by a numeric offset, e.g. `.25+02:00`.
static SHORT_FRACTION_BEFORE_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+\.)(\d{2})([+-]\d.*)$").expect("fraction pattern is valid")
});

/// Offset-aware layouts tried after RFC 3339.
const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Layouts without an offset; interpreted in a caller-chosen zone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Fallback when a configured short date pattern cannot be rendered.
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// A point in time, or the undefined date.
#[derive(Debug, Clone, Copy)]
pub struct Date {
    instant: Option<DateTime<FixedOffset>>,
}

impl Date {
    /// The undefined date.
    #[must_use]
    pub const fn undefined() -> Self {
        Self { instant: None }
    }

    /// Wrap an existing instant, keeping its offset.
    #[must_use]
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            instant: Some(instant.with_timezone(&instant.offset().fix())),
        }
    }

    /// The current local instant.
    #[must_use]
    pub fn now() -> Self {
        Self::from_instant(&Local::now())
    }

    /// Lower sentinel used for open-ended intervals (1970-01-01, UTC).
    #[must_use]
    pub fn min_value() -> Self {
        Self::sentinel(1970, 1, 1)
    }

    /// Upper sentinel used for open-ended intervals (9000-12-31, UTC).
    #[must_use]
    pub fn max_value() -> Self {
        Self::sentinel(9000, 12, 31)
    }

    fn sentinel(year: i32, month: u32, day: u32) -> Self {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map_or_else(Self::undefined, |naive| {
                Self::from_instant(&Utc.from_utc_datetime(&naive))
            })
    }

    /// Parse an ISO-8601 timestamp, reading offset-less values as local time.
    ///
    /// Never fails: empty or unparseable input yields [`Date::undefined`].
    #[must_use]
    pub fn from_iso_string(text: &str) -> Self {
        Self::from_iso_string_in(text, &Local)
    }

    /// Like [`Date::from_iso_string`], treating `None` as undefined.
    #[must_use]
    pub fn from_optional_iso_string(text: Option<&str>) -> Self {
        text.map_or_else(Self::undefined, Self::from_iso_string)
    }

    /// Parse an ISO-8601 timestamp, reading offset-less values in `zone`.
    #[must_use]
    pub fn from_iso_string_in<Tz: TimeZone>(text: &str, zone: &Tz) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::undefined();
        }

        match parse_instant(trimmed, zone) {
            Some(instant) => Self {
                instant: Some(instant),
            },
            None => {
                tracing::warn!(value = trimmed, "Unparseable date, treating as undefined");
                Self::undefined()
            }
        }
    }

    /// Whether this date carries no instant.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        self.instant.is_none()
    }

    /// The wrapped instant, in the offset it was read with.
    #[must_use]
    pub const fn instant(&self) -> Option<DateTime<FixedOffset>> {
        self.instant
    }

    /// Describe this date relative to today, in the system's local zone.
    #[must_use]
    pub fn as_relative_pretty_string(&self, translator: &dyn Translator) -> String {
        let today = Local::now().date_naive();
        self.relative_pretty_string_at(today, &Local, translator)
    }

    /// Describe this date relative to `today`, viewing it from `zone`.
    ///
    /// - undefined: "Anytime"
    /// - same calendar day: "Today"
    /// - next calendar day: "Tomorrow"
    /// - two to six days ahead: the weekday name
    /// - anything else, past dates included: the translator's short date
    #[must_use]
    pub fn relative_pretty_string_at<Tz: TimeZone>(
        &self,
        today: NaiveDate,
        zone: &Tz,
        translator: &dyn Translator,
    ) -> String {
        let Some(instant) = self.instant else {
            return translator.translate(MessageKey::Anytime).into_owned();
        };

        let day = instant.with_timezone(zone).date_naive();
        match day.signed_duration_since(today).num_days() {
            0 => translator.translate(MessageKey::Today).into_owned(),
            1 => translator.translate(MessageKey::Tomorrow).into_owned(),
            2..=6 => translator
                .translate(MessageKey::Weekday(day.weekday()))
                .into_owned(),
            _ => format_short_date(day, translator.short_date_format()),
        }
    }
}

impl PartialEq for Date {
    fn eq(&self, other: &Self) -> bool {
        match (self.instant, other.instant) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.instant, other.instant) {
            (Some(left), Some(right)) => Some(left.cmp(&right)),
            (Some(_), None) => Some(Ordering::Less),
            (None, Some(_)) => Some(Ordering::Greater),
            (None, None) => None,
        }
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::undefined()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instant {
            Some(instant) => f.write_str(&instant.to_rfc3339()),
            None => f.write_str("Undefined"),
        }
    }
}

/// Returns `true` if `pattern` is a renderable `strftime` pattern.
#[must_use]
pub fn is_valid_date_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

fn format_short_date(day: NaiveDate, pattern: &str) -> String {
    let pattern = if is_valid_date_format(pattern) {
        pattern
    } else {
        tracing::warn!(pattern, "Invalid short date format, using ISO dates");
        FALLBACK_DATE_FORMAT
    };

    let mut rendered = String::new();
    if write!(rendered, "{}", day.format(pattern)).is_err() {
        rendered.clear();
        let _ = write!(rendered, "{}", day.format(FALLBACK_DATE_FORMAT));
    }
    rendered
}

/// Zero-pad a two-digit fractional second that precedes an offset.
///
/// `12:00:00.25+02:00` becomes `12:00:00.250+02:00`.
fn normalize_fraction(text: &str) -> String {
    SHORT_FRACTION_BEFORE_OFFSET
        .replace(text, "${1}${2}0${3}")
        .into_owned()
}

fn parse_instant<Tz: TimeZone>(text: &str, zone: &Tz) -> Option<DateTime<FixedOffset>> {
    if let Some(utc_text) = text.strip_suffix('Z') {
        let naive = parse_naive(&normalize_fraction(utc_text))?;
        return Some(Utc.from_utc_datetime(&naive).with_timezone(&Utc.fix()));
    }

    let normalized = normalize_fraction(text);

    if let Ok(instant) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(instant);
    }
    if let Some(instant) = AWARE_FORMATS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(&normalized, layout).ok())
    {
        return Some(instant);
    }

    let naive = parse_naive(&normalized)?;
    resolve_local(&naive, zone)
}

/// Place a wall-clock time in `zone`.
///
/// Ambiguous times take the earlier instant. Times skipped by a forward
/// transition keep the offset in force before it, so `02:30` on a spring
/// night with a one-hour gap lands on the same instant as `03:30` after it.
fn resolve_local<Tz: TimeZone>(naive: &NaiveDateTime, zone: &Tz) -> Option<DateTime<FixedOffset>> {
    let local = zone.from_local_datetime(naive).earliest().or_else(|| {
        let before = zone
            .offset_from_local_datetime(&naive.checked_sub_signed(Duration::days(1))?)
            .earliest()?
            .fix();
        let instant = naive.checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))?;
        Some(zone.from_utc_datetime(&instant))
    })?;
    Some(local.with_timezone(&local.offset().fix()))
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
        })
}
