//! Validity windows such as "usable between these two dates".

use chrono::TimeZone;

use crate::date::Date;
use crate::extractor::PassDataExtractor;

/// A closed interval `[start, end]` over [`Date`].
///
/// An undefined bound leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInterval {
    start: Date,
    end: Date,
}

impl TimeInterval {
    /// Build an interval from two bounds.
    #[must_use]
    pub const fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// Parse both bounds, reading offset-less values as local time.
    ///
    /// A missing or empty start becomes [`Date::min_value`]; a missing or
    /// empty end becomes [`Date::max_value`].
    #[must_use]
    pub fn from_iso_strings(start: Option<&str>, end: Option<&str>) -> Self {
        Self::from_iso_strings_in(start, end, &chrono::Local)
    }

    /// Like [`TimeInterval::from_iso_strings`], reading offset-less values in `zone`.
    #[must_use]
    pub fn from_iso_strings_in<Tz: TimeZone>(start: Option<&str>, end: Option<&str>, zone: &Tz) -> Self {
        let bound = |text: Option<&str>, missing: fn() -> Date| match text {
            Some(text) if !text.trim().is_empty() => Date::from_iso_string_in(text, zone),
            _ => missing(),
        };

        Self {
            start: bound(start, Date::min_value),
            end: bound(end, Date::max_value),
        }
    }

    /// Read the bounds from two string fields of a pass document.
    #[must_use]
    pub fn from_extractor(data: &PassDataExtractor<'_>, start_key: &str, end_key: &str) -> Self {
        let start = data.get::<String>(start_key);
        let end = data.get::<String>(end_key);
        Self::from_iso_strings(start.as_deref(), end.as_deref())
    }

    /// Returns `true` if `date` lies within the interval, bounds included.
    ///
    /// An undefined `date` is never contained in a bounded interval, since
    /// it orders after every defined end.
    #[must_use]
    pub fn contains(&self, date: &Date) -> bool {
        let before_start = !self.start.is_undefined() && *date < self.start;
        let after_end = !self.end.is_undefined() && *date > self.end;
        !(before_start || after_end)
    }

    /// Lower bound.
    #[must_use]
    pub const fn start_time(&self) -> Date {
        self.start
    }

    /// Upper bound.
    #[must_use]
    pub const fn end_time(&self) -> Date {
        self.end
    }
}

impl Default for TimeInterval {
    fn default() -> Self {
        Self::from_iso_strings(None, None)
    }
}
