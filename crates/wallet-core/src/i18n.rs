//! Translation lookup for human-facing strings.
//!
//! The core never hardcodes a language. Every string shown to a user is
//! requested through a [`Translator`] using a stable [`MessageKey`]; the
//! host application decides which catalog backs it.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::Weekday;

/// Default `strftime` pattern for short, locale-style dates.
pub const DEFAULT_SHORT_DATE_FORMAT: &str = "%x";

/// Stable identifiers for every translatable string the core produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Shown for dates that carry no instant.
    Anytime,
    /// The current calendar day.
    Today,
    /// The next calendar day.
    Tomorrow,
    /// A day of the week within the coming week.
    Weekday(Weekday),
}

impl MessageKey {
    /// The stable catalog key. Doubles as the English text.
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Anytime => "Anytime",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::Weekday(Weekday::Mon) => "Monday",
            Self::Weekday(Weekday::Tue) => "Tuesday",
            Self::Weekday(Weekday::Wed) => "Wednesday",
            Self::Weekday(Weekday::Thu) => "Thursday",
            Self::Weekday(Weekday::Fri) => "Friday",
            Self::Weekday(Weekday::Sat) => "Saturday",
            Self::Weekday(Weekday::Sun) => "Sunday",
        }
    }
}

/// Source of localized strings.
pub trait Translator {
    /// Look up the text for `key`.
    fn translate(&self, key: MessageKey) -> Cow<'_, str>;

    /// `strftime` pattern used for dates too far away to describe relatively.
    fn short_date_format(&self) -> &str {
        DEFAULT_SHORT_DATE_FORMAT
    }
}

/// Returns the catalog keys verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTranslator;

impl Translator for EnglishTranslator {
    fn translate(&self, key: MessageKey) -> Cow<'_, str> {
        Cow::Borrowed(key.as_key())
    }
}

/// Translator backed by a key -> text map, falling back to English.
///
/// Keys match case-insensitively, so catalogs that went through a
/// lower-casing configuration layer still resolve.
#[derive(Debug, Clone)]
pub struct CatalogTranslator {
    entries: HashMap<String, String>,
    short_date_format: String,
}

impl CatalogTranslator {
    /// Build a translator from catalog entries and a short date pattern.
    #[must_use]
    pub fn new(entries: HashMap<String, String>, short_date_format: impl Into<String>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, text)| (key.to_lowercase(), text))
                .collect(),
            short_date_format: short_date_format.into(),
        }
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, key: MessageKey) -> Cow<'_, str> {
        self.entries.get(&key.as_key().to_lowercase()).map_or_else(
            || {
                tracing::debug!(key = key.as_key(), "No translation found, using English");
                Cow::Borrowed(key.as_key())
            },
            |text| Cow::Borrowed(text.as_str()),
        )
    }

    fn short_date_format(&self) -> &str {
        &self.short_date_format
    }
}
