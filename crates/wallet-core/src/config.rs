//! Library configuration.
//!
//! Covers the knobs the pass model exposes to its host application:
//! - Fallback text encoding for barcode messages
//! - Timezone and short date pattern used when presenting dates
//! - Logging level, mode and directory
//! - Translation catalog for human-facing strings
//!
//! Values are layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then `WALLET__SECTION__KEY` environment variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::barcode::{
    BarcodeContentEncoder, BarcodeError, SymbolRenderer, TextEncoding, DEFAULT_MESSAGE_ENCODING,
};
use crate::date::{is_valid_date_format, Date};
use crate::i18n::{CatalogTranslator, Translator, DEFAULT_SHORT_DATE_FORMAT};

/// Prefix for environment overrides, e.g. `WALLET__DATES__TIMEZONE`.
pub const ENV_PREFIX: &str = "WALLET";

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The layered sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] ::config::ConfigError),

    /// The configuration file could not be written.
    #[error("Failed to write {path}: {source}")]
    WriteError {
        /// Target path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be rendered as TOML.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A single field holds an unusable value.
    #[error("Invalid {field}: {message}")]
    ValidationError {
        /// Dotted field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Several fields hold unusable values.
    #[error("{} configuration problems", .0.len())]
    MultipleValidationErrors(Vec<ConfigError>),
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Barcode rendering settings.
    pub barcode: BarcodeConfig,

    /// Date presentation settings.
    pub dates: DatesConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Catalog key -> translated text.
    pub translations: HashMap<String, String>,
}

/// Barcode rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeConfig {
    /// Encoding label used when a barcode names none.
    pub default_message_encoding: String,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            default_message_encoding: DEFAULT_MESSAGE_ENCODING.to_string(),
        }
    }
}

impl BarcodeConfig {
    /// Build an encoder for `renderer` using the configured fallback encoding.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::UnsupportedEncoding`] if the label is unknown.
    pub fn encoder<R: SymbolRenderer>(&self, renderer: R) -> Result<BarcodeContentEncoder<R>, BarcodeError> {
        BarcodeContentEncoder::with_default_encoding(renderer, &self.default_message_encoding)
    }
}

/// Date presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesConfig {
    /// Zone for offset-less timestamps and "today". `None` uses the system zone.
    #[serde(with = "timezone_serde", skip_serializing_if = "Option::is_none")]
    pub timezone: Option<Tz>,

    /// `strftime` pattern for dates more than a week away.
    pub short_date_format: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            short_date_format: DEFAULT_SHORT_DATE_FORMAT.to_string(),
        }
    }
}

impl DatesConfig {
    /// Parse an ISO-8601 timestamp in the configured zone.
    #[must_use]
    pub fn parse_date(&self, text: &str) -> Date {
        match self.timezone {
            Some(zone) => Date::from_iso_string_in(text, &zone),
            None => Date::from_iso_string(text),
        }
    }

    /// Describe `date` relative to today in the configured zone.
    #[must_use]
    pub fn pretty_date(&self, date: &Date, translator: &dyn Translator) -> String {
        match self.timezone {
            Some(zone) => {
                let today = chrono::Utc::now().with_timezone(&zone).date_naive();
                date.relative_pretty_string_at(today, &zone, translator)
            }
            None => date.relative_pretty_string_at(Local::now().date_naive(), &Local, translator),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,

    /// JSON file logs plus compact stdout instead of pretty stdout.
    pub production: bool,

    /// Directory for rolling log files. `None` uses the platform data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            production: false,
            directory: None,
        }
    }
}

impl WalletConfig {
    /// Load from the default path, if it exists, plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(default_path().as_deref())
    }

    /// Load from `path`, if given and present, plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed.
    pub fn load_from(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        let config: Self = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        tracing::debug!(
            path = ?path,
            encoding = %config.barcode.default_message_encoding,
            timezone = ?config.dates.timezone,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Write this configuration to `path` as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_error = |source| ConfigError::WriteError {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_error)
    }

    /// Check every field, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a single problem or
    /// [`ConfigError::MultipleValidationErrors`] for several.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if let Err(err) = TextEncoding::from_label(&self.barcode.default_message_encoding) {
            errors.push(ConfigError::ValidationError {
                field: "barcode.default_message_encoding",
                message: err.to_string(),
            });
        }

        if !is_valid_date_format(&self.dates.short_date_format) {
            errors.push(ConfigError::ValidationError {
                field: "dates.short_date_format",
                message: format!("'{}' is not a valid date pattern", self.dates.short_date_format),
            });
        }

        if let Err(err) = tracing_subscriber::EnvFilter::try_new(&self.logging.level) {
            errors.push(ConfigError::ValidationError {
                field: "logging.level",
                message: err.to_string(),
            });
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::MultipleValidationErrors(errors)),
        }
    }

    /// Translator backed by the configured catalog and date pattern.
    #[must_use]
    pub fn translator(&self) -> CatalogTranslator {
        CatalogTranslator::new(self.translations.clone(), self.dates.short_date_format.clone())
    }
}

/// Platform configuration file location, e.g. `~/.config/wallet/config.toml`.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "wallet").map(|dirs| dirs.config_dir().join("config.toml"))
}

mod timezone_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(tz: &Option<Tz>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match tz {
            Some(tz) => serializer.serialize_str(tz.name()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Tz>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = Option::<String>::deserialize(deserializer)?;
        match name.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
