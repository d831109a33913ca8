//! Unified error types for the wallet core library.
//!
//! This module provides a unified error type [`WalletError`] that covers all
//! failure modes across the pass model. Each module also has its own specific
//! error type ([`BadColor`], [`ConversionError`], [`BarcodeError`],
//! [`ImageError`], [`ConfigError`]) for internal use.
//!
//! Note that most *field-level* problems never become errors at all: the
//! extractor degrades malformed dates and values to "absent". What reaches
//! this type is what should stop the caller, such as a broken color or a
//! missing required barcode field.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use wallet_core::{Color, PassDataExtractor, Result};
//!
//! fn background(document: &serde_json::Value) -> Result<Color> {
//!     let pass = PassDataExtractor::from_value(document).unwrap();
//!     Ok(pass.require::<Color>("backgroundColor")?)
//! }
//!
//! assert!(background(&json!({"backgroundColor": "#102030"})).is_ok());
//! assert!(background(&json!({"backgroundColor": "plaid"})).is_err());
//! ```

use thiserror::Error;

use crate::barcode::BarcodeError;
use crate::color::BadColor;
use crate::config::ConfigError;
use crate::extractor::ConversionError;
use crate::image::ImageError;

/// The unified error type for all wallet core operations.
#[derive(Debug, Error)]
pub enum WalletError {
    // =========================================================================
    // PASS DOCUMENT ERRORS
    // =========================================================================
    /// A color field could not be parsed.
    #[error("Invalid color '{0}'. Expected 'rgb(r, g, b)', '#RRGGBB' or '#AARRGGBB'.")]
    InvalidColor(String),

    /// A field the pass cannot do without is missing.
    #[error("Required field '{0}' is missing from the pass")]
    MissingField(String),

    /// A field is present but holds an unusable value.
    #[error("Malformed pass field: {0}")]
    MalformedField(String),

    // =========================================================================
    // RENDERING ERRORS
    // =========================================================================
    /// The barcode names a symbology or encoding that is not supported.
    #[error("Unsupported barcode: {0}")]
    UnsupportedBarcode(String),

    /// The barcode could not be rendered.
    #[error("Barcode rendering failed: {0}")]
    BarcodeRenderFailed(String),

    /// An image could not be decoded.
    #[error("Image decoding failed: {0}")]
    ImageDecodeFailed(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration could not be loaded or parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // =========================================================================
    // PERSISTENCE ERRORS
    // =========================================================================
    /// Data could not be written to disk.
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

/// A specialized [`Result`] type for wallet core operations.
pub type Result<T> = std::result::Result<T, WalletError>;

impl WalletError {
    /// Returns `true` if the pass document itself is at fault.
    #[inline]
    #[must_use]
    pub const fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidColor(_) | Self::MissingField(_) | Self::MalformedField(_)
        )
    }

    /// Returns `true` if drawing a barcode or image failed.
    #[inline]
    #[must_use]
    pub const fn is_render_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedBarcode(_) | Self::BarcodeRenderFailed(_) | Self::ImageDecodeFailed(_)
        )
    }

    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigParseError(_) | Self::ConfigValidationError(_))
    }

    /// Returns `true` if writing to disk failed.
    #[inline]
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::PersistenceError(_))
    }

    /// Returns a machine-readable error code.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidColor(_) => "INVALID_COLOR",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::MalformedField(_) => "MALFORMED_FIELD",
            Self::UnsupportedBarcode(_) => "UNSUPPORTED_BARCODE",
            Self::BarcodeRenderFailed(_) => "BARCODE_RENDER_FAILED",
            Self::ImageDecodeFailed(_) => "IMAGE_DECODE_FAILED",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<BadColor> for WalletError {
    fn from(err: BadColor) -> Self {
        Self::InvalidColor(err.text)
    }
}

impl From<ConversionError> for WalletError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::MissingField(field) => Self::MissingField(field),
            ConversionError::BadColor(bad) => bad.into(),
            ConversionError::ListItem { key, index, source } => match *source {
                ConversionError::MissingField(field) => {
                    Self::MissingField(format!("{key}[{index}].{field}"))
                }
                other => Self::MalformedField(format!("item {index} of '{key}': {other}")),
            },
            other @ (ConversionError::UnexpectedType { .. }
            | ConversionError::InvalidValue { .. }
            | ConversionError::Constructor(_)) => Self::MalformedField(other.to_string()),
        }
    }
}

impl From<BarcodeError> for WalletError {
    fn from(err: BarcodeError) -> Self {
        match err {
            BarcodeError::UnsupportedFormat(_)
            | BarcodeError::UnsupportedEncoding(_)
            | BarcodeError::Unencodable { .. } => Self::UnsupportedBarcode(err.to_string()),
            BarcodeError::Renderer { .. }
            | BarcodeError::InvalidModule(_)
            | BarcodeError::GridMismatch { .. }
            | BarcodeError::NotSquare(_)
            | BarcodeError::MissingDimensions(_) => Self::BarcodeRenderFailed(err.to_string()),
        }
    }
}

impl From<ImageError> for WalletError {
    fn from(err: ImageError) -> Self {
        Self::ImageDecodeFailed(err.to_string())
    }
}

impl From<ConfigError> for WalletError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::LoadError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::SerializeError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::WriteError { path, source } => {
                Self::PersistenceError(format!("Failed to write {path}: {source}"))
            }
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
            ConfigError::MultipleValidationErrors(errors) => {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                Self::ConfigValidationError(messages.join("; "))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::BarcodeFormat;
    use std::io::{Error as IoErr, ErrorKind};

    #[test]
    fn test_document_error_classification() {
        assert!(WalletError::InvalidColor("plaid".into()).is_document_error());
        assert!(WalletError::MissingField("format".into()).is_document_error());
        assert!(WalletError::MalformedField("x".into()).is_document_error());

        assert!(!WalletError::BarcodeRenderFailed("x".into()).is_document_error());
    }

    #[test]
    fn test_render_error_classification() {
        assert!(WalletError::UnsupportedBarcode("EAN13".into()).is_render_error());
        assert!(WalletError::ImageDecodeFailed("truncated".into()).is_render_error());
        assert!(!WalletError::ConfigParseError("x".into()).is_render_error());
    }

    #[test]
    fn test_config_and_io_classification() {
        assert!(WalletError::ConfigValidationError("x".into()).is_config_error());
        assert!(WalletError::PersistenceError("disk full".into()).is_io_error());
        assert!(!WalletError::InvalidColor("x".into()).is_io_error());
    }

    #[test]
    fn test_from_bad_color() {
        let err: WalletError = crate::Color::from_css("plaid").unwrap_err().into();
        assert!(matches!(&err, WalletError::InvalidColor(text) if text == "plaid"));
        assert_eq!(err.error_code(), "INVALID_COLOR");
    }

    #[test]
    fn test_from_conversion_error() {
        let missing: WalletError = ConversionError::MissingField("message".into()).into();
        assert!(matches!(missing, WalletError::MissingField(ref field) if field == "message"));

        let malformed: WalletError = ConversionError::UnexpectedType {
            expected: "a string",
            found: "a list",
        }
        .into();
        assert_eq!(malformed.error_code(), "MALFORMED_FIELD");
        assert!(malformed.to_string().contains("a list"));
    }

    #[test]
    fn test_from_barcode_error() {
        let unsupported: WalletError = BarcodeError::UnsupportedFormat("EAN13".into()).into();
        assert_eq!(unsupported.error_code(), "UNSUPPORTED_BARCODE");

        let render: WalletError = BarcodeError::MissingDimensions(BarcodeFormat::Pdf417).into();
        assert_eq!(render.error_code(), "BARCODE_RENDER_FAILED");
        assert!(render.to_string().contains("PDF417"));
    }

    #[test]
    fn test_from_config_error() {
        let err: WalletError = ConfigError::MultipleValidationErrors(vec![
            ConfigError::ValidationError {
                field: "a",
                message: "bad".into(),
            },
            ConfigError::ValidationError {
                field: "b",
                message: "worse".into(),
            },
        ])
        .into();
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Configuration validation failed: Invalid a: bad; Invalid b: worse");
    }

    #[test]
    fn test_config_write_failure_is_persistence_error() {
        let err: WalletError = ConfigError::WriteError {
            path: "/etc/wallet/config.toml".into(),
            source: IoErr::new(ErrorKind::PermissionDenied, "read-only"),
        }
        .into();
        assert!(err.is_io_error());
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
        assert!(err.to_string().contains("/etc/wallet/config.toml"));
    }

    #[test]
    fn test_from_list_item_error() {
        let missing: WalletError = ConversionError::ListItem {
            key: "barcodes".into(),
            index: 1,
            source: Box::new(ConversionError::MissingField("format".into())),
        }
        .into();
        assert!(matches!(&missing, WalletError::MissingField(field) if field == "barcodes[1].format"));

        let malformed: WalletError = ConversionError::ListItem {
            key: "barcodes".into(),
            index: 0,
            source: Box::new(ConversionError::UnexpectedType {
                expected: "a barcode mapping",
                found: "a string",
            }),
        }
        .into();
        assert_eq!(malformed.error_code(), "MALFORMED_FIELD");
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<WalletError>();
        assert_sync::<WalletError>();
    }
}
