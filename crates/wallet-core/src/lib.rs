//! # wallet-core
//!
//! Core pass model for the wallet digital pass viewer.
//!
//! This crate provides:
//! - Typed, crash-free extraction of fields from untyped pass documents
//! - Timezone-aware dates with relative, translatable formatting
//! - CSS color parsing and barcode content encoding
//! - Configuration and logging for applications embedding the model
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`extractor`] - Typed access facade over a pass document's JSON mapping
//! - [`date`] - Dates with asymmetric ordering and relative formatting
//! - [`time_interval`] - Closed validity windows over dates
//! - [`color`] - RGB colors parsed from CSS text
//! - [`barcode`] - Barcode value model and content encoding for renderers
//! - [`image`] - Image bytes handed to an external decoder
//! - [`digital_pass`] - The polymorphic pass contract and expiration logic
//! - [`i18n`] - Translation of user-facing strings
//! - [`config`] - Configuration loading, saving, and validation
//! - [`logging`] - Subscriber setup for host applications
//! - [`error`] - Unified error types for the crate

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod barcode;
pub mod color;
pub mod config;
pub mod date;
pub mod digital_pass;
pub mod error;
pub mod extractor;
pub mod i18n;
pub mod image;
pub mod logging;
pub mod time_interval;

// Re-export primary types for convenience
pub use crate::barcode::{
    Barcode, BarcodeContentEncoder, BarcodeError, BarcodeFormat, ModuleGrid, RenderedSymbol,
    SymbolRenderer, TextEncoding, DEFAULT_MESSAGE_ENCODING,
};
pub use crate::color::{BadColor, Color};
pub use crate::config::{
    BarcodeConfig, ConfigError, ConfigResult, DatesConfig, LoggingConfig, WalletConfig,
};
pub use crate::date::{is_valid_date_format, Date};
pub use crate::digital_pass::{DigitalPass, PassPath};
pub use crate::error::{Result, WalletError};
pub use crate::extractor::{ConversionError, FromPassValue, Lookup, PassDataExtractor};
pub use crate::i18n::{CatalogTranslator, EnglishTranslator, MessageKey, Translator};
pub use crate::image::{Image, ImageDecoder, ImageError};
pub use crate::time_interval::TimeInterval;
