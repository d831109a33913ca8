//! Barcodes carried by a pass, and the bridge to the symbol renderer.
//!
//! A [`Barcode`] is a plain value read from the pass document. Turning it into
//! something drawable is the job of an external [`SymbolRenderer`]; the
//! [`BarcodeContentEncoder`] prepares the message bytes for it and checks the
//! module sequence it returns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::extractor::{value_kind, ConversionError, FromPassValue, PassDataExtractor};

/// Text encoding used when a barcode does not name one.
pub const DEFAULT_MESSAGE_ENCODING: &str = "iso-8859-1";

/// Errors raised while preparing or rendering a barcode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    /// The format tag names no supported symbology.
    #[error("Unsupported barcode format '{0}'")]
    UnsupportedFormat(String),

    /// The message encoding label is not supported.
    #[error("Unsupported message encoding '{0}'")]
    UnsupportedEncoding(String),

    /// The message holds a character the encoding cannot represent.
    #[error("Character {character:?} cannot be encoded as {encoding}")]
    Unencodable {
        /// Name of the target encoding.
        encoding: &'static str,
        /// The first offending character.
        character: char,
    },

    /// The external renderer failed.
    #[error("Renderer failed to draw {format}: {message}")]
    Renderer {
        /// The symbology being drawn.
        format: BarcodeFormat,
        /// The renderer's own description of the failure.
        message: String,
    },

    /// The renderer returned a module that is neither `0` nor `1`.
    #[error("Unexpected module {0:?} in rendered symbol")]
    InvalidModule(char),

    /// The module count does not fill the grid.
    #[error("Renderer returned {modules} modules, which does not fill a {width}x{height} grid")]
    GridMismatch {
        /// Number of modules returned.
        modules: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// A square symbology came back with a non-square module count.
    #[error("Renderer returned {0} modules for a square symbol")]
    NotSquare(usize),

    /// A rectangular symbology came back without its dimensions.
    #[error("Renderer did not report dimensions for {0}")]
    MissingDimensions(BarcodeFormat),
}

// =============================================================================
// VALUE MODEL
// =============================================================================

/// One scannable code on a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barcode {
    format: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alt_text: Option<String>,
}

impl Barcode {
    /// Create a barcode with no explicit encoding or alternative text.
    #[must_use]
    pub fn new(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            message: message.into(),
            message_encoding: None,
            alt_text: None,
        }
    }

    /// Set the message encoding label.
    #[must_use]
    pub fn with_message_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.message_encoding = Some(encoding.into());
        self
    }

    /// Set the human-readable fallback text.
    #[must_use]
    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    /// Read a barcode from its mapping fragment.
    ///
    /// Expects `format` and `message`; `messageEncoding` and `altText` are
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::MissingField`] if `format` or `message` is
    /// absent, or the conversion error if either is not text.
    pub fn from_extractor(data: &PassDataExtractor<'_>) -> Result<Self, ConversionError> {
        Ok(Self {
            format: data.require("format")?,
            message: data.require("message")?,
            message_encoding: data.get("messageEncoding"),
            alt_text: data.get("altText"),
        })
    }

    /// The format tag as written in the document.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The payload to encode.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The encoding label, if the document named one.
    #[must_use]
    pub fn message_encoding(&self) -> Option<&str> {
        self.message_encoding.as_deref()
    }

    /// Text to show alongside or instead of the symbol.
    #[must_use]
    pub fn alternative_text(&self) -> Option<&str> {
        self.alt_text.as_deref()
    }

    /// The symbology named by [`format`](Self::format).
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::UnsupportedFormat`] for unknown tags.
    pub fn symbology(&self) -> Result<BarcodeFormat, BarcodeError> {
        self.format.parse()
    }
}

impl FromPassValue for Barcode {
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        let data = PassDataExtractor::from_value(value).ok_or(ConversionError::UnexpectedType {
            expected: "a barcode mapping",
            found: value_kind(value),
        })?;
        Self::from_extractor(&data)
    }
}

/// Symbologies the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeFormat {
    /// QR code.
    Qr,
    /// Aztec code.
    Aztec,
    /// PDF417 stacked code.
    Pdf417,
    /// Code 128 linear code.
    Code128,
}

impl BarcodeFormat {
    /// Whether the symbol is always square, so its side follows from the
    /// module count.
    #[must_use]
    pub const fn is_square(self) -> bool {
        matches!(self, Self::Qr | Self::Aztec)
    }
}

impl FromStr for BarcodeFormat {
    type Err = BarcodeError;

    /// Accepts wallet tags (`PKBarcodeFormatQR`) and plain names (`QRCODE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("PKBARCODEFORMAT").unwrap_or(&upper);

        match name {
            "QR" | "QRCODE" => Ok(Self::Qr),
            "AZTEC" | "AZTECCODE" => Ok(Self::Aztec),
            "PDF417" => Ok(Self::Pdf417),
            "CODE128" => Ok(Self::Code128),
            _ => Err(BarcodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Qr => "QR",
            Self::Aztec => "Aztec",
            Self::Pdf417 => "PDF417",
            Self::Code128 => "Code 128",
        };
        f.write_str(name)
    }
}

// =============================================================================
// MESSAGE ENCODING
// =============================================================================

/// Byte encodings a barcode message can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8.
    Utf8,
    /// ISO-8859-1.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
}

impl TextEncoding {
    /// Resolve an encoding label such as `iso-8859-1` or `UTF_8`.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::UnsupportedEncoding`] for unknown labels.
    pub fn from_label(label: &str) -> Result<Self, BarcodeError> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" | "l1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => Err(BarcodeError::UnsupportedEncoding(label.to_string())),
        }
    }

    /// Canonical label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
            Self::Ascii => "us-ascii",
        }
    }

    /// Encode `text`, failing on the first unrepresentable character.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::Unencodable`] if a character lies outside the
    /// encoding's repertoire.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, BarcodeError> {
        let limit = match self {
            Self::Utf8 => return Ok(text.as_bytes().to_vec()),
            Self::Latin1 => 0xFF,
            Self::Ascii => 0x7F,
        };

        text.chars()
            .map(|character| {
                u8::try_from(u32::from(character))
                    .ok()
                    .filter(|byte| u32::from(*byte) <= limit)
                    .ok_or(BarcodeError::Unencodable {
                        encoding: self.name(),
                        character,
                    })
            })
            .collect()
    }
}

// =============================================================================
// RENDERING CONTRACT
// =============================================================================

/// What the external renderer hands back: a flattened run of `'0'`/`'1'`
/// modules, row by row, and for rectangular symbologies the grid size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSymbol {
    /// Modules in row-major order.
    pub modules: String,
    /// `(width, height)`, when the renderer reports it.
    pub dimensions: Option<(usize, usize)>,
}

/// External service that draws barcode symbols.
pub trait SymbolRenderer {
    /// Renderer-specific failure.
    type Error: fmt::Display;

    /// Draw `payload` as a `format` symbol.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error if the payload cannot be drawn.
    fn render(&self, format: BarcodeFormat, payload: &[u8]) -> Result<RenderedSymbol, Self::Error>;
}

/// A validated grid of dark and light modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl ModuleGrid {
    /// Validate a rendered symbol against its symbology.
    ///
    /// # Errors
    ///
    /// Returns a [`BarcodeError`] if a module is not `0`/`1` or the module
    /// count does not match the grid.
    pub fn from_symbol(format: BarcodeFormat, symbol: &RenderedSymbol) -> Result<Self, BarcodeError> {
        let cells = symbol
            .modules
            .chars()
            .map(|module| match module {
                '1' => Ok(true),
                '0' => Ok(false),
                other => Err(BarcodeError::InvalidModule(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (width, height) = match symbol.dimensions {
            Some(dimensions) => dimensions,
            None if format.is_square() => {
                let side = square_side(cells.len()).ok_or(BarcodeError::NotSquare(cells.len()))?;
                (side, side)
            }
            None => return Err(BarcodeError::MissingDimensions(format)),
        };

        if cells.is_empty() || width.checked_mul(height) != Some(cells.len()) {
            return Err(BarcodeError::GridMismatch {
                modules: cells.len(),
                width,
                height,
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of modules per row.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether the module at column `x`, row `y` is dark. Out of range is light.
    #[must_use]
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width
            && y.checked_mul(self.width)
                .and_then(|offset| offset.checked_add(x))
                .and_then(|index| self.cells.get(index).copied())
                .unwrap_or(false)
    }

    /// Iterate the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.width)
    }
}

/// Exact integer square root, if `count` is a perfect square.
fn square_side(count: usize) -> Option<usize> {
    let side = (0..=count)
        .find(|side| side.checked_mul(*side).map_or(true, |square| square >= count))?;
    (side * side == count).then_some(side)
}

// =============================================================================
// ENCODER
// =============================================================================

/// Prepares barcode messages for a [`SymbolRenderer`] and validates its output.
#[derive(Debug, Clone)]
pub struct BarcodeContentEncoder<R> {
    renderer: R,
    default_encoding: TextEncoding,
}

impl<R: SymbolRenderer> BarcodeContentEncoder<R> {
    /// Create an encoder that falls back to ISO-8859-1.
    pub const fn new(renderer: R) -> Self {
        Self {
            renderer,
            default_encoding: TextEncoding::Latin1,
        }
    }

    /// Create an encoder with a different fallback encoding label.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::UnsupportedEncoding`] for unknown labels.
    pub fn with_default_encoding(renderer: R, label: &str) -> Result<Self, BarcodeError> {
        Ok(Self {
            renderer,
            default_encoding: TextEncoding::from_label(label)?,
        })
    }

    /// The encoding used when a barcode names none.
    pub const fn default_encoding(&self) -> TextEncoding {
        self.default_encoding
    }

    /// Render a pass barcode.
    ///
    /// # Errors
    ///
    /// Returns a [`BarcodeError`] if the format or encoding is unsupported,
    /// the message cannot be encoded, or the renderer output is unusable.
    pub fn encode(&self, barcode: &Barcode) -> Result<ModuleGrid, BarcodeError> {
        self.encode_text(
            barcode.symbology()?,
            barcode.message(),
            barcode.message_encoding(),
        )
    }

    /// Render `text` as a `format` symbol, encoding it with `encoding` or the
    /// default.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn encode_text(
        &self,
        format: BarcodeFormat,
        text: &str,
        encoding: Option<&str>,
    ) -> Result<ModuleGrid, BarcodeError> {
        let encoding = encoding
            .filter(|label| !label.trim().is_empty())
            .map_or(Ok(self.default_encoding), TextEncoding::from_label)?;
        let payload = encoding.encode(text)?;

        let symbol = self
            .renderer
            .render(format, &payload)
            .map_err(|err| BarcodeError::Renderer {
                format,
                message: err.to_string(),
            })?;

        let grid = ModuleGrid::from_symbol(format, &symbol)?;
        tracing::debug!(
            %format,
            encoding = encoding.name(),
            width = grid.width(),
            height = grid.height(),
            "Rendered barcode"
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    /// Renders a fixed symbol and remembers the last payload it saw.
    struct FakeRenderer {
        modules: &'static str,
        dimensions: Option<(usize, usize)>,
        last_payload: RefCell<Vec<u8>>,
    }

    impl FakeRenderer {
        fn new(modules: &'static str, dimensions: Option<(usize, usize)>) -> Self {
            Self {
                modules,
                dimensions,
                last_payload: RefCell::new(Vec::new()),
            }
        }
    }

    impl SymbolRenderer for FakeRenderer {
        type Error = String;

        fn render(&self, _format: BarcodeFormat, payload: &[u8]) -> Result<RenderedSymbol, String> {
            if payload.is_empty() {
                return Err("empty payload".to_string());
            }
            *self.last_payload.borrow_mut() = payload.to_vec();
            Ok(RenderedSymbol {
                modules: self.modules.to_string(),
                dimensions: self.dimensions,
            })
        }
    }

    #[test]
    fn test_from_mapping_fragment() {
        let fragment = json!({
            "format": "PKBarcodeFormatQR",
            "message": "TICKET-1",
            "messageEncoding": "utf-8",
            "altText": "1234"
        });
        let barcode = Barcode::from_pass_value(&fragment).unwrap();

        assert_eq!(barcode.format(), "PKBarcodeFormatQR");
        assert_eq!(barcode.message(), "TICKET-1");
        assert_eq!(barcode.message_encoding(), Some("utf-8"));
        assert_eq!(barcode.alternative_text(), Some("1234"));
        assert_eq!(barcode.symbology().unwrap(), BarcodeFormat::Qr);
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let fragment = json!({"format": "PDF417", "message": "x"});
        let barcode = Barcode::from_pass_value(&fragment).unwrap();
        assert_eq!(barcode.message_encoding(), None);
        assert_eq!(barcode.alternative_text(), None);
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let no_message = json!({"format": "QR"});
        assert_eq!(
            Barcode::from_pass_value(&no_message).unwrap_err(),
            ConversionError::MissingField("message".to_string())
        );

        let no_format = json!({"message": "x"});
        assert_eq!(
            Barcode::from_pass_value(&no_format).unwrap_err(),
            ConversionError::MissingField("format".to_string())
        );

        assert!(Barcode::from_pass_value(&json!("QR")).is_err());
    }

    #[test]
    fn test_serde_uses_document_field_names() {
        let barcode = Barcode::new("QR", "hello").with_alt_text("hello");
        let json = serde_json::to_value(&barcode).unwrap();
        assert_eq!(json, json!({"format": "QR", "message": "hello", "altText": "hello"}));
    }

    #[test]
    fn test_format_names() {
        assert_eq!("PKBarcodeFormatAztec".parse::<BarcodeFormat>().unwrap(), BarcodeFormat::Aztec);
        assert_eq!("AZTECCODE".parse::<BarcodeFormat>().unwrap(), BarcodeFormat::Aztec);
        assert_eq!("qrcode".parse::<BarcodeFormat>().unwrap(), BarcodeFormat::Qr);
        assert_eq!("PKBarcodeFormatPDF417".parse::<BarcodeFormat>().unwrap(), BarcodeFormat::Pdf417);
        assert_eq!("PKBarcodeFormatCode128".parse::<BarcodeFormat>().unwrap(), BarcodeFormat::Code128);
        assert!(matches!(
            "EAN13".parse::<BarcodeFormat>(),
            Err(BarcodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_text_encodings() {
        assert_eq!(TextEncoding::from_label("ISO-8859-1").unwrap(), TextEncoding::Latin1);
        assert_eq!(TextEncoding::from_label("utf_8").unwrap(), TextEncoding::Utf8);
        assert!(TextEncoding::from_label("shift-jis").is_err());

        assert_eq!(TextEncoding::Latin1.encode("café").unwrap(), b"caf\xe9".to_vec());
        assert_eq!(TextEncoding::Utf8.encode("café").unwrap(), "café".as_bytes().to_vec());
        assert_eq!(
            TextEncoding::Latin1.encode("€").unwrap_err(),
            BarcodeError::Unencodable {
                encoding: "iso-8859-1",
                character: '€'
            }
        );
        assert!(TextEncoding::Ascii.encode("café").is_err());
    }

    #[test]
    fn test_square_side() {
        assert_eq!(square_side(0), Some(0));
        assert_eq!(square_side(1), Some(1));
        assert_eq!(square_side(441), Some(21));
        assert_eq!(square_side(440), None);
    }

    #[test]
    fn test_encoder_defaults_to_latin1() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("1001", None));
        let barcode = Barcode::new("PKBarcodeFormatQR", "Ñandú");

        let grid = encoder.encode(&barcode).unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 2));
        assert!(grid.is_dark(0, 0));
        assert!(!grid.is_dark(1, 0));
        assert!(grid.is_dark(1, 1));
        assert!(!grid.is_dark(5, 5));
        assert_eq!(
            *encoder.renderer.last_payload.borrow(),
            vec![0xD1, b'a', b'n', b'd', 0xFA]
        );
    }

    #[test]
    fn test_encoder_honours_message_encoding() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("1", None));
        let barcode = Barcode::new("QR", "é").with_message_encoding("utf-8");
        encoder.encode(&barcode).unwrap();
        assert_eq!(*encoder.renderer.last_payload.borrow(), vec![0xC3, 0xA9]);
    }

    #[test]
    fn test_encoder_configurable_default() {
        let encoder =
            BarcodeContentEncoder::with_default_encoding(FakeRenderer::new("1", None), "utf-8").unwrap();
        assert_eq!(encoder.default_encoding(), TextEncoding::Utf8);
        assert!(BarcodeContentEncoder::with_default_encoding(FakeRenderer::new("1", None), "koi8").is_err());
    }

    #[test]
    fn test_square_symbol_must_be_square() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("101", None));
        let err = encoder.encode(&Barcode::new("AZTEC", "x")).unwrap_err();
        assert_eq!(err, BarcodeError::NotSquare(3));
    }

    #[test]
    fn test_rectangular_symbol_uses_reported_dimensions() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("110011", Some((3, 2))));
        let grid = encoder.encode(&Barcode::new("PDF417", "x")).unwrap();
        let rows: Vec<&[bool]> = grid.rows().collect();
        assert_eq!(rows, vec![&[true, true, false][..], &[false, true, true][..]]);
    }

    #[test]
    fn test_rectangular_symbol_needs_dimensions() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("1100", None));
        let err = encoder.encode(&Barcode::new("PDF417", "x")).unwrap_err();
        assert_eq!(err, BarcodeError::MissingDimensions(BarcodeFormat::Pdf417));
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("11001", Some((3, 2))));
        assert!(matches!(
            encoder.encode(&Barcode::new("PDF417", "x")),
            Err(BarcodeError::GridMismatch { modules: 5, width: 3, height: 2 })
        ));
    }

    #[test]
    fn test_invalid_module_is_rejected() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("1x01", None));
        assert_eq!(
            encoder.encode(&Barcode::new("QR", "x")).unwrap_err(),
            BarcodeError::InvalidModule('x')
        );
    }

    #[test]
    fn test_empty_symbol_is_rejected() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("", None));
        assert!(matches!(
            encoder.encode(&Barcode::new("QR", "x")),
            Err(BarcodeError::GridMismatch { modules: 0, .. })
        ));
    }

    #[test]
    fn test_renderer_failure_is_wrapped() {
        let encoder = BarcodeContentEncoder::new(FakeRenderer::new("1", None));
        let err = encoder.encode(&Barcode::new("QR", "")).unwrap_err();
        assert_eq!(
            err,
            BarcodeError::Renderer {
                format: BarcodeFormat::Qr,
                message: "empty payload".to_string()
            }
        );
    }
}
