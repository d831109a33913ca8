//! Images bundled with a pass.
//!
//! Decoding is delegated to an external [`ImageDecoder`]; this module only
//! owns the raw bytes and hands them out for decoding.

use std::fmt;

use thiserror::Error;

/// Errors raised while turning image bytes into a bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// There were no bytes to decode.
    #[error("Image data is empty")]
    Empty,

    /// The external decoder rejected the data.
    #[error("Failed to decode image: {0}")]
    Decode(String),
}

/// External service that turns encoded image bytes into a bitmap.
pub trait ImageDecoder {
    /// The displayable result.
    type Bitmap;
    /// Decoder-specific failure.
    type Error: fmt::Display;

    /// Decode `data`.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error if `data` is not a supported image.
    fn decode(&self, data: &[u8]) -> Result<Self::Bitmap, Self::Error>;
}

/// Encoded image bytes owned by a pass.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
}

impl Image {
    /// Take ownership of encoded bytes.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// The encoded bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Give the bytes back.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Decode with `decoder`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Empty`] without calling the decoder when there
    /// are no bytes, or [`ImageError::Decode`] if the decoder fails.
    pub fn decode_with<D: ImageDecoder>(&self, decoder: &D) -> Result<D::Bitmap, ImageError> {
        if self.data.is_empty() {
            return Err(ImageError::Empty);
        }

        decoder.decode(&self.data).map_err(|err| {
            tracing::warn!(bytes = self.data.len(), error = %err, "Image decoding failed");
            ImageError::Decode(err.to_string())
        })
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("bytes", &self.data.len())
            .finish()
    }
}
