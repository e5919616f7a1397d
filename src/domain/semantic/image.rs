//! Uploaded image payload

use bytes::Bytes;

use crate::domain::DomainError;

/// Image formats recognised by their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Sniffs the format from the payload's magic bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            [b'B', b'M', ..] => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }
}

/// A validated image upload, forwarded to the ranking service unmodified
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    bytes: Bytes,
    format: ImageFormat,
    file_name: Option<String>,
}

impl ImagePayload {
    /// Validates that the bytes are a non-empty image of a known format
    pub fn new(bytes: Bytes) -> Result<Self, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::validation("Image payload is required"));
        }

        let format = ImageFormat::detect(&bytes).ok_or_else(|| {
            DomainError::validation("Uploaded file is not a supported image (jpeg, png, gif, webp, bmp)")
        })?;

        Ok(Self {
            bytes,
            format,
            file_name: None,
        })
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Client-supplied file name, or a synthetic one matching the format
    pub fn file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("upload.{}", self.format.extension()))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
