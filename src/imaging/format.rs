//! Container format tags
//!
//! The decoder detects a [`FormatTag`] from the magic bytes of the upload and
//! the encoder writes the result back in the same container. Anything the
//! decoder can read but the encoder does not mirror is tagged `Other` and is
//! written as JPEG.

use std::fmt;

/// Detected container format of an uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatTag {
    #[default]
    Jpeg,
    Png,
    Gif,
    Bmp,
    /// Decodable, but re-encoded with the default (JPEG) encoder
    Other,
}

impl FormatTag {
    /// Map a format detected by the `image` crate to a tag
    pub fn from_image_format(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => FormatTag::Jpeg,
            image::ImageFormat::Png => FormatTag::Png,
            image::ImageFormat::Gif => FormatTag::Gif,
            image::ImageFormat::Bmp => FormatTag::Bmp,
            _ => FormatTag::Other,
        }
    }

    /// Sniff the tag from leading bytes, `None` if no known signature matches
    pub fn sniff(data: &[u8]) -> Option<Self> {
        image::guess_format(data)
            .ok()
            .map(FormatTag::from_image_format)
    }

    /// The format actually written for this tag
    pub fn output(self) -> Self {
        match self {
            FormatTag::Other => FormatTag::Jpeg,
            tag => tag,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Other => "other",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self.output() {
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            _ => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self.output() {
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            _ => "jpg",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
