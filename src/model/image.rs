//! Image descriptors and intrinsic-size recovery.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::dom::Element;
use super::style::{Length, LengthUnit};
use crate::error::{Error, Result};

/// Lenient decoder for pasted payloads: padding optional, trailing bits allowed.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Base64 characters decoded before falling back to the full payload
/// (a multiple of 4, about 64 KiB of image data).
const HEADER_PREFIX_CHARS: usize = 87_380;

/// True pixel dimensions of an image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrinsicSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl IntrinsicSize {
    /// Height that keeps the aspect ratio at `target_width`.
    ///
    /// ```
    /// use mailprep::model::IntrinsicSize;
    ///
    /// let size = IntrinsicSize { width: 300, height: 200 };
    /// assert_eq!(size.proportional_height(150), Some(100));
    /// ```
    pub fn proportional_height(&self, target_width: u32) -> Option<u32> {
        if self.width == 0 {
            return None;
        }
        let height = target_width as f64 * self.height as f64 / self.width as f64;
        Some(height.round() as u32)
    }
}

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// An inline `data:` URI
    Embedded {
        /// Declared media type (may be empty)
        mime: String,
        /// Whether the payload is base64 encoded
        base64: bool,
        /// Raw payload text after the comma
        payload: String,
    },
    /// A path or URL; never fetched
    Reference(String),
    /// No `src` at all
    Missing,
}

impl ImageSource {
    /// Classify a `src` attribute value.
    pub fn parse(src: Option<&str>) -> Self {
        let Some(src) = src.map(str::trim) else {
            return ImageSource::Missing;
        };
        let Some(rest) = strip_prefix_ignore_case(src, "data:") else {
            return ImageSource::Reference(src.to_string());
        };
        let Some((header, payload)) = rest.split_once(',') else {
            return ImageSource::Reference(src.to_string());
        };

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        let base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        ImageSource::Embedded {
            mime,
            base64,
            payload: payload.to_string(),
        }
    }

    /// Whether the bytes are carried inline.
    pub fn is_embedded(&self) -> bool {
        matches!(self, ImageSource::Embedded { .. })
    }

    /// Decode the payload header and read the intrinsic dimensions.
    pub fn intrinsic_size(&self) -> Result<IntrinsicSize> {
        let ImageSource::Embedded {
            base64, payload, ..
        } = self
        else {
            return Err(Error::ImageDecode("image is not embedded".to_string()));
        };
        if !base64 {
            return Err(Error::ImageDecode(
                "embedded payload is not base64".to_string(),
            ));
        }

        let cleaned: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        if cleaned.len() > HEADER_PREFIX_CHARS && cleaned.is_char_boundary(HEADER_PREFIX_CHARS) {
            if let Ok(bytes) = PAYLOAD_ENGINE.decode(&cleaned[..HEADER_PREFIX_CHARS]) {
                if let Some(size) = read_size(&bytes) {
                    return Ok(size);
                }
            }
        }

        let bytes = PAYLOAD_ENGINE
            .decode(&cleaned)
            .map_err(|e| Error::ImageDecode(e.to_string()))?;
        let size =
            imagesize::blob_size(&bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;
        if size.width == 0 || size.height == 0 {
            return Err(Error::ImageDecode("zero-sized image".to_string()));
        }
        Ok(IntrinsicSize {
            width: size.width as u32,
            height: size.height as u32,
        })
    }
}

fn read_size(bytes: &[u8]) -> Option<IntrinsicSize> {
    let size = imagesize::blob_size(bytes).ok()?;
    if size.width == 0 || size.height == 0 {
        return None;
    }
    Some(IntrinsicSize {
        width: size.width as u32,
        height: size.height as u32,
    })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Sizing facts derived from an `img` element.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    /// Source of the bytes
    pub source: ImageSource,
    /// `width` from the inline style
    pub style_width: Option<Length>,
    /// Numeric `width` attribute
    pub attr_width: Option<u32>,
}

impl ImageDescriptor {
    /// Derive a descriptor from an element.
    pub fn from_element(element: &Element) -> Self {
        let style_width = element.style_map().and_then(|s| s.length("width"));
        let attr_width = element.attr("width").and_then(parse_pixel_attribute);
        Self {
            source: ImageSource::parse(element.attr("src")),
            style_width,
            attr_width,
        }
    }

    /// Pixel width set by the author: style first, then attribute.
    pub fn pixel_width(&self) -> Option<u32> {
        self.style_width
            .filter(|l| l.unit == LengthUnit::Px && l.value > 0.0)
            .map(|l| l.value.round() as u32)
            .or(self.attr_width)
    }

    /// Whether the style width is a percentage.
    pub fn has_relative_width(&self) -> bool {
        self.style_width
            .is_some_and(|l| l.unit == LengthUnit::Percent)
    }

    /// Height for `target_width`, when the payload can be measured.
    pub fn proportional_height(&self, target_width: u32) -> Result<u32> {
        let size = self.source.intrinsic_size()?;
        size.proportional_height(target_width)
            .ok_or_else(|| Error::ImageDecode("zero-width image".to_string()))
    }
}

/// Parse a `width="120"` / `width="120px"` attribute.
pub fn parse_pixel_attribute(value: &str) -> Option<u32> {
    let value = value.trim();
    let value = value
        .strip_suffix("px")
        .or_else(|| value.strip_suffix("PX"))
        .unwrap_or(value)
        .trim();
    let n: f64 = value.parse().ok()?;
    if n > 0.0 && n.is_finite() {
        Some(n.round() as u32)
    } else {
        None
    }
}
