//! Image Format Probe - Dimensions Without Decoding
//!
//! Reads width/height straight out of PNG, JPEG and GIF headers.
//! Never panics: unknown or truncated input yields an empty result.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

/// Probed dimensions. Serializes to `{}` when nothing was recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageDimensions {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn is_known(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

const PNG_PREFIX: [u8; 2] = [0x89, 0x50];
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const GIF_SIGNATURE: &[u8; 3] = b"GIF";

/// Identify the container format from its magic bytes
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&PNG_PREFIX) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&JPEG_SOI) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(GIF_SIGNATURE) {
        Some(ImageFormat::Gif)
    } else {
        None
    }
}

/// Detect image dimensions from raw bytes
pub fn detect(bytes: &[u8]) -> ImageDimensions {
    let found = match sniff_format(bytes) {
        Some(ImageFormat::Png) => png_dimensions(bytes),
        Some(ImageFormat::Jpeg) => jpeg_dimensions(bytes),
        Some(ImageFormat::Gif) => gif_dimensions(bytes),
        None => None,
    };
    found.unwrap_or_default()
}

fn png_dimensions(bytes: &[u8]) -> Option<ImageDimensions> {
    if bytes.len() < 24 {
        return None;
    }
    // IHDR is always the first chunk
    Some(ImageDimensions::new(be_u32(bytes, 16)?, be_u32(bytes, 20)?))
}

fn gif_dimensions(bytes: &[u8]) -> Option<ImageDimensions> {
    if bytes.len() < 10 {
        return None;
    }
    let width = u16::from_le_bytes([bytes[6], bytes[7]]);
    let height = u16::from_le_bytes([bytes[8], bytes[9]]);
    Some(ImageDimensions::new(width.into(), height.into()))
}

fn jpeg_dimensions(bytes: &[u8]) -> Option<ImageDimensions> {
    let mut i = 2usize;
    while i + 1 < bytes.len() {
        if bytes[i] != 0xFF {
            i += 1;
            continue;
        }
        // Runs of 0xFF before a marker are fill bytes
        if bytes[i + 1] == 0xFF {
            i += 1;
            continue;
        }
        let marker = bytes[i + 1];
        if is_sof_marker(marker) {
            // FF, marker, length(2), precision, height(2), width(2)
            let height = be_u16(bytes, i + 5)?;
            let width = be_u16(bytes, i + 7)?;
            return Some(ImageDimensions::new(width.into(), height.into()));
        }
        let seg_len = be_u16(bytes, i + 2)? as usize;
        if seg_len < 2 {
            return None;
        }
        i += 2 + seg_len;
    }
    None
}

fn is_sof_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xC3 | 0xC9)
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let b = bytes.get(at..at + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend_from_slice(&[0, 0, 0, 13]);
        png.extend_from_slice(b"IHDR");
        png.extend_from_slice(&width.to_be_bytes());
        png.extend_from_slice(&height.to_be_bytes());
        png.extend_from_slice(&[8, 6, 0, 0, 0]);
        png
    }

    #[test]
    fn test_png_dimensions() {
        let dims = detect(&png_header(800, 600));
        assert_eq!(dims, ImageDimensions::new(800, 600));
    }

    #[test]
    fn test_png_too_short() {
        let png = png_header(800, 600);
        assert_eq!(detect(&png[..20]), ImageDimensions::default());
    }

    #[test]
    fn test_gif_dimensions() {
        let gif = [b'G', b'I', b'F', b'8', b'9', b'a', 0x20, 0x03, 0x58, 0x02, 0, 0];
        assert_eq!(detect(&gif), ImageDimensions::new(800, 600));
    }

    #[test]
    fn test_jpeg_skips_app0_then_reads_sof() {
        let jpeg = [
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x10, // APP0 len=16
            b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 1, 0, 1, 0, 0,
            0xFF, 0xC2, 0x00, 0x11, // SOF2 len=17
            0x08, // precision
            0x00, 0x64, // height 100
            0x00, 0xC8, // width 200
            0x03, 0x01, 0x11, 0x00,
        ];
        assert_eq!(detect(&jpeg), ImageDimensions::new(200, 100));
    }

    #[test]
    fn test_jpeg_without_sof_is_empty() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xD9];
        assert_eq!(detect(&jpeg), ImageDimensions::default());
    }

    #[test]
    fn test_jpeg_fill_bytes_before_marker() {
        let jpeg = [
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, // APP0 len=4
            0xFF, 0xFF, 0xFF, 0xC0, 0x00, 0x0B, // fill, fill, SOF0 len=11
            0x08, 0x00, 0x64, 0x00, 0xC8, 0x01, 0x01, 0x11, 0x00,
        ];
        assert_eq!(detect(&jpeg), ImageDimensions::new(200, 100));
    }

    #[test]
    fn test_jpeg_zero_length_segment_stops() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x00, 0xFF, 0xE1];
        assert_eq!(detect(&jpeg), ImageDimensions::default());
    }

    #[test]
    fn test_truncated_sof_is_empty() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00];
        assert!(!detect(&jpeg).is_known());
    }

    #[test]
    fn test_unknown_serializes_empty() {
        let dims = detect(b"RIFF0000WEBP");
        assert_eq!(serde_json::to_string(&dims).unwrap(), "{}");
        assert_eq!(sniff_format(b"RIFF"), None);
    }
}
