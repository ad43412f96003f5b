//! Font Loader - Deduplicated Registration
//!
//! Registers font payloads with the store's engine exactly once per cache key.
//! A failing font is logged and skipped; it never aborts the batch.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::font_state::FontStateStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        })
    }
}

/// Raw font bytes as they arrive from upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontPayload {
    Bytes(Vec<u8>),
    Base64(String),
}

impl FontPayload {
    /// Canonical byte form, whatever the input representation
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            FontPayload::Bytes(bytes) => Ok(bytes.clone()),
            FontPayload::Base64(encoded) => {
                base64::engine::general_purpose::STANDARD.decode(encoded.trim())
            }
        }
    }
}

impl From<Vec<u8>> for FontPayload {
    fn from(bytes: Vec<u8>) -> Self {
        FontPayload::Bytes(bytes)
    }
}

impl From<&[u8]> for FontPayload {
    fn from(bytes: &[u8]) -> Self {
        FontPayload::Bytes(bytes.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    #[serde(default = "default_weight")]
    pub weight: u16,
    #[serde(default)]
    pub style: FontStyle,
    #[serde(default)]
    pub data: Option<FontPayload>,
    /// Overrides the derived `family|weight|style` cache key
    #[serde(default)]
    pub key: Option<String>,
}

fn default_weight() -> u16 { 400 }

impl FontDescriptor {
    pub fn new(family: impl Into<String>, weight: u16, style: FontStyle) -> Self {
        Self {
            family: family.into(),
            weight,
            style,
            data: None,
            key: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<FontPayload>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn cache_key(&self) -> String {
        match &self.key {
            Some(key) => key.clone(),
            None => format!("{}|{}|{}", self.family, self.weight, self.style),
        }
    }
}

pub fn subset_name(family: &str, counter: u64) -> String {
    format!("{}__{}", family, counter)
}

/// Outcome of one `load_fonts` batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: usize,
}

/// Load every not-yet-seen descriptor into the store's engine.
///
/// The counter advances before registration, so a failed attempt leaves a
/// gap in the subset numbering. Failed keys are still marked loaded and are
/// not retried for the lifetime of the store.
pub fn load_fonts(store: &mut FontStateStore, descriptors: &[FontDescriptor]) -> LoadReport {
    let mut report = LoadReport::default();

    for font in descriptors {
        let Some(payload) = &font.data else {
            report.skipped += 1;
            continue;
        };

        let key = font.cache_key();
        if store.is_loaded(&key) {
            report.skipped += 1;
            continue;
        }

        let subset = subset_name(&font.family, store.next_subset_index());

        let registered = match payload.to_bytes() {
            Ok(bytes) => store
                .engine_mut()
                .load_font(&subset, bytes, font.weight, font.style)
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("invalid base64 payload: {}", e)),
        };

        store.mark_loaded(key);

        match registered {
            Ok(()) => {
                store.push_subset(&font.family, subset.clone());
                report.loaded.push(subset);
            }
            Err(e) => {
                log::warn!(
                    "Failed to load font {} ({}): {}",
                    font.family,
                    font.weight,
                    e
                );
                report.failed.push(subset);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_derived() {
        let font = FontDescriptor::new("Inter", 700, FontStyle::Italic);
        assert_eq!(font.cache_key(), "Inter|700|italic");
    }

    #[test]
    fn test_cache_key_override() {
        let font = FontDescriptor::new("Inter", 700, FontStyle::Italic).with_key("inter-bold-v2");
        assert_eq!(font.cache_key(), "inter-bold-v2");
    }

    #[test]
    fn test_payload_normalization() {
        let raw = FontPayload::from(&b"OTTO"[..]);
        let encoded = FontPayload::Base64("T1RUTw==".to_string());
        assert_eq!(raw.to_bytes().unwrap(), b"OTTO");
        assert_eq!(encoded.to_bytes().unwrap(), b"OTTO");
        assert!(FontPayload::Base64("***".into()).to_bytes().is_err());
    }

    #[test]
    fn test_descriptor_json_accepts_both_payloads() {
        let fonts: Vec<FontDescriptor> = serde_json::from_str(
            r#"[
                {"family": "A", "data": [1, 2, 3]},
                {"family": "B", "weight": 700, "style": "oblique", "data": "AQID"}
            ]"#,
        )
        .unwrap();
        assert_eq!(fonts[0].weight, 400);
        assert_eq!(fonts[0].style, FontStyle::Normal);
        assert_eq!(fonts[0].data, Some(FontPayload::Bytes(vec![1, 2, 3])));
        assert_eq!(fonts[1].style, FontStyle::Oblique);
        assert_eq!(fonts[1].data.as_ref().unwrap().to_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_subset_name() {
        assert_eq!(subset_name("Noto Sans", 3), "Noto Sans__3");
    }
}
