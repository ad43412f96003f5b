//! Rendering Engine Capability
//!
//! The core only needs two things from a renderer: register a font blob
//! under a name, and turn a styled tree into encoded image bytes.
//! Backends implement [`RenderEngine`]; the store holds one behind a box.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::font_loader::FontStyle;
use crate::resources::FetchedResource;
use crate::tree::StyledNode;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Font rejected: {0}")]
    FontRejected(String),

    #[error("Invalid canvas size {0}x{1}")]
    InvalidCanvas(u32, u32),

    #[error("Encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// RGBA; transparent when absent
    #[serde(default)]
    pub background: Option<[u8; 4]>,
    /// Filled in by the pipeline after resolution
    #[serde(skip)]
    pub resources: Vec<FetchedResource>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            background: None,
            resources: vec![],
        }
    }
}

pub trait RenderEngine: Send {
    fn load_font(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        weight: u16,
        style: FontStyle,
    ) -> Result<(), EngineError>;

    fn render(&self, tree: &StyledNode, options: &RenderOptions) -> Result<Vec<u8>, EngineError>;
}

/// fontdb-backed engine producing PNG canvases via tiny-skia.
///
/// `load_font` registers the face into fontdb under the subset alias; weight
/// and style only appear in diagnostics. Glyph rasterization lives outside
/// this crate, so `render` ignores the tree and resources and returns a blank
/// canvas of the requested size, filled with `background` when one is set.
pub struct FontdbEngine {
    db: fontdb::Database,
    aliases: HashMap<String, Vec<fontdb::ID>>,
}

impl FontdbEngine {
    pub fn new() -> Self {
        Self {
            db: fontdb::Database::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn has_font(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }
}

impl Default for FontdbEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for FontdbEngine {
    fn load_font(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        weight: u16,
        style: FontStyle,
    ) -> Result<(), EngineError> {
        let ids = self.db.load_font_source(fontdb::Source::Binary(Arc::new(bytes)));
        if ids.is_empty() {
            return Err(EngineError::FontRejected(format!(
                "{} ({} {:?}) is not a parseable font",
                name, weight, style
            )));
        }
        log::debug!("Registered {} face(s) as {}", ids.len(), name);
        self.aliases.insert(name.to_string(), ids.to_vec());
        Ok(())
    }

    fn render(&self, tree: &StyledNode, options: &RenderOptions) -> Result<Vec<u8>, EngineError> {
        let mut pixmap = tiny_skia::Pixmap::new(options.width, options.height)
            .ok_or(EngineError::InvalidCanvas(options.width, options.height))?;

        if let Some([r, g, b, a]) = options.background {
            pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
        }

        log::debug!(
            "Rendering {} node(s) with {} font alias(es), {} resource(s)",
            tree.node_count(),
            self.aliases.len(),
            options.resources.len()
        );

        pixmap
            .encode_png()
            .map_err(|e| EngineError::Encode(e.to_string()))
    }
}
