//! Render Pipeline - Step Orchestration
//!
//! load fonts -> rewrite fallback chains -> resolve resources -> render -> probe.
//! Font and resource failures degrade; only the engine can fail a render.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::HostConfig;
use crate::digest::{fingerprint, sha256_hex};
use crate::engine::{EngineError, RenderOptions};
use crate::fallback::rewrite;
use crate::font_loader::{load_fonts, FontDescriptor, LoadReport};
use crate::font_state::FontStateStore;
use crate::probe::{detect, sniff_format, ImageFormat};
use crate::resources::{resolve_all, ByteFetcher};
use crate::tree::StyledNode;
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Render failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Engine produced unrecognized image data ({0} bytes)")]
    UnrecognizedOutput(usize),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub tree: StyledNode,
    #[serde(default)]
    pub fonts: Vec<FontDescriptor>,
    /// Extra locators beyond the tree's own image sources
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub options: RenderOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedImage {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub request_hash: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub data_base64: String,
    pub hash: String,
    pub fonts: LoadReport,
    pub resolved_resources: Vec<String>,
    pub missing_resources: Vec<String>,
}

pub struct RenderPipeline<F> {
    config: HostConfig,
    fetcher: F,
}

impl<F: ByteFetcher> RenderPipeline<F> {
    pub fn new(config: HostConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Run every step against the session's store.
    ///
    /// Takes `&mut` on the store: one render per store at a time.
    pub async fn render(
        &self,
        store: &mut FontStateStore,
        request: RenderRequest,
    ) -> Result<RenderedImage, PipelineError> {
        let request_hash = fingerprint(&request)?;
        let RenderRequest {
            mut tree,
            fonts,
            resources,
            mut options,
        } = request;

        let fonts = load_fonts(store, &fonts);
        log::info!(
            "Fonts: {} loaded, {} failed, {} skipped",
            fonts.loaded.len(),
            fonts.failed.len(),
            fonts.skipped
        );

        rewrite(&mut tree, store.family_subsets());

        let mut locators = tree.image_sources();
        locators.extend(resources);
        let fetched = resolve_all(&locators, &self.config, &self.fetcher).await;

        let resolved: Vec<String> = fetched.iter().map(|r| r.locator.clone()).collect();
        let mut missing: Vec<String> = vec![];
        for locator in locators {
            if !resolved.contains(&locator) && !missing.contains(&locator) {
                missing.push(locator);
            }
        }
        if !missing.is_empty() {
            log::info!("{} resource(s) unresolved", missing.len());
        }

        options.resources = fetched;
        let data = store.engine().render(&tree, &options)?;

        let format = sniff_format(&data).ok_or(PipelineError::UnrecognizedOutput(data.len()))?;
        let dims = detect(&data);
        let (Some(width), Some(height)) = (dims.width, dims.height) else {
            return Err(PipelineError::UnrecognizedOutput(data.len()));
        };

        Ok(RenderedImage {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            request_hash,
            format,
            width,
            height,
            hash: sha256_hex(&data),
            data_base64: base64::engine::general_purpose::STANDARD.encode(&data),
            fonts,
            resolved_resources: resolved,
            missing_resources: missing,
        })
    }
}
