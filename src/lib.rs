//! ForgeRaster Core - Font and Media Provisioning for Raster Rendering
//!
//! # Steps (composed by the caller, in this order)
//! 1. `load_fonts` - deduplicated, session-persistent font registration
//! 2. `rewrite` - per-node font-family fallback chains
//! 3. `resolve_all` - tolerant multi-candidate resource fetching
//! 4. render through the session's engine
//!
//! `detect` sniffs image dimensions independently of the above.

pub mod config;
pub mod digest;
pub mod engine;
pub mod fallback;
pub mod font_loader;
pub mod font_state;
pub mod pipeline;
pub mod probe;
pub mod resources;
pub mod tree;

pub use config::{ConfigError, HostConfig};
pub use engine::{EngineError, FontdbEngine, RenderEngine, RenderOptions};
pub use fallback::{parse_family_list, resolve_chain, rewrite};
pub use font_loader::{load_fonts, FontDescriptor, FontPayload, FontStyle, LoadReport};
pub use font_state::{FamilySubsets, FontSessions, FontStateStore};
pub use pipeline::{PipelineError, RenderPipeline, RenderRequest, RenderedImage};
pub use probe::{detect, sniff_format, ImageDimensions, ImageFormat};
pub use resources::{
    candidate_urls, resolve, resolve_all, ByteFetcher, FetchError, FetchedResource, HostFetcher,
};
pub use tree::{NodeStyle, StyledNode};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
