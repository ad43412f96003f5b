//! ForgeRaster CLI - Bridge interface for host processes
//!
//! Commands: probe, resolve, render
//! Outputs JSON to stdout
//! Returns non-zero when the requested work could not be done

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use forgeraster_core::{
    detect, resolve_all, sniff_format, FontSessions, HostConfig, HostFetcher, RenderPipeline,
    RenderRequest,
};

#[derive(Parser)]
#[command(name = "forgeraster-cli")]
#[command(about = "ForgeRaster CLI - font and media provisioning for raster rendering")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to host config (JSON)
    #[arg(short, long, default_value = "forgeraster.json")]
    config: PathBuf,

    /// Site origin, e.g. https://example.com
    #[arg(long)]
    origin: Option<String>,

    /// Path the site is mounted under
    #[arg(long)]
    base_path: Option<String>,

    /// Directory serving non-HTTP resource candidates
    #[arg(long)]
    asset_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report image format and dimensions
    Probe {
        /// Image file
        file: PathBuf,
    },

    /// Resolve resource locators to bytes
    Resolve {
        /// Locators, e.g. /img/logo.png
        #[arg(required = true)]
        locators: Vec<String>,
    },

    /// Run the full pipeline
    Render {
        /// JSON payload (RenderRequest)
        #[arg(short, long)]
        payload: String,

        /// Write the image here instead of embedding it only as base64
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => println!(r#"{{"success": false, "error": "{}"}}"#, e),
    }
}

fn failure(error: impl std::fmt::Display) -> ExitCode {
    print_json(&serde_json::json!({
        "success": false,
        "error": error.to_string(),
    }));
    ExitCode::FAILURE
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = match HostConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => return failure(e),
    };
    if let Some(origin) = cli.origin {
        config.origin = Some(origin);
    }
    if let Some(base_path) = cli.base_path {
        config.base_path = base_path;
    }
    if let Some(asset_root) = cli.asset_root {
        config.asset_root = Some(asset_root);
    }

    match cli.command {
        Commands::Probe { file } => {
            let bytes = match std::fs::read(&file) {
                Ok(b) => b,
                Err(e) => return failure(format!("{}: {}", file.display(), e)),
            };
            let dims = detect(&bytes);
            print_json(&serde_json::json!({
                "success": dims.is_known(),
                "format": sniff_format(&bytes),
                "dimensions": dims,
            }));
            if dims.is_known() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Resolve { locators } => {
            let fetcher = match HostFetcher::new(&config) {
                Ok(f) => f,
                Err(e) => return failure(e),
            };
            let fetched = resolve_all(&locators, &config, &fetcher).await;
            let resolved: Vec<_> = fetched
                .iter()
                .map(|r| serde_json::json!({
                    "locator": r.locator,
                    "bytes": r.bytes.len(),
                    "dimensions": detect(&r.bytes),
                }))
                .collect();
            let missing: Vec<_> = locators
                .iter()
                .filter(|l| !fetched.iter().any(|r| &r.locator == *l))
                .collect();
            print_json(&serde_json::json!({
                "success": true,
                "resolved": resolved,
                "missing": missing,
            }));
            ExitCode::SUCCESS
        }

        Commands::Render { payload, output } => {
            let request: RenderRequest = match serde_json::from_str(&payload) {
                Ok(r) => r,
                Err(e) => return failure(format!("Invalid payload: {}", e)),
            };
            let fetcher = match HostFetcher::new(&config) {
                Ok(f) => f,
                Err(e) => return failure(e),
            };

            let session = uuid::Uuid::new_v4().to_string();
            let mut sessions = FontSessions::default();
            let store = sessions.get_or_create(&session);
            let pipeline = RenderPipeline::new(config, fetcher);

            match pipeline.render(store, request).await {
                Ok(image) => {
                    if let Some(path) = output {
                        let written = base64::Engine::decode(
                            &base64::engine::general_purpose::STANDARD,
                            &image.data_base64,
                        )
                        .map_err(|e| e.to_string())
                        .and_then(|data| std::fs::write(&path, data).map_err(|e| e.to_string()));
                        if let Err(e) = written {
                            return failure(format!("{}: {}", path.display(), e));
                        }
                    }
                    print_json(&serde_json::json!({
                        "success": true,
                        "image": image,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => failure(e),
            }
        }
    }
}
