//! Resource Resolver - Tolerant Multi-Candidate Fetching
//!
//! A relative locator is tried as-is, then against the origin, then against
//! origin + base path. Candidates run in order and stop at the first hit;
//! distinct locators run concurrently. Unresolved locators are dropped.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use futures_util::future::join_all;
use thiserror::Error;

use crate::config::HostConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot fetch {0}")]
    Unsupported(String),
}

/// A locator together with the bytes it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub locator: String,
    pub bytes: Vec<u8>,
}

/// Byte transport supplied by the host
#[allow(async_fn_in_trait)]
pub trait ByteFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Ordered candidate URLs for a locator
pub fn candidate_urls(locator: &str, config: &HostConfig) -> Vec<String> {
    let mut candidates = vec![locator.to_string()];

    if locator.starts_with('/') {
        if let Some(origin) = config.normalized_origin() {
            candidates.push(format!("{}{}", origin, locator));

            if let Some(base) = config.normalized_base_path() {
                let already_based =
                    locator == base || locator.starts_with(&format!("{}/", base));
                if !already_based {
                    candidates.push(format!("{}{}{}", origin, base, locator));
                }
            }
        }
    }

    candidates
}

/// Resolve one locator, trying candidates strictly in order
pub async fn resolve<F: ByteFetcher>(
    locator: &str,
    config: &HostConfig,
    fetcher: &F,
) -> Option<FetchedResource> {
    for url in candidate_urls(locator, config) {
        match fetcher.fetch(&url).await {
            Ok(bytes) => {
                return Some(FetchedResource {
                    locator: locator.to_string(),
                    bytes,
                })
            }
            Err(e) => log::debug!("Candidate {} for {} failed: {}", url, locator, e),
        }
    }
    log::debug!("Unresolved resource {}", locator);
    None
}

/// Resolve distinct locators concurrently. Results keep input order;
/// locators whose candidates all failed are omitted.
pub async fn resolve_all<F: ByteFetcher>(
    locators: &[String],
    config: &HostConfig,
    fetcher: &F,
) -> Vec<FetchedResource> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = locators
        .iter()
        .map(String::as_str)
        .filter(|l| seen.insert(*l))
        .collect();

    join_all(unique.into_iter().map(|l| resolve(l, config, fetcher)))
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Production transport: HTTP(S) through reqwest, everything else from the asset root
pub struct HostFetcher {
    client: reqwest::Client,
    asset_root: Option<PathBuf>,
}

impl HostFetcher {
    pub fn new(config: &HostConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            asset_root: config.asset_root.clone(),
        })
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }

    async fn fetch_local(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        let root = self
            .asset_root
            .as_deref()
            .ok_or_else(|| FetchError::Unsupported(locator.to_string()))?;
        let path = local_path(root, locator)
            .ok_or_else(|| FetchError::Unsupported(locator.to_string()))?;
        Ok(tokio::fs::read(path).await?)
    }
}

impl ByteFetcher for HostFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url).await
        } else {
            self.fetch_local(url).await
        }
    }
}

/// Map a locator under the asset root, refusing anything that climbs out of it
fn local_path(root: &Path, locator: &str) -> Option<PathBuf> {
    let relative = Path::new(locator.trim_start_matches('/'));
    if relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    Some(root.join(relative))
}
