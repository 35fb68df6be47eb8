//! Asset fetching
//!
//! Engine bytecode and sample files are fetched through [`AssetFetcher`].
//! [`HttpFetcher`] reads them over HTTP; [`MemoryFetcher`] serves them from
//! memory and counts requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{KicklabError, Result};

/// Source of raw asset bytes
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches assets with a single HTTP GET, no retries
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl AssetFetcher for HttpFetcher {
    #[cfg(feature = "http")]
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| KicklabError::Transport {
                message: e.to_string(),
            })?;

        let response = client.get(url).send().map_err(|e| KicklabError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(KicklabError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|e| KicklabError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    #[cfg(not(feature = "http"))]
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let _ = self.timeout;
        Err(KicklabError::Fetch {
            url: url.to_string(),
            reason: "HTTP support not compiled. Build with --features http".to_string(),
        })
    }
}

/// In-memory asset store
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    assets: HashMap<String, Vec<u8>>,
    requests: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(url.into(), bytes);
    }

    /// Number of fetches served or refused so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| KicklabError::Fetch {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            })
    }
}
