mod placeholder;

use image::RgbaImage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

use crate::error::CoverFetchError;
use crate::fetch::{HttpFetch, ImageDecode};
use crate::models::AlbumRecord;

pub use placeholder::Placeholder;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Large enough for the biggest grid, so every cover downloads at once by default
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 100;

/// Outcome of resolving one album's cover.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub index: usize,
    pub image: Arc<RgbaImage>,
    /// Set when the placeholder stands in for a cover that failed to load
    pub error: Option<CoverFetchError>,
}

/// Resolves album covers concurrently, one task per album.
pub struct CoverFetcher {
    http: Arc<dyn HttpFetch>,
    decoder: Arc<dyn ImageDecode>,
    placeholder: Placeholder,
    fetch_timeout: Duration,
    limit: Arc<Semaphore>,
}

impl CoverFetcher {
    pub fn new(
        http: Arc<dyn HttpFetch>,
        decoder: Arc<dyn ImageDecode>,
        placeholder: Placeholder,
    ) -> Self {
        Self {
            http,
            decoder,
            placeholder,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            limit: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_FETCHES)),
        }
    }

    pub fn with_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Cap simultaneous downloads across every build sharing this fetcher.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.limit = Arc::new(Semaphore::new(max_concurrent.max(1)));
        self
    }

    /// Start resolving every album's cover.
    ///
    /// The receiver yields exactly one result per album, in completion order,
    /// and closes once all of them have been sent.
    pub fn fetch_covers(&self, albums: &[AlbumRecord]) -> mpsc::Receiver<FetchResult> {
        // Room for every result so producers never wait on the consumer
        let (tx, rx) = mpsc::channel(albums.len().max(1));

        for album in albums {
            let task = CoverTask {
                index: album.original_index,
                url: album.preferred_cover().map(str::to_string),
                http: Arc::clone(&self.http),
                decoder: Arc::clone(&self.decoder),
                placeholder: self.placeholder.clone(),
                fetch_timeout: self.fetch_timeout,
                limit: Arc::clone(&self.limit),
            };
            let tx = tx.clone();

            tokio::spawn(async move {
                let result = task.resolve().await;
                if tx.send(result).await.is_err() {
                    tracing::debug!("Collage build ended before cover results were consumed");
                }
            });
        }

        rx
    }
}

struct CoverTask {
    index: usize,
    url: Option<String>,
    http: Arc<dyn HttpFetch>,
    decoder: Arc<dyn ImageDecode>,
    placeholder: Placeholder,
    fetch_timeout: Duration,
    limit: Arc<Semaphore>,
}

impl CoverTask {
    async fn resolve(self) -> FetchResult {
        let Some(url) = self.url.as_deref() else {
            tracing::debug!("Album #{} has no cover, using placeholder", self.index);
            return FetchResult {
                index: self.index,
                image: self.placeholder.image(),
                error: None,
            };
        };

        // The semaphore is never closed
        let _permit = self.limit.acquire().await.ok();

        match self.download(url).await {
            Ok(image) => FetchResult {
                index: self.index,
                image,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Using placeholder for album #{}: {}", self.index, e);
                FetchResult {
                    index: self.index,
                    image: self.placeholder.image(),
                    error: Some(e),
                }
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Arc<RgbaImage>, CoverFetchError> {
        let bytes = tokio::time::timeout(self.fetch_timeout, self.http.get(url))
            .await
            .map_err(|_| CoverFetchError::Timeout {
                url: url.to_string(),
            })??;

        let decoder = Arc::clone(&self.decoder);
        let decoded = tokio::task::spawn_blocking(move || {
            decoder.decode(&bytes).map(|image| image.to_rgba8())
        })
        .await
        .map_err(|e| CoverFetchError::Task {
            index: self.index,
            reason: e.to_string(),
        })?
        .map_err(|e| CoverFetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Arc::new(decoded))
    }
}
