use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::time::Instant;

use crate::covers::CoverFetcher;
use crate::error::CollageError;
use crate::grid::{Compositor, CoverFailurePolicy, GridConfig, LabelFont};
use crate::lastfm::LastFmClient;
use crate::models::BuildRequest;

/// Builds collages end to end: top albums, covers, grid, PNG.
pub struct CollageBuilder {
    lastfm: LastFmClient,
    covers: CoverFetcher,
    font: Option<LabelFont>,
    policy: CoverFailurePolicy,
}

impl CollageBuilder {
    pub fn new(lastfm: LastFmClient, covers: CoverFetcher) -> Self {
        Self {
            lastfm,
            covers,
            font: None,
            policy: CoverFailurePolicy::default(),
        }
    }

    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_failure_policy(mut self, policy: CoverFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the collage and return it PNG-encoded.
    pub async fn build(&self, request: &BuildRequest) -> Result<Vec<u8>, CollageError> {
        let canvas = self.build_canvas(request).await?;
        encode_png_blocking(canvas).await
    }

    /// Build the collage without encoding it.
    pub async fn build_canvas(&self, request: &BuildRequest) -> Result<RgbaImage, CollageError> {
        let started = Instant::now();

        let albums = self
            .lastfm
            .fetch_top_albums(&request.username, request.period, request.grid.count())
            .await?;

        let config = GridConfig::new(request.grid, request.include_labels);
        let results = self.covers.fetch_covers(&albums);
        let canvas = Compositor::new(config, self.font.as_ref(), self.policy)
            .composite(results, &albums)
            .await?;

        tracing::info!(
            "Built {}x{} collage of {} albums for {} in {:?}",
            request.grid.side(),
            request.grid.side(),
            albums.len(),
            request.username,
            started.elapsed()
        );

        Ok(canvas)
    }
}

pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, CollageError> {
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// `encode_png` on the blocking pool, off the async worker threads.
pub async fn encode_png_blocking(canvas: RgbaImage) -> Result<Vec<u8>, CollageError> {
    tokio::task::spawn_blocking(move || encode_png(&canvas))
        .await
        .map_err(|e| CollageError::EncodeTask(e.to_string()))?
}
