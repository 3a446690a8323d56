use image::{imageops, RgbaImage};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::mpsc;

use super::labels::{darken_band, draw_labels, LabelFont};
use super::GridConfig;
use crate::covers::FetchResult;
use crate::error::CollageError;
use crate::models::AlbumRecord;

/// What a failed cover does to the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverFailurePolicy {
    /// Keep the placeholder and carry on
    #[default]
    Placeholder,
    /// Fail the whole collage
    Abort,
}

impl FromStr for CoverFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "placeholder" => Ok(CoverFailurePolicy::Placeholder),
            "abort" => Ok(CoverFailurePolicy::Abort),
            other => Err(format!("unknown cover failure policy '{}'", other)),
        }
    }
}

/// Sole owner of the canvas while a collage is built.
///
/// Results are placed in whatever order they arrive; each index maps to a
/// fixed cell and labels are clipped to their cell, so the finished canvas
/// does not depend on arrival order.
pub struct Compositor<'a> {
    config: GridConfig,
    font: Option<&'a LabelFont>,
    policy: CoverFailurePolicy,
    canvas: RgbaImage,
}

impl<'a> Compositor<'a> {
    pub fn new(
        config: GridConfig,
        font: Option<&'a LabelFont>,
        policy: CoverFailurePolicy,
    ) -> Self {
        let side = config.canvas_side();
        Self {
            config,
            font,
            policy,
            canvas: RgbaImage::new(side, side),
        }
    }

    /// Drain `results` until every album has been placed.
    pub async fn composite(
        mut self,
        mut results: mpsc::Receiver<FetchResult>,
        albums: &[AlbumRecord],
    ) -> Result<RgbaImage, CollageError> {
        let by_index: HashMap<usize, &AlbumRecord> = albums
            .iter()
            .map(|album| (album.original_index, album))
            .collect();
        let expected = albums.len();
        let mut received = 0;

        while received < expected {
            let Some(result) = results.recv().await else {
                return Err(CollageError::IncompleteResults { expected, received });
            };
            received += 1;

            if let (CoverFailurePolicy::Abort, Some(error)) = (self.policy, &result.error) {
                return Err(CollageError::CoverFetchFailure {
                    index: result.index,
                    source: error.clone(),
                });
            }

            match by_index.get(&result.index) {
                Some(album) => self.place(&result, album),
                None => tracing::warn!("Dropping cover #{} with no matching album", result.index),
            }
        }

        Ok(self.canvas)
    }

    /// Copy one cover into its cell and label it.
    pub fn place(&mut self, result: &FetchResult, album: &AlbumRecord) {
        let Some(cell) = self.config.cell(result.index) else {
            tracing::warn!(
                "Cover #{} does not fit a {}-cell grid",
                result.index,
                self.config.grid.count()
            );
            return;
        };

        // Crop from the cover's origin so oversized art cannot spill into neighbours
        let width = result.image.width().min(cell.size);
        let height = result.image.height().min(cell.size);
        let cover = imageops::crop_imm(&*result.image, 0, 0, width, height).to_image();
        imageops::replace(&mut self.canvas, &cover, cell.x as i64, cell.y as i64);

        if self.config.include_labels {
            darken_band(&mut self.canvas, cell);
            if let Some(font) = self.font {
                draw_labels(&mut self.canvas, cell, font, album);
            }
        }
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }
}
