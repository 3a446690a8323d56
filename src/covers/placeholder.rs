use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;

const BACKGROUND: Rgba<u8> = Rgba([48, 48, 48, 255]);
const DISC: Rgba<u8> = Rgba([72, 72, 72, 255]);

/// Artwork used for albums without a usable cover. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Placeholder {
    image: Arc<RgbaImage>,
}

impl Placeholder {
    /// Flat dark square with a lighter disc in the middle.
    pub fn generated(cell_size: u32) -> Self {
        let center = cell_size as f32 / 2.0;
        let radius = cell_size as f32 * 0.3;

        let image = RgbaImage::from_fn(cell_size, cell_size, |x, y| {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            if dx * dx + dy * dy <= radius * radius {
                DISC
            } else {
                BACKGROUND
            }
        });

        Self {
            image: Arc::new(image),
        }
    }

    /// Load artwork from disk and scale it to fill one cell.
    pub fn from_file(path: impl AsRef<Path>, cell_size: u32) -> Result<Self, image::ImageError> {
        let image = image::open(path)?
            .resize_to_fill(cell_size, cell_size, FilterType::Lanczos3)
            .to_rgba8();

        Ok(Self {
            image: Arc::new(image),
        })
    }

    pub fn image(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.image)
    }
}
