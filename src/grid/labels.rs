use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Pixel, Rgba, RgbaImage};
use std::path::Path;

use super::CellRect;
use crate::error::FontError;
use crate::models::AlbumRecord;

/// Height of the darkened strip at the top of a labelled cell.
pub const LABEL_BAND_HEIGHT: u32 = 38;
/// 12pt at 72 DPI.
pub const FONT_SIZE: f32 = 12.0;

const BAND_COLOR: Rgba<u8> = Rgba([0, 0, 0, 60]);
const TEXT_COLOR: [u8; 3] = [255, 255, 255];
const TEXT_LEFT_PADDING: u32 = 2;
const LINE_HEIGHT: u32 = 12;

static BUNDLED_FONT: &[u8] = include_bytes!("../../static/fonts/DejaVuSans.ttf");

/// Font used for album labels, loaded once at startup and shared by every build.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
    scale: PxScale,
}

impl LabelFont {
    /// DejaVu Sans, compiled into the binary.
    pub fn bundled() -> Result<Self, ab_glyph::InvalidFont> {
        Ok(Self::new(FontArc::try_from_slice(BUNDLED_FONT)?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_bytes(bytes).map_err(|_| FontError::Invalid {
            path: path.display().to_string(),
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ab_glyph::InvalidFont> {
        Ok(Self::new(FontArc::try_from_vec(bytes)?))
    }

    fn new(font: FontArc) -> Self {
        let scale = em_scale(&font, FONT_SIZE);
        Self { font, scale }
    }

    /// Draw one line of white text starting at `(x, baseline)`, clipped to `clip`.
    fn draw_line(&self, canvas: &mut RgbaImage, clip: Band, x: u32, baseline: u32, text: &str) {
        let scaled = self.font.as_scaled(self.scale);
        let clip_right = clip.right as f32;

        let mut caret = point(x as f32, baseline as f32);
        let mut previous: Option<GlyphId> = None;

        for c in text.chars().filter(|c| !c.is_control()) {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret.x += scaled.kern(prev, id);
            }
            previous = Some(id);

            if caret.x >= clip_right {
                break;
            }

            let glyph = id.with_scale_and_position(self.scale, caret);
            caret.x += scaled.h_advance(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();

            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                let on_canvas = px < canvas.width() as i64 && py < canvas.height() as i64;
                if !on_canvas || !clip.contains(px, py) {
                    return;
                }

                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let [r, g, b] = TEXT_COLOR;
                canvas
                    .get_pixel_mut(px as u32, py as u32)
                    .blend(&Rgba([r, g, b, alpha]));
            });
        }
    }
}

/// `PxScale` covers ascent to descent; pick the one whose em square is `em_px` tall.
fn em_scale(font: &FontArc, em_px: f32) -> PxScale {
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(em_px * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(em_px),
    }
}

/// Label area of one cell: the band across its top.
#[derive(Debug, Clone, Copy)]
struct Band {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Band {
    fn of(cell: CellRect) -> Self {
        Self {
            left: cell.x,
            top: cell.y,
            right: cell.x + cell.size,
            bottom: cell.y + LABEL_BAND_HEIGHT.min(cell.size),
        }
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.left as i64
            && y >= self.top as i64
            && x < self.right as i64
            && y < self.bottom as i64
    }
}

/// Blend the translucent dark band over the top of a cell.
pub(super) fn darken_band(canvas: &mut RgbaImage, cell: CellRect) {
    let band = Band::of(cell);
    let bottom = band.bottom.min(canvas.height());
    let right = band.right.min(canvas.width());

    for y in band.top..bottom {
        for x in band.left..right {
            canvas.get_pixel_mut(x, y).blend(&BAND_COLOR);
        }
    }
}

/// Album name, artist and play count, one per line, clipped to the band.
pub(super) fn draw_labels(
    canvas: &mut RgbaImage,
    cell: CellRect,
    font: &LabelFont,
    album: &AlbumRecord,
) {
    let band = Band::of(cell);
    let play_count = album.play_count_label();
    let lines = [
        album.name.as_str(),
        album.artist_name.as_str(),
        play_count.as_str(),
    ];

    for (i, line) in lines.iter().enumerate() {
        let baseline = cell.y + LINE_HEIGHT * (i as u32 + 1);
        font.draw_line(canvas, band, cell.x + TEXT_LEFT_PADDING, baseline, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::solid_image;

    const BASE: Rgba<u8> = Rgba([200, 100, 50, 255]);

    #[test]
    fn test_band_darkens_only_top_of_cell() {
        let mut canvas = solid_image(600, 300, BASE);
        darken_band(&mut canvas, CellRect { x: 300, y: 0, size: 300 });

        for y in [0, 20, LABEL_BAND_HEIGHT - 1] {
            let pixel = canvas.get_pixel(450, y);
            assert!(pixel[0] < BASE[0]);
            assert!(pixel[1] < BASE[1]);
            assert!(pixel[2] < BASE[2]);
            assert_eq!(pixel[3], 255);
        }

        // Below the band and in the neighbouring cell nothing changes
        assert_eq!(canvas.get_pixel(450, LABEL_BAND_HEIGHT), &BASE);
        assert_eq!(canvas.get_pixel(299, 0), &BASE);
        assert_eq!(canvas.get_pixel(0, 10), &BASE);
    }

    #[test]
    fn test_band_is_uniform() {
        let mut canvas = solid_image(300, 300, BASE);
        darken_band(&mut canvas, CellRect { x: 0, y: 0, size: 300 });

        let first = *canvas.get_pixel(0, 0);
        for y in 0..LABEL_BAND_HEIGHT {
            for x in 0..300 {
                assert_eq!(canvas.get_pixel(x, y), &first);
            }
        }
    }

    #[test]
    fn test_band_over_transparent_cell_is_translucent_black() {
        let mut canvas = RgbaImage::new(300, 300);
        darken_band(&mut canvas, CellRect { x: 0, y: 0, size: 300 });

        let pixel = canvas.get_pixel(5, 5);
        assert_eq!(&pixel.0[..3], &[0, 0, 0]);
        assert!((59..=60).contains(&pixel[3]));
    }

    fn lit_pixels(canvas: &RgbaImage) -> Vec<(u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 0 || p[1] > 0 || p[2] > 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_labels_draw_three_lines_inside_the_band() {
        let font = LabelFont::bundled().unwrap();
        let mut canvas = solid_image(600, 300, Rgba([0, 0, 0, 255]));
        let cell = CellRect { x: 0, y: 0, size: 300 };
        let album =
            AlbumRecord::new("W".repeat(200), "Radiohead".to_string(), 0).with_play_count(412);

        darken_band(&mut canvas, cell);
        draw_labels(&mut canvas, cell, &font, &album);

        let lit = lit_pixels(&canvas);
        for rows in [0..12, 12..24, 24..LABEL_BAND_HEIGHT] {
            assert!(
                lit.iter().any(|(_, y)| rows.contains(y)),
                "no text in rows {:?}",
                rows
            );
        }

        // The long title stops at the cell edge and nothing leaves the band
        assert!(lit.iter().all(|&(x, y)| x < 300 && y < LABEL_BAND_HEIGHT));
        assert!(lit.iter().any(|&(x, _)| x > 250));
    }

    #[test]
    fn test_labels_stay_in_their_own_cell() {
        let font = LabelFont::bundled().unwrap();
        let mut canvas = solid_image(600, 600, Rgba([0, 0, 0, 255]));
        let cell = CellRect { x: 300, y: 300, size: 300 };
        let album =
            AlbumRecord::new("Long ".repeat(80), "Björk".to_string(), 3).with_play_count(7);

        draw_labels(&mut canvas, cell, &font, &album);

        let lit = lit_pixels(&canvas);
        assert!(!lit.is_empty());
        assert!(lit
            .iter()
            .all(|&(x, y)| x >= 300 && (300..300 + LABEL_BAND_HEIGHT).contains(&y)));
    }

    #[test]
    fn test_font_em_is_font_size_pixels() {
        let font = LabelFont::bundled().unwrap();
        let units_per_em = font.font.units_per_em().unwrap();
        let em = units_per_em * font.font.as_scaled(font.scale).h_scale_factor();

        assert!((em - FONT_SIZE).abs() < 0.01, "em is {} px", em);
        assert!(font.scale.y > FONT_SIZE);
    }

    #[test]
    fn test_font_from_shipped_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/static/fonts/DejaVuSans.ttf");

        assert!(LabelFont::from_file(path).is_ok());
    }

    #[test]
    fn test_font_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LabelFont::from_file(dir.path().join("Lato-Medium.ttf"));

        assert!(matches!(result, Err(FontError::Io { .. })));
    }

    #[test]
    fn test_font_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        assert!(matches!(
            LabelFont::from_file(&path),
            Err(FontError::Invalid { .. })
        ));
    }
}
