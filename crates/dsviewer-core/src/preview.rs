//! Downscaled colour previews of image files for terminal display.
//!
//! Each terminal cell shows two vertically stacked pixels (an upper half-block
//! glyph with foreground and background colours), so a preview of `rows` text
//! rows holds `2 * rows` pixel rows.

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;

use crate::Result;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePreview {
    /// Dimensions of the source image.
    pub source_width: u32,
    pub source_height: u32,
    /// Preview size in terminal cells.
    pub cols: u16,
    pub rows: u16,
    /// Row-major `cols x (2 * rows)` pixels.
    pixels: Vec<Rgb>,
}

impl ImagePreview {
    /// Decode `path` and fit it into `max_cols x max_rows` cells.
    pub fn load(path: &Path, max_cols: u16, max_rows: u16) -> Result<Self> {
        let img = image::open(path)?;
        tracing::debug!(
            "decoded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(Self::from_image(&img, max_cols, max_rows))
    }

    pub fn from_image(img: &DynamicImage, max_cols: u16, max_rows: u16) -> Self {
        let (w, h) = (img.width().max(1), img.height().max(1));
        let max_w = u32::from(max_cols.max(1));
        let max_h = u32::from(max_rows.max(1)) * 2;

        let scale = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
        let nw = ((w as f32 * scale).round() as u32).clamp(1, max_w);
        let nh = ((h as f32 * scale).round() as u32).clamp(1, max_h);

        let small = img.resize_exact(nw, nh, FilterType::Triangle).to_rgb8();
        let rows = nh.div_ceil(2);
        let mut pixels = Vec::with_capacity((nw * rows * 2) as usize);
        for y in 0..rows * 2 {
            for x in 0..nw {
                let px = if y < nh { small.get_pixel(x, y).0 } else { [0, 0, 0] };
                pixels.push(px);
            }
        }

        Self {
            source_width: img.width(),
            source_height: img.height(),
            cols: nw as u16,
            rows: rows as u16,
            pixels,
        }
    }

    /// `(upper, lower)` pixel colours of one cell.
    pub fn cell(&self, col: u16, row: u16) -> Option<(Rgb, Rgb)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let stride = self.cols as usize;
        let top = (row as usize * 2) * stride + col as usize;
        let bottom = top + stride;
        Some((self.pixels[top], self.pixels[bottom]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb as Px, RgbImage};

    fn checker(w: u32, h: u32) -> DynamicImage {
        let img = RgbImage::from_fn(w, h, |x, _| {
            if x < w / 2 { Px([255, 0, 0]) } else { Px([0, 0, 255]) }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn preview_fits_bounds_and_keeps_aspect() {
        let preview = ImagePreview::from_image(&checker(400, 200), 40, 20);
        assert_eq!(preview.cols, 40);
        assert_eq!(preview.rows, 10);
        assert_eq!((preview.source_width, preview.source_height), (400, 200));
    }

    #[test]
    fn cell_colours_follow_source() {
        let preview = ImagePreview::from_image(&checker(100, 100), 10, 10);
        let (top, bottom) = preview.cell(0, 0).unwrap();
        assert_eq!(top, [255, 0, 0]);
        assert_eq!(bottom, [255, 0, 0]);
        let (top, _) = preview.cell(preview.cols - 1, 0).unwrap();
        assert_eq!(top, [0, 0, 255]);
        assert!(preview.cell(preview.cols, 0).is_none());
    }

    #[test]
    fn load_round_trips_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        checker(8, 6).save(&path).unwrap();
        let preview = ImagePreview::load(&path, 4, 4).unwrap();
        assert_eq!((preview.source_width, preview.source_height), (8, 6));
        assert!(preview.cols <= 4 && preview.rows <= 4);
    }

    #[test]
    fn load_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(ImagePreview::load(&path, 4, 4).is_err());
    }
}
