//! Work grid sampling from rendered hours-of-rest sheets
//!
//! Each day row of a sheet carries 48 half-hour cells, shaded where the
//! seafarer was working. The cells are read by sampling one pixel per
//! cell at the coordinates in [`GridGeometry`].

use crate::config::GridGeometry;
use crate::constants::HALF_HOUR_SLOTS;
use image::RgbImage;
use tracing::{debug, warn};

/// Work cells per day; None where a row fell outside the image
#[derive(Debug, Clone, PartialEq)]
pub struct WorkGrid {
    rows: Vec<Option<[bool; HALF_HOUR_SLOTS]>>,
}

impl WorkGrid {
    /// Sample `rows` day rows from a rendered page
    pub fn sample(image: &RgbImage, rows: usize, geometry: &GridGeometry) -> Self {
        let (width, height) = image.dimensions();
        let mut sampled = Vec::with_capacity(rows);

        for row in 0..rows {
            let y = geometry.origin_y as u64 + row as u64 * geometry.row_pitch as u64;
            let in_bounds = y < height as u64
                && geometry.columns.len() == HALF_HOUR_SLOTS
                && geometry.columns.iter().all(|&x| x < width);

            if !in_bounds {
                debug!("Grid row {} at y={} lies outside {}x{} page", row, y, width, height);
                sampled.push(None);
                continue;
            }

            let mut cells = [false; HALF_HOUR_SLOTS];
            for (cell, &x) in cells.iter_mut().zip(&geometry.columns) {
                let pixel = image.get_pixel(x, y as u32);
                *cell = is_work_pixel(pixel.0);
            }
            sampled.push(Some(cells));
        }

        let missing = sampled.iter().filter(|row| row.is_none()).count();
        if missing > 0 {
            warn!(
                "{} of {} grid rows could not be sampled; check grid geometry and raster DPI",
                missing, rows
            );
        }

        Self { rows: sampled }
    }

    /// Hours worked on a day row: one half hour per shaded cell
    pub fn hours_worked(&self, row: usize) -> Option<f64> {
        self.rows
            .get(row)
            .copied()
            .flatten()
            .map(|cells| cells.iter().filter(|&&worked| worked).count() as f64 / 2.0)
    }

    /// Raw cell flags for a day row
    pub fn cells(&self, row: usize) -> Option<&[bool; HALF_HOUR_SLOTS]> {
        self.rows.get(row).and_then(|cells| cells.as_ref())
    }

    /// Day rows sampled, including those outside the image
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<Option<[bool; HALF_HOUR_SLOTS]>>) -> Self {
        Self { rows }
    }
}

/// Shaded cells are those where no channel is fully white
fn is_work_pixel([r, g, b]: [u8; 3]) -> bool {
    r != 255 && g != 255 && b != 255
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// White page with the given half-hour cells shaded on each row
    fn render_grid(geometry: &GridGeometry, shaded: &[&[usize]]) -> RgbImage {
        let height = geometry.origin_y + geometry.row_pitch * shaded.len() as u32 + 10;
        let width = geometry.columns.iter().max().copied().unwrap_or(0) + 10;
        let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

        for (row, cells) in shaded.iter().enumerate() {
            let y = geometry.origin_y + geometry.row_pitch * row as u32;
            for &cell in cells.iter() {
                image.put_pixel(geometry.columns[cell], y, Rgb([40, 80, 160]));
            }
        }
        image
    }

    #[test]
    fn test_hours_from_shaded_cells() {
        let geometry = GridGeometry::default();
        let first: Vec<usize> = (16..32).collect(); // 08:00 to 16:00
        let second: Vec<usize> = vec![0, 1, 47];
        let image = render_grid(&geometry, &[first.as_slice(), second.as_slice(), &[]]);

        let grid = WorkGrid::sample(&image, 3, &geometry);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.hours_worked(0), Some(8.0));
        assert_eq!(grid.hours_worked(1), Some(1.5));
        assert_eq!(grid.hours_worked(2), Some(0.0));
        assert_eq!(grid.hours_worked(3), None);
        assert!(grid.cells(1).unwrap()[47]);
    }

    #[test]
    fn test_rows_outside_image_are_unknown() {
        let geometry = GridGeometry::default();
        let image = render_grid(&geometry, &[&[5]]);

        // The rendered page has room for two rows below the origin
        let grid = WorkGrid::sample(&image, 4, &geometry);
        assert_eq!(grid.hours_worked(0), Some(0.5));
        assert_eq!(grid.hours_worked(1), Some(0.0));
        assert_eq!(grid.hours_worked(2), None);
        assert_eq!(grid.hours_worked(3), None);
    }

    #[test]
    fn test_partially_white_pixel_is_rest() {
        assert!(!is_work_pixel([255, 0, 0]));
        assert!(!is_work_pixel([255, 255, 255]));
        assert!(is_work_pixel([0, 0, 0]));
    }
}
