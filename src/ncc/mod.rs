//! Caustic crossing counts
//!
//! The number of caustic crossings of a source is computed on a regular grid
//! by an external engine. From that grid, [distances] derives how far a
//! source can travel before the count changes.

use crate::geometry::RegularGrid;
use ndarray::{Array2, ArrayView2};

pub mod distances;
mod edt;
mod rotate;

pub use distances::{closest_distance_per_row, expanding_source, moving_source};
pub use edt::distance_transform;
pub use rotate::{rotate, rotated_shape};

#[derive(thiserror::Error, Debug)]
pub enum NccError {
    #[error("distances require square pixels, found pixel scales of {y1} and {y2}")]
    NonSquarePixels { y1: f64, y2: f64 },
}
type Result<T> = std::result::Result<T, NccError>;

/// Number of caustic crossings on a regular grid
///
/// Row 0 of the counts is at the top of the grid.
#[derive(Debug, Clone)]
pub struct Ncc {
    num_caustic_crossings: Array2<i32>,
    grid: RegularGrid,
}
impl Ncc {
    pub fn new(num_caustic_crossings: Array2<i32>, center: [f64; 2], half_length: [f64; 2]) -> Self {
        let grid = RegularGrid::from_shape(num_caustic_crossings.dim(), center, half_length);
        Self {
            num_caustic_crossings,
            grid,
        }
    }
    pub fn num_caustic_crossings(&self) -> ArrayView2<'_, i32> {
        self.num_caustic_crossings.view()
    }
    pub fn grid(&self) -> &RegularGrid {
        &self.grid
    }
    /// Number of pixels along y1 (columns) and y2 (rows)
    pub fn num_pixels(&self) -> [usize; 2] {
        self.grid.num_pixels
    }
    pub fn pixel_scales(&self) -> [f64; 2] {
        self.grid.pixel_scales()
    }
    /// Size of the square pixels
    pub fn pixel_scale(&self) -> Result<f64> {
        let [y1, y2] = self.pixel_scales();
        if self.grid.has_square_pixels() {
            Ok(y1)
        } else {
            Err(NccError::NonSquarePixels { y1, y2 })
        }
    }
}
