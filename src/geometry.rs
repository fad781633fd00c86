//! Source plane geometry of regular grids
//!
//! Magnification maps and caustic crossing maps share the same layout: a
//! rectangular region of the source plane described by its center, its
//! half length and its number of pixels along the (y1,y2) axes.
//! Array axis 1 (columns) runs along y1 and array axis 0 (rows) along y2,
//! with row 0 at the top of the map (largest y2).

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("expected 2 coordinates per point, found {0}")]
    PointDimension(usize),
}
type Result<T> = std::result::Result<T, GeometryError>;

/// Converts a pixel coordinate into a point in the source plane along one axis
#[inline]
pub fn pixel_to_point(pixel: f64, center: f64, half_length: f64, num_pixels: usize) -> f64 {
    pixel * 2. * half_length / num_pixels as f64 - half_length + center
}

/// Converts a point in the source plane into a pixel coordinate along one axis
#[inline]
pub fn point_to_pixel(point: f64, center: f64, half_length: f64, num_pixels: usize) -> f64 {
    (point - center + half_length) * num_pixels as f64 / (2. * half_length)
}

/// Regular grid in the source plane, in (y1,y2) axis order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegularGrid {
    pub center: [f64; 2],
    pub half_length: [f64; 2],
    pub num_pixels: [usize; 2],
}
impl RegularGrid {
    pub fn new(center: [f64; 2], half_length: [f64; 2], num_pixels: [usize; 2]) -> Self {
        Self {
            center,
            half_length,
            num_pixels,
        }
    }
    /// Grid matching an array of `(rows, columns)` shape
    pub fn from_shape(shape: (usize, usize), center: [f64; 2], half_length: [f64; 2]) -> Self {
        let (rows, cols) = shape;
        Self::new(center, half_length, [cols, rows])
    }
    /// Array shape `(rows, columns)` of the grid
    pub fn shape(&self) -> (usize, usize) {
        (self.num_pixels[1], self.num_pixels[0])
    }
    /// Physical size of a pixel along y1 and y2
    pub fn pixel_scales(&self) -> [f64; 2] {
        [
            2. * self.half_length[0] / self.num_pixels[0] as f64,
            2. * self.half_length[1] / self.num_pixels[1] as f64,
        ]
    }
    pub fn has_square_pixels(&self) -> bool {
        let [p1, p2] = self.pixel_scales();
        p1 == p2
    }
    /// Maps a (fractional) pixel index `(i,j)` to the point `(y1,y2)`
    pub fn pixel_to_point(&self, pixel: [f64; 2]) -> [f64; 2] {
        [0, 1].map(|k| {
            pixel_to_point(
                pixel[k],
                self.center[k],
                self.half_length[k],
                self.num_pixels[k],
            )
        })
    }
    /// Maps a point `(y1,y2)` back to its (fractional) pixel index
    pub fn point_to_pixel(&self, point: [f64; 2]) -> [f64; 2] {
        [0, 1].map(|k| {
            point_to_pixel(
                point[k],
                self.center[k],
                self.half_length[k],
                self.num_pixels[k],
            )
        })
    }
    /// Maps every pixel index of an array with a trailing axis of size 2
    pub fn pixels_to_points(&self, pixels: &ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        let last = check_pairs(pixels)?;
        let mut points = pixels.to_owned();
        points
            .lanes_mut(Axis(last))
            .into_iter()
            .for_each(|mut lane| {
                let [y1, y2] = self.pixel_to_point([lane[0], lane[1]]);
                lane[0] = y1;
                lane[1] = y2;
            });
        Ok(points)
    }
    /// Valid `(y1_min,y1_max)` and `(y2_min,y2_max)` ranges once a margin of half
    /// the kernel `(rows, columns)` extent is removed from every edge
    pub fn borders(&self, kernel_shape: (usize, usize)) -> [(f64, f64); 2] {
        let (rows, cols) = kernel_shape;
        let y1 = (
            cols as f64 / 2.,
            self.num_pixels[0] as f64 - cols as f64 / 2.,
        );
        let y2 = (
            rows as f64 / 2.,
            self.num_pixels[1] as f64 - rows as f64 / 2.,
        );
        let [y1_min, y2_min] = self.pixel_to_point([y1.0, y2.0]);
        let [y1_max, y2_max] = self.pixel_to_point([y1.1, y2.1]);
        [(y1_min, y1_max), (y2_min, y2_max)]
    }
}

/// Checks that the last axis holds coordinate pairs and returns its index
pub(crate) fn check_pairs(points: &ArrayViewD<'_, f64>) -> Result<usize> {
    match points.shape().last() {
        Some(2) => Ok(points.ndim() - 1),
        Some(&n) => Err(GeometryError::PointDimension(n)),
        None => Err(GeometryError::PointDimension(0)),
    }
}

/// Shape of an array of pairs without its trailing coordinate axis
pub(crate) fn outer_shape(points: &ArrayViewD<'_, f64>) -> IxDyn {
    let shape = points.shape();
    IxDyn(&shape[..shape.len().saturating_sub(1)])
}
