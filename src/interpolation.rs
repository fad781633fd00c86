//! Bilinear sampling of magnification maps
//!
//! The interpolator nodes are the pixel centers of the map. The array is
//! stored flipped and transposed so that both axes of the node grid run in
//! increasing (y1,y2) order.

use crate::geometry::{self, GeometryError, RegularGrid};
use ndarray::{s, Array1, Array2, ArrayD, ArrayView2, ArrayViewD, Axis};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(thiserror::Error, Debug)]
pub enum InterpolationError {
    #[error("{axis} coordinate {value} is outside the valid range [{min}, {max}]")]
    OutOfBounds {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("map of shape {shape:?} does not match a grid of {num_pixels:?} pixels")]
    ShapeMismatch {
        shape: (usize, usize),
        num_pixels: [usize; 2],
    },
    #[error("invalid query points")]
    Points(#[from] GeometryError),
    #[error("failed to shape the samples")]
    Shape(#[from] ndarray::ShapeError),
}
type Result<T> = std::result::Result<T, InterpolationError>;

/// Behavior for queries outside the pixel centers of the map
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    /// Linear extrapolation from the edge cells
    #[default]
    Extrapolate,
    /// Clamp the query to the edge pixel centers
    Clamp,
    /// Return an [InterpolationError::OutOfBounds] error
    Fail,
}

/// Bilinear interpolator over a magnification map
#[derive(Debug, Clone)]
pub struct MagnificationInterpolator {
    // pixel center coordinates along y1 and y2
    y1: Array1<f64>,
    y2: Array1<f64>,
    // values indexed as [y1, y2]
    values: Array2<f64>,
    extrapolation: Extrapolation,
}
impl MagnificationInterpolator {
    /// Creates the interpolator from a map laid out with row 0 at the top
    pub fn new(magnifications: ArrayView2<'_, f64>, grid: &RegularGrid) -> Result<Self> {
        if magnifications.dim() != grid.shape() {
            return Err(InterpolationError::ShapeMismatch {
                shape: magnifications.dim(),
                num_pixels: grid.num_pixels,
            });
        }
        let centers = |k: usize| {
            Array1::from_iter((0..grid.num_pixels[k]).map(|i| {
                geometry::pixel_to_point(
                    i as f64 + 0.5,
                    grid.center[k],
                    grid.half_length[k],
                    grid.num_pixels[k],
                )
            }))
        };
        Ok(Self {
            y1: centers(0),
            y2: centers(1),
            values: magnifications.slice(s![..;-1, ..]).t().to_owned(),
            extrapolation: Extrapolation::default(),
        })
    }
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }
    /// Finds the lower node index and the weight of the upper node along one axis
    fn locate(&self, axis: &'static str, nodes: &Array1<f64>, value: f64) -> Result<(usize, f64)> {
        let n = nodes.len();
        let (min, max) = (nodes[0], nodes[n - 1]);
        let value = match self.extrapolation {
            Extrapolation::Extrapolate => value,
            Extrapolation::Clamp => value.clamp(min, max),
            Extrapolation::Fail if value < min || value > max => {
                return Err(InterpolationError::OutOfBounds {
                    axis,
                    value,
                    min,
                    max,
                })
            }
            Extrapolation::Fail => value,
        };
        if n == 1 {
            return Ok((0, 0.));
        }
        let step = nodes[1] - nodes[0];
        let i = (((value - min) / step).floor().max(0.) as usize).min(n - 2);
        Ok((i, (value - nodes[i]) / (nodes[i + 1] - nodes[i])))
    }
    /// Samples the map at the point `(y1,y2)`
    pub fn sample(&self, point: [f64; 2]) -> Result<f64> {
        let (i, wi) = self.locate("y1", &self.y1, point[0])?;
        let (j, wj) = self.locate("y2", &self.y2, point[1])?;
        let i1 = (i + 1).min(self.y1.len() - 1);
        let j1 = (j + 1).min(self.y2.len() - 1);
        let v = &self.values;
        Ok((1. - wi) * (1. - wj) * v[[i, j]]
            + (1. - wi) * wj * v[[i, j1]]
            + wi * (1. - wj) * v[[i1, j]]
            + wi * wj * v[[i1, j1]])
    }
    /// Samples the map at every point of an array with a trailing axis of size 2
    ///
    /// The output has the shape of `points` without its last axis.
    pub fn query(&self, points: &ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        let last = geometry::check_pairs(points)?;
        let values = points
            .lanes(Axis(last))
            .into_iter()
            .map(|p| self.sample([p[0], p[1]]))
            .collect::<Result<Vec<f64>>>()?;
        Ok(ArrayD::from_shape_vec(geometry::outer_shape(points), values)?)
    }
}
