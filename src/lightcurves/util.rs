//! Positions of a source on a magnification map

use super::{LightCurveError, Result};
use crate::geometry::RegularGrid;
use ndarray::{Array1, ArrayD, ArrayViewD, Axis, IxDyn};
use rand::Rng;

/// Inner border of the map once a region the size of the kernel is removed around its edge
///
/// Returns `(y1_min, y1_max)` and `(y2_min, y2_max)`.
pub fn borders(grid: &RegularGrid, kernel_shape: &[usize]) -> Result<[(f64, f64); 2]> {
    match kernel_shape {
        &[rows, cols] => Ok(grid.borders((rows, cols))),
        _ => Err(LightCurveError::ProfileDimension {
            expected: 2,
            found: kernel_shape.len(),
        }),
    }
}

/// Draws `num` uniformly distributed positions inside the borders of the map
///
/// A single position is returned as a `(y1,y2)` pair of shape `[2]`, several
/// positions as an array of shape `[num, 2]`.
pub fn random_position<R: Rng + ?Sized>(
    grid: &RegularGrid,
    kernel_shape: &[usize],
    num: usize,
    rng: &mut R,
) -> Result<ArrayD<f64>> {
    let [(y1_min, y1_max), (y2_min, y2_max)] = borders(grid, kernel_shape)?;
    if !(y1_min < y1_max && y2_min < y2_max) {
        return Err(LightCurveError::EmptyBorder {
            kernel_shape: kernel_shape.to_vec(),
            num_pixels: grid.num_pixels,
        });
    }
    let y1: Array1<f64> = (0..num).map(|_| rng.gen_range(y1_min..y1_max)).collect();
    let y2: Array1<f64> = (0..num).map(|_| rng.gen_range(y2_min..y2_max)).collect();
    let positions = ndarray::stack(Axis(1), &[y1.view(), y2.view()])?.into_dyn();
    Ok(if num == 1 {
        positions.into_shape(IxDyn(&[2]))?
    } else {
        positions
    })
}

/// Checks that every position lies strictly inside the borders of the map for the given kernel
pub fn valid_positions(
    positions: &ArrayViewD<'_, f64>,
    grid: &RegularGrid,
    kernel_shape: &[usize],
) -> Result<bool> {
    let [(y1_min, y1_max), (y2_min, y2_max)] = borders(grid, kernel_shape)?;
    let last = match positions.shape().last() {
        Some(2) => positions.ndim() - 1,
        Some(&n) => return Err(LightCurveError::PositionDimension(n)),
        None => return Err(LightCurveError::PositionDimension(0)),
    };
    Ok(positions.lanes(Axis(last)).into_iter().all(|p| {
        p[0] > y1_min && p[0] < y1_max && p[1] > y2_min && p[1] < y2_max
    }))
}
