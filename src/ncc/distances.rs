//! Distances to a change in the number of caustic crossings
//!
//! Two sources are considered:
//!  * an expanding source, for which the distance is isotropic,
//!  * a moving source, for which the distance is measured along the
//!    direction of travel.
//!
//! Both require square pixels and return physical distances on the grid of
//! the counts.

use super::{edt::distance_transform, rotate::rotate, Ncc, Result};
use itertools::Itertools;
use ndarray::{Array2, ArrayView2, Axis, Zip};
use rayon::prelude::*;
use std::time::Instant;

/// Distance from every pixel to the nearest pixel with a different count
///
/// If the counts take a single value, the distances are infinite.
pub fn expanding_source(ncc: &Ncc) -> Result<Array2<f64>> {
    let pixel_scale = ncc.pixel_scale()?;
    let counts = ncc.num_caustic_crossings();
    let levels: Vec<i32> = counts.iter().copied().unique().collect();
    log::info!("distances for {} caustic crossings levels", levels.len());
    let now = Instant::now();
    // levels are disjoint, so every pixel is written by exactly one level
    let mut d_caustic = levels
        .into_par_iter()
        .fold(
            || Array2::<f64>::zeros(counts.dim()),
            |mut d_caustic, level| {
                let mask = counts.mapv(|n| n == level);
                let distances = distance_transform(mask.view());
                Zip::from(&mut d_caustic)
                    .and(&distances)
                    .and(&mask)
                    .for_each(|d, &distance, &m| {
                        if m {
                            *d = distance
                        }
                    });
                d_caustic
            },
        )
        .reduce(
            || Array2::<f64>::zeros(counts.dim()),
            |mut a, b| {
                a += &b;
                a
            },
        );
    d_caustic *= pixel_scale;
    log::info!(" ... in {}ms", now.elapsed().as_millis());
    Ok(d_caustic)
}

/// Distance along `angle`, in degrees from the y1 axis, to the next change
/// of the number of caustic crossings
///
/// The counts are rotated so that the direction of travel points along the
/// rows towards the first column, the distances are computed row by row and
/// rotated back before being cropped to the shape of the counts. The
/// rotations are nearest neighbour, so the distances along a direction that
/// is not aligned with the grid are approximate.
pub fn moving_source(ncc: &Ncc, angle: f64) -> Result<Array2<f64>> {
    let pixel_scale = ncc.pixel_scale()?;
    let counts = ncc.num_caustic_crossings();
    let now = Instant::now();
    let rotated = rotate(counts, -(angle + 180.));
    let distances = closest_distance_per_row(rotated.view());
    let d_caustic = rotate(distances.view(), angle + 180.);
    log::debug!(
        "counts {:?} rotated to {:?} and back to {:?}",
        counts.dim(),
        rotated.dim(),
        d_caustic.dim()
    );

    let (rows, cols) = counts.dim();
    let dy1 = d_caustic.ncols().saturating_sub(cols) / 2;
    let dy2 = d_caustic.nrows().saturating_sub(rows) / 2;
    let cropped = Array2::from_shape_fn((rows, cols), |(i, j)| {
        d_caustic.get([i + dy2, j + dy1]).copied().unwrap_or_default() * pixel_scale
    });
    log::info!(
        "distances along {angle} degrees in {}ms",
        now.elapsed().as_millis()
    );
    Ok(cropped)
}

/// Distance, in pixels, from the center of every pixel to the closest
/// change of value on its left
///
/// The left border of a row counts as a change, so the smallest distance
/// is half a pixel: the row `[1,2,2,1,1,2,2,2]` gives
/// `[0.5,0.5,1.5,0.5,1.5,0.5,1.5,2.5]`.
pub fn closest_distance_per_row<T: PartialEq + Sync>(a: ArrayView2<'_, T>) -> Array2<f64> {
    let mut distances = Array2::<f64>::zeros(a.dim());
    Zip::from(distances.lanes_mut(Axis(1)))
        .and(a.lanes(Axis(1)))
        .par_for_each(|mut d, row| {
            let mut start = 0;
            for j in 0..row.len() {
                if j > 0 && row[j] != row[j - 1] {
                    start = j;
                }
                d[j] = (j - start) as f64 + 0.5;
            }
        });
    distances
}
