//! Nearest neighbour rotation of 2D arrays
//!
//! The output array is enlarged to hold the whole rotated input; samples
//! falling outside of the input are set to the default value of the array
//! element type.

use nalgebra::{Matrix2, Vector2};
use ndarray::{Array2, ArrayView2};

/// Cosine and sine of an angle in degrees, exact at multiples of 90 degrees
fn cos_sin(angle: f64) -> (f64, f64) {
    let a = angle.rem_euclid(360.);
    match a {
        a if a == 0. => (1., 0.),
        a if a == 90. => (0., 1.),
        a if a == 180. => (-1., 0.),
        a if a == 270. => (0., -1.),
        _ => {
            let (s, c) = a.to_radians().sin_cos();
            (c, s)
        }
    }
}

/// Rotation of the array indices `(row, column)`
fn rotation(angle: f64) -> Matrix2<f64> {
    let (c, s) = cos_sin(angle);
    Matrix2::new(c, s, -s, c)
}

/// Shape of the array holding the rotated input
pub fn rotated_shape(shape: (usize, usize), angle: f64) -> (usize, usize) {
    let rot = rotation(angle);
    let (rows, cols) = (shape.0 as f64, shape.1 as f64);
    let corners = [
        Vector2::new(0., 0.),
        Vector2::new(0., cols),
        Vector2::new(rows, 0.),
        Vector2::new(rows, cols),
    ]
    .map(|corner| rot * corner);
    let ptp = |k: usize| {
        let (min, max) = corners
            .iter()
            .map(|c| c[k])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
                (min.min(x), max.max(x))
            });
        (max - min + 0.5) as usize
    };
    (ptp(0), ptp(1))
}

/// Rotates `input` by `angle` degrees counter-clockwise
pub fn rotate<T: Copy + Default>(input: ArrayView2<'_, T>, angle: f64) -> Array2<T> {
    let rot = rotation(angle);
    let (rows, cols) = input.dim();
    let out_shape = rotated_shape((rows, cols), angle);
    let in_center = Vector2::new(rows as f64 - 1., cols as f64 - 1.) / 2.;
    let out_center = Vector2::new(out_shape.0 as f64 - 1., out_shape.1 as f64 - 1.) / 2.;
    let offset = in_center - rot * out_center;
    let nearest = |x: f64, len: usize| {
        if x >= 0. && x <= len as f64 - 1. {
            Some((x + 0.5).floor() as usize)
        } else {
            None
        }
    };
    Array2::from_shape_fn(out_shape, |(i, j)| {
        let x = rot * Vector2::new(i as f64, j as f64) + offset;
        match (nearest(x[0], rows), nearest(x[1], cols)) {
            (Some(k), Some(l)) => input[[k, l]],
            _ => T::default(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn identity() {
        let a = array![[1, 2, 3], [4, 5, 6]];
        assert_eq!(rotate(a.view(), 0.), a);
        assert_eq!(rotate(a.view(), 360.), a);
        assert_eq!(rotate(a.view(), -360.), a);
    }

    #[test]
    fn quarter_turns() {
        let a = array![[1, 2, 3], [4, 5, 6]];
        assert_eq!(rotate(a.view(), 90.), array![[3, 6], [2, 5], [1, 4]]);
        assert_eq!(rotate(a.view(), -90.), array![[4, 1], [5, 2], [6, 3]]);
        assert_eq!(rotate(a.view(), 180.), array![[6, 5, 4], [3, 2, 1]]);
        assert_eq!(rotate(rotate(a.view(), 90.).view(), -90.), a);
    }

    #[test]
    fn enlarged_canvas() {
        assert_eq!(rotated_shape((10, 10), 45.), (14, 14));
        assert_eq!(rotated_shape((1, 8), 180.), (1, 8));
        let a = Array2::from_elem((10, 10), 1);
        let r = rotate(a.view(), 45.);
        assert_eq!(r.dim(), (14, 14));
        assert_eq!(r[[0, 0]], 0);
        assert_eq!(r[[7, 7]], 1);
    }
}
