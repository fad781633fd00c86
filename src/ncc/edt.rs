//! Exact Euclidean distance transform
//!
//! Separable lower envelope of parabolas (Felzenszwalb & Huttenlocher),
//! applied along the columns then along the rows of the squared distances.

use ndarray::{Array2, ArrayView2, Axis};

/// Squared distance transform of one line of sampled values
///
/// Sites with an infinite value are not part of the envelope; a line
/// without any finite site stays infinite.
fn squared_line(f: &[f64], d: &mut [f64]) {
    let n = f.len();
    let mut v = vec![0usize; n];
    let mut z = vec![0f64; n + 1];
    let mut sites = (0..n).filter(|&q| f[q].is_finite());
    let Some(first) = sites.next() else {
        d.iter_mut().for_each(|d| *d = f64::INFINITY);
        return;
    };
    let intersection = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2. * qf - 2. * pf)
    };
    let mut k = 0;
    v[0] = first;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in sites {
        let mut s = intersection(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersection(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }
    k = 0;
    for (q, d) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *d = dq * dq + f[v[k]];
    }
}

/// Distance, in pixels, of every `true` pixel to the nearest `false` pixel
///
/// `false` pixels are at distance 0. Without any `false` pixel, every
/// distance is infinite.
pub fn distance_transform(mask: ArrayView2<'_, bool>) -> Array2<f64> {
    let mut d2 = mask.mapv(|inside| if inside { f64::INFINITY } else { 0. });
    for axis in [Axis(0), Axis(1)] {
        let n = d2.len_of(axis);
        let mut line = vec![0f64; n];
        let mut out = vec![0f64; n];
        for mut lane in d2.lanes_mut(axis) {
            line.iter_mut().zip(lane.iter()).for_each(|(l, &x)| *l = x);
            squared_line(&line, &mut out);
            lane.iter_mut().zip(&out).for_each(|(x, &o)| *x = o);
        }
    }
    d2.mapv_inplace(f64::sqrt);
    d2
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn brute_force(mask: &Array2<bool>) -> Array2<f64> {
        let outside: Vec<(usize, usize)> = mask
            .indexed_iter()
            .filter(|(_, &m)| !m)
            .map(|(ij, _)| ij)
            .collect();
        Array2::from_shape_fn(mask.dim(), |(i, j)| {
            if !mask[[i, j]] {
                return 0.;
            }
            outside
                .iter()
                .map(|&(k, l)| {
                    let (di, dj) = (i as f64 - k as f64, j as f64 - l as f64);
                    (di * di + dj * dj).sqrt()
                })
                .fold(f64::INFINITY, f64::min)
        })
    }

    #[test]
    fn single_hole() {
        let mut mask = Array2::from_elem((7, 9), true);
        mask[[3, 4]] = false;
        let d = distance_transform(mask.view());
        assert_eq!(d[[3, 4]], 0.);
        assert_relative_eq!(d[[0, 0]], (9f64 + 16.).sqrt());
        assert_relative_eq!(d[[3, 8]], 4.);
    }

    #[test]
    fn matches_brute_force() {
        let mask = Array2::from_shape_fn((23, 17), |(i, j)| {
            let (x, y) = (j as f64 - 8., i as f64 - 11.);
            (x * x + 2. * y * y < 80. && (i + 3 * j) % 11 != 0) || (i > 18 && j < 4)
        });
        let d = distance_transform(mask.view());
        let expected = brute_force(&mask);
        for (a, b) in d.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn no_background() {
        let d = distance_transform(array![[true, true], [true, true]].view());
        assert!(d.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn empty_mask() {
        let d = distance_transform(array![[false, false, false]].view());
        assert!(d.iter().all(|&d| d == 0.));
    }
}
