//! Light curves of finite sources
//!
//! The magnification of a finite source at a position of a magnification map
//! is the average of the map over the source footprint, weighted by the
//! source profile. Two paths are available:
//!  - [LightCurves::constant_source] cross-correlates the whole map with a
//!    single profile once and samples the correlated map at the positions,
//!  - [LightCurves::changing_source] handles a stack of profiles by sampling
//!    the magnification map over the footprint of each position and summing it
//!    with every profile of the stack, which avoids one correlation per
//!    time step.
//!
//! Both paths give the same magnifications for the same profile.

use crate::{
    geometry::{self, GeometryError},
    interpolation::{Extrapolation, InterpolationError, MagnificationInterpolator},
    magmap::MagMap,
    source::{as_2d, Profiles, SourceProfile},
};
use ndarray::{Array, Array1, Array2, ArrayD, ArrayView2, ArrayViewD, Axis, Dimension, Ix3, IxDyn};
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;

mod correlate;
pub use correlate::correlate2d;
pub mod util;

#[derive(thiserror::Error, Debug)]
pub enum LightCurveError {
    #[error("source profile must be a {expected}D array, found {found}D")]
    ProfileDimension { expected: usize, found: usize },
    #[error("there are {0} coordinates per position instead of 2")]
    PositionDimension(usize),
    #[error("provided positions do not lie within the necessary border")]
    OutsideBorder,
    #[error("{profiles} source profiles but {weights} weights")]
    WeightCount { profiles: usize, weights: usize },
    #[error("a kernel of shape {kernel_shape:?} leaves no valid position in a map of {num_pixels:?} pixels")]
    EmptyBorder {
        kernel_shape: Vec<usize>,
        num_pixels: [usize; 2],
    },
    #[error("failed to sample the magnification map")]
    Interpolation(#[from] InterpolationError),
    #[error("failed to shape the light curves")]
    Shape(#[from] ndarray::ShapeError),
}
type Result<T> = std::result::Result<T, LightCurveError>;

impl From<GeometryError> for LightCurveError {
    fn from(value: GeometryError) -> Self {
        match value {
            GeometryError::PointDimension(n) => LightCurveError::PositionDimension(n),
        }
    }
}

/// Source positions
#[derive(Debug, Clone)]
pub enum Positions {
    /// a number of random positions
    Random(usize),
    /// positions as an array with a trailing axis of `(y1,y2)` pairs
    Given(ArrayD<f64>),
}
impl From<usize> for Positions {
    fn from(num: usize) -> Self {
        Positions::Random(num)
    }
}
impl<D: Dimension> From<Array<f64, D>> for Positions {
    fn from(positions: Array<f64, D>) -> Self {
        Positions::Given(positions.into_dyn())
    }
}
impl From<[f64; 2]> for Positions {
    fn from(position: [f64; 2]) -> Self {
        Positions::Given(Array1::from(position.to_vec()).into_dyn())
    }
}
impl From<Vec<[f64; 2]>> for Positions {
    fn from(positions: Vec<[f64; 2]>) -> Self {
        Positions::Given(Array2::from(positions).into_dyn())
    }
}

/// Magnifications and, if requested, the positions they were computed at
#[derive(Debug, Clone)]
pub struct LightCurve {
    pub magnifications: ArrayD<f64>,
    pub positions: Option<ArrayD<f64>>,
}

/// Light curve builder for a magnification map
pub struct LightCurves<'a> {
    magmap: &'a MagMap,
    extrapolation: Extrapolation,
    return_positions: bool,
}
impl<'a> LightCurves<'a> {
    pub fn new(magmap: &'a MagMap) -> Self {
        Self {
            magmap,
            extrapolation: Extrapolation::default(),
            return_positions: false,
        }
    }
    /// Sets how the map is sampled beyond its outer pixel centers
    pub fn extrapolation(self, extrapolation: Extrapolation) -> Self {
        Self {
            extrapolation,
            ..self
        }
    }
    /// Returns the positions alongside the magnifications
    pub fn return_positions(self, return_positions: bool) -> Self {
        Self {
            return_positions,
            ..self
        }
    }
    fn positions<R: Rng + ?Sized>(
        &self,
        positions: Positions,
        kernel_shape: &[usize],
        rng: &mut R,
    ) -> Result<ArrayD<f64>> {
        let grid = self.magmap.grid();
        match positions {
            Positions::Random(num) => util::random_position(grid, kernel_shape, num, rng),
            Positions::Given(positions) => {
                let positions = if positions.ndim() == 0 {
                    positions.into_shape(IxDyn(&[1]))?
                } else {
                    positions
                };
                if util::valid_positions(&positions.view(), grid, kernel_shape)? {
                    Ok(positions)
                } else {
                    Err(LightCurveError::OutsideBorder)
                }
            }
        }
    }
    fn light_curve(&self, magnifications: ArrayD<f64>, positions: ArrayD<f64>) -> LightCurve {
        LightCurve {
            magnifications,
            positions: self.return_positions.then_some(positions),
        }
    }
    /// Magnifications of a source with a constant profile at the given positions
    ///
    /// The output has the shape of the positions without their last axis.
    pub fn constant_source<S, R>(
        &self,
        source: &S,
        positions: impl Into<Positions>,
        rng: &mut R,
    ) -> Result<LightCurve>
    where
        S: SourceProfile + ?Sized,
        R: Rng + ?Sized,
    {
        let (profile, weight) = match source.profiles() {
            Profiles::Single { profile, weight } => (
                as_2d(&profile).ok_or(LightCurveError::ProfileDimension {
                    expected: 2,
                    found: profile.ndim(),
                })?,
                weight,
            ),
            profiles => {
                return Err(LightCurveError::ProfileDimension {
                    expected: 2,
                    found: profiles.ndim(),
                })
            }
        };
        let positions = self.positions(positions.into(), profile.shape(), rng)?;

        let now = Instant::now();
        let mut correlated = correlate2d(self.magmap.magnifications(), profile);
        correlated.mapv_inplace(|x| x / weight);
        log::info!(
            "{:?} map correlated with a {:?} profile in {}ms",
            correlated.dim(),
            profile.dim(),
            now.elapsed().as_millis()
        );

        let interp = MagnificationInterpolator::new(correlated.view(), self.magmap.grid())?
            .with_extrapolation(self.extrapolation);
        let magnifications = interp.query(&positions.view())?;
        Ok(self.light_curve(magnifications, positions))
    }
    /// Magnifications of a source with a profile changing with time at the given positions
    ///
    /// The output has the shape of the positions with their last axis
    /// replaced by the time axis of the profile stack.
    /// Row 0 of every profile is sampled at the largest y2 of the footprint,
    /// as the constant source path does; sampling the rows in ascending y2
    /// instead would flip vertically asymmetric profiles.
    pub fn changing_source<S, R>(
        &self,
        source: &S,
        positions: impl Into<Positions>,
        rng: &mut R,
    ) -> Result<LightCurve>
    where
        S: SourceProfile + ?Sized,
        R: Rng + ?Sized,
    {
        let (profiles, weights) = match source.profiles() {
            Profiles::Stack { profiles, weights } => (
                profiles.clone().into_dimensionality::<Ix3>().map_err(|_| {
                    LightCurveError::ProfileDimension {
                        expected: 3,
                        found: profiles.ndim(),
                    }
                })?,
                weights,
            ),
            profiles => {
                return Err(LightCurveError::ProfileDimension {
                    expected: 3,
                    found: profiles.ndim(),
                })
            }
        };
        let (n_time, rows, cols) = profiles.dim();
        if weights.len() != n_time {
            return Err(LightCurveError::WeightCount {
                profiles: n_time,
                weights: weights.len(),
            });
        }
        let positions = self.positions(positions.into(), &[rows, cols], rng)?;

        let grid = self.magmap.grid();
        let interp = MagnificationInterpolator::new(self.magmap.magnifications(), grid)?
            .with_extrapolation(self.extrapolation);

        // footprint pixel centers relative to the source center, the first
        // row of a profile being its top edge
        let [p1, p2] = grid.pixel_scales();
        let dy1: Vec<f64> = (0..cols)
            .map(|j| (j as f64 + 0.5 - cols as f64 / 2.) * p1)
            .collect();
        let dy2: Vec<f64> = (0..rows)
            .map(|i| (rows as f64 / 2. - (i as f64 + 0.5)) * p2)
            .collect();

        let last = positions.ndim() - 1;
        let centers: Vec<[f64; 2]> = positions
            .lanes(Axis(last))
            .into_iter()
            .map(|p| [p[0], p[1]])
            .collect();
        log::debug!(
            "sampling {} positions with {} profiles of shape {:?}",
            centers.len(),
            n_time,
            (rows, cols)
        );

        let now = Instant::now();
        let magnifications = centers
            .par_iter()
            .map(|&[y1, y2]| -> Result<Vec<f64>> {
                let mut footprint = Array2::<f64>::zeros((rows, cols));
                for ((i, j), mu) in footprint.indexed_iter_mut() {
                    *mu = interp.sample([y1 + dy1[j], y2 + dy2[i]])?;
                }
                Ok(weighted_sums(&footprint.view(), &profiles.view(), &weights.view()))
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;
        log::info!(
            "{} footprints summed over {} profiles in {}ms",
            centers.len(),
            n_time,
            now.elapsed().as_millis()
        );

        let mut shape = positions.shape().to_vec();
        shape[last] = n_time;
        let magnifications = ArrayD::from_shape_vec(
            IxDyn(&shape),
            magnifications.into_iter().flatten().collect(),
        )?;
        Ok(self.light_curve(magnifications, positions))
    }
}

/// Sums of a footprint weighted by each profile, normalized by the profile weights
fn weighted_sums(
    footprint: &ArrayView2<'_, f64>,
    profiles: &ndarray::ArrayView3<'_, f64>,
    weights: &ndarray::ArrayView1<'_, f64>,
) -> Vec<f64> {
    profiles
        .outer_iter()
        .zip(weights.iter())
        .map(|(profile, &weight)| (&profile * footprint).sum() / weight)
        .collect()
}

/// Magnifications of a constant source, see [LightCurves::constant_source]
pub fn constant_source<S, R>(
    magmap: &MagMap,
    source: &S,
    positions: impl Into<Positions>,
    return_positions: bool,
    rng: &mut R,
) -> Result<LightCurve>
where
    S: SourceProfile + ?Sized,
    R: Rng + ?Sized,
{
    LightCurves::new(magmap)
        .return_positions(return_positions)
        .constant_source(source, positions, rng)
}

/// Magnifications of a changing source, see [LightCurves::changing_source]
pub fn changing_source<S, R>(
    magmap: &MagMap,
    source: &S,
    positions: impl Into<Positions>,
    return_positions: bool,
    rng: &mut R,
) -> Result<LightCurve>
where
    S: SourceProfile + ?Sized,
    R: Rng + ?Sized,
{
    LightCurves::new(magmap)
        .return_positions(return_positions)
        .changing_source(source, positions, rng)
}

/// Samples the map at positions without any source smoothing
pub fn point_source(magmap: &MagMap, positions: &ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
    let interp = MagnificationInterpolator::new(magmap.magnifications(), magmap.grid())?;
    geometry::check_pairs(positions)?;
    Ok(interp.query(positions)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        magmap::MagMapParams,
        source::{Gaussian, Gaussians, Kernel, KernelStack, UniformDisk, UniformDisks},
    };
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{rngs::StdRng, SeedableRng};

    // smooth but structured map on a 64x48 grid of 0.25 pixels
    fn magmap() -> MagMap {
        let map = Array2::from_shape_fn((48, 64), |(i, j)| {
            let (x, y) = (j as f64 * 0.3, i as f64 * 0.2);
            1. + x.sin().powi(2) + 0.5 * (x * y).cos().abs() + 0.01 * (i * j) as f64
        });
        MagMap::new(map, MagMapParams::new([1., -2.], [8., 6.]))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    #[test]
    fn point_kernel_is_identity() {
        let magmap = magmap();
        let mut rng = rng();
        let source = UniformDisk::new(0, None);
        let lc = LightCurves::new(&magmap)
            .return_positions(true)
            .constant_source(&source, 50usize, &mut rng)
            .unwrap();
        let positions = lc.positions.unwrap();
        let direct = point_source(&magmap, &positions.view()).unwrap();
        assert_eq!(lc.magnifications.shape(), &[50]);
        for (a, b) in lc.magnifications.iter().zip(direct.iter()) {
            assert_relative_eq!(a, b, max_relative = 1e-12);
        }
    }

    #[test]
    fn constant_map_is_preserved() {
        let magmap = MagMap::new(
            Array2::from_elem((40, 40), 3.7),
            MagMapParams::new([0., 0.], [10., 10.]),
        );
        let mut rng = rng();
        for source in [Gaussian::new(5, None), Gaussian::new(2, Some(6))] {
            let lc = constant_source(&magmap, &source, 20usize, false, &mut rng).unwrap();
            assert!(lc.positions.is_none());
            lc.magnifications
                .iter()
                .for_each(|&mu| assert_relative_eq!(mu, 3.7, max_relative = 1e-12));
        }
    }

    #[test]
    fn correlation_not_convolution() {
        // an off-center kernel picks the map value one pixel to the right (+y1)
        let magmap = magmap();
        let kernel = Kernel::from(array![[0., 0., 0.], [0., 0., 1.], [0., 0., 0.]]);
        let position = [1.1, -2.3];
        let lc = constant_source(&magmap, &kernel, position, false, &mut rng()).unwrap();
        let shifted = array![position[0] + 0.25, position[1]].into_dyn();
        let expected = point_source(&magmap, &shifted.view()).unwrap();
        assert_relative_eq!(lc.magnifications[[]], expected[[]], max_relative = 1e-12);
    }

    #[test]
    fn cross_path_consistency() {
        let magmap = magmap();
        let positions = array![[[0.3, -1.7], [2.2, 0.4]], [[-3.1, -4.], [5.5, 1.25]]];
        // asymmetric along both axes
        let kernel = array![
            [0., 1., 2., 0., 0.],
            [0., 3., 1., 0., 0.],
            [1., 1., 4., 1., 0.],
            [0., 2., 1., 0., 0.],
            [0., 0., 0., 0., 0.5]
        ];
        let stack = KernelStack::repeat(&kernel, 3);
        let constant =
            constant_source(&magmap, &Kernel::from(kernel), positions.clone(), false, &mut rng())
                .unwrap();
        let changing = changing_source(&magmap, &stack, positions, false, &mut rng()).unwrap();
        assert_eq!(changing.magnifications.shape(), &[2, 2, 3]);
        for idx in [[0, 0], [0, 1], [1, 0], [1, 1]] {
            for t in 0..3 {
                assert_relative_eq!(
                    changing.magnifications[[idx[0], idx[1], t]],
                    constant.magnifications[[idx[0], idx[1]]],
                    max_relative = 1e-10
                );
            }
        }
    }

    #[test]
    fn expanding_disk_matches_single_disks() {
        let magmap = magmap();
        let disks = UniformDisks::new(3, 0, 1).unwrap();
        let positions = array![[0., -2.], [3.3, 1.1]];
        let lc = LightCurves::new(&magmap)
            .return_positions(true)
            .changing_source(&disks, positions.clone(), &mut rng())
            .unwrap();
        assert_eq!(lc.positions.unwrap(), positions.clone().into_dyn());
        for (t, &r) in disks.radii.iter().enumerate() {
            let disk = UniformDisk::new(r, Some(3));
            let single = constant_source(&magmap, &disk, positions.clone(), false, &mut rng()).unwrap();
            for k in 0..2 {
                assert_relative_eq!(
                    lc.magnifications[[k, t]],
                    single.magnifications[[k]],
                    max_relative = 1e-10
                );
            }
        }
    }

    #[test]
    fn single_position_shape() {
        let magmap = magmap();
        let gaussians = Gaussians::new(3, 1, 1).unwrap();
        let lc = changing_source(&magmap, &gaussians, 1usize, true, &mut rng()).unwrap();
        assert_eq!(lc.magnifications.shape(), &[3]);
        assert_eq!(lc.positions.unwrap().shape(), &[2]);
    }

    #[test]
    fn profile_dimension_errors() {
        let magmap = magmap();
        let stack = UniformDisks::new(2, 0, 1).unwrap();
        assert!(matches!(
            constant_source(&magmap, &stack, 1usize, false, &mut rng()),
            Err(LightCurveError::ProfileDimension {
                expected: 2,
                found: 3
            })
        ));
        let disk = UniformDisk::new(2, None);
        assert!(matches!(
            changing_source(&magmap, &disk, 1usize, false, &mut rng()),
            Err(LightCurveError::ProfileDimension {
                expected: 3,
                found: 2
            })
        ));
        let flat = Kernel::new(Array1::ones(5).into_dyn());
        assert!(matches!(
            constant_source(&magmap, &flat, 1usize, false, &mut rng()),
            Err(LightCurveError::ProfileDimension {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn weight_count_error() {
        let magmap = magmap();
        let stack = KernelStack::with_weights(
            ndarray::Array3::ones((3, 3, 3)).into_dyn(),
            Array1::ones(2),
        );
        assert!(matches!(
            changing_source(&magmap, &stack, 1usize, false, &mut rng()),
            Err(LightCurveError::WeightCount {
                profiles: 3,
                weights: 2
            })
        ));
    }

    #[test]
    fn positions_outside_border() {
        let magmap = magmap();
        let disk = UniformDisk::new(3, None);
        // the map spans [-7,9] along y1
        assert!(matches!(
            constant_source(&magmap, &disk, [8.9, -2.], false, &mut rng()),
            Err(LightCurveError::OutsideBorder)
        ));
        assert!(matches!(
            constant_source(&magmap, &disk, array![[0., 0., 0.]], false, &mut rng()),
            Err(LightCurveError::PositionDimension(3))
        ));
        let disks = UniformDisks::new(3, 0, 1).unwrap();
        assert!(matches!(
            changing_source(&magmap, &disks, vec![[0., 0.], [-6.5, 0.]], false, &mut rng()),
            Err(LightCurveError::OutsideBorder)
        ));
    }

    #[test]
    fn zero_weight_propagates() {
        let magmap = magmap();
        let kernel = Kernel::from(Array2::zeros((3, 3)));
        let lc = constant_source(&magmap, &kernel, [1., -2.], false, &mut rng()).unwrap();
        assert!(lc.magnifications[[]].is_nan());
    }
}
