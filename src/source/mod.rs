//! Source brightness profiles
//!
//! A source is a square kernel of odd side length `2r+1` in map pixels and
//! its weight, the sum of the kernel. A source changing with time is a stack
//! of kernels of identical shape, indexed as `[time, row, column]`, with one
//! weight per kernel.
//! Row 0 of a kernel is its top edge (largest y2), as for the maps.

use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView1, ArrayViewD, Axis, Ix2};

mod gaussian;
pub use gaussian::{Gaussian, Gaussians};
mod uniform_disk;
pub use uniform_disk::{UniformDisk, UniformDisks};

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("kernel #{index} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("no kernel to stack")]
    Empty,
    #[error("minimum radius {min} is larger than maximum radius {max}")]
    Radii { min: usize, max: usize },
    #[error("radius step must be positive")]
    Step,
}
type Result<T> = std::result::Result<T, SourceError>;

/// Kernel(s) and weight(s) of a source
#[derive(Debug, Clone)]
pub enum Profiles<'a> {
    /// A single kernel
    Single {
        profile: ArrayViewD<'a, f64>,
        weight: f64,
    },
    /// Kernels indexed by time
    Stack {
        profiles: ArrayViewD<'a, f64>,
        weights: ArrayView1<'a, f64>,
    },
}
impl<'a> Profiles<'a> {
    /// Number of dimensions of the kernel array
    pub fn ndim(&self) -> usize {
        match self {
            Profiles::Single { profile, .. } => profile.ndim(),
            Profiles::Stack { profiles, .. } => profiles.ndim(),
        }
    }
}

/// Anything that produces source kernel(s) and weight(s)
pub trait SourceProfile {
    fn profiles(&self) -> Profiles<'_>;
}

/// Disk sizes of a stack of radii from `min_radius` to `max_radius` by `step`
pub(crate) fn radii(max_radius: usize, min_radius: usize, step: usize) -> Result<Vec<usize>> {
    if step == 0 {
        return Err(SourceError::Step);
    }
    if min_radius > max_radius {
        return Err(SourceError::Radii {
            min: min_radius,
            max: max_radius,
        });
    }
    Ok((min_radius..=max_radius).step_by(step).collect())
}

/// Squared distances to the center of a `(2r+1)×(2r+1)` kernel
pub(crate) fn squared_radii(max_radius: usize) -> Array2<f64> {
    let r = max_radius as isize;
    let n = 2 * max_radius + 1;
    Array2::from_shape_fn((n, n), |(i, j)| {
        let (y, x) = ((i as isize - r) as f64, (j as isize - r) as f64);
        x * x + y * y
    })
}

/// A user supplied kernel
#[derive(Debug, Clone)]
pub struct Kernel {
    profile: ArrayD<f64>,
    weight: f64,
}
impl Kernel {
    /// Creates a kernel weighted by its sum
    pub fn new(profile: ArrayD<f64>) -> Self {
        let weight = profile.sum();
        Self { profile, weight }
    }
    pub fn with_weight(profile: ArrayD<f64>, weight: f64) -> Self {
        Self { profile, weight }
    }
    pub fn weight(&self) -> f64 {
        self.weight
    }
}
impl From<Array2<f64>> for Kernel {
    fn from(profile: Array2<f64>) -> Self {
        Self::new(profile.into_dyn())
    }
}
impl SourceProfile for Kernel {
    fn profiles(&self) -> Profiles<'_> {
        Profiles::Single {
            profile: self.profile.view(),
            weight: self.weight,
        }
    }
}

/// A user supplied stack of kernels indexed by time
#[derive(Debug, Clone)]
pub struct KernelStack {
    profiles: ArrayD<f64>,
    weights: Array1<f64>,
}
impl KernelStack {
    pub fn with_weights(profiles: ArrayD<f64>, weights: Array1<f64>) -> Self {
        Self { profiles, weights }
    }
    /// Stacks 2D kernels of identical shape, each weighted by its sum
    pub fn from_kernels(kernels: &[Array2<f64>]) -> Result<Self> {
        let first = kernels.first().ok_or(SourceError::Empty)?;
        if let Some((index, kernel)) = kernels
            .iter()
            .enumerate()
            .find(|(_, k)| k.dim() != first.dim())
        {
            return Err(SourceError::ShapeMismatch {
                index,
                expected: first.shape().to_vec(),
                found: kernel.shape().to_vec(),
            });
        }
        let views: Vec<_> = kernels.iter().map(|k| k.view()).collect();
        let profiles = ndarray::stack(Axis(0), &views).map_err(|_| SourceError::Empty)?;
        let weights = kernels.iter().map(|k| k.sum()).collect();
        Ok(Self {
            profiles: profiles.into_dyn(),
            weights,
        })
    }
    /// The same kernel repeated `n` times
    pub fn repeat(kernel: &Array2<f64>, n: usize) -> Self {
        let (rows, cols) = kernel.dim();
        let profiles = Array3::from_shape_fn((n, rows, cols), |(_, i, j)| kernel[[i, j]]);
        Self {
            profiles: profiles.into_dyn(),
            weights: Array1::from_elem(n, kernel.sum()),
        }
    }
    pub fn len(&self) -> usize {
        self.weights.len()
    }
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
    /// The kernel at time index `t`
    pub fn kernel(&self, t: usize) -> Option<Kernel> {
        (t < self.len() && self.profiles.ndim() == 3).then(|| {
            Kernel::with_weight(
                self.profiles.index_axis(Axis(0), t).to_owned(),
                self.weights[t],
            )
        })
    }
}
impl SourceProfile for KernelStack {
    fn profiles(&self) -> Profiles<'_> {
        Profiles::Stack {
            profiles: self.profiles.view(),
            weights: self.weights.view(),
        }
    }
}

/// 2D view of a single kernel, if it is 2D
pub(crate) fn as_2d<'a>(profile: &ArrayViewD<'a, f64>) -> Option<ndarray::ArrayView<'a, f64, Ix2>> {
    profile.clone().into_dimensionality::<Ix2>().ok()
}
