//! Chromatic microlensing of a supernova
//!
//! The magnification of a time varying source is tabulated against the
//! phase of the source and, optionally, the wavelength; it is applied to a
//! flux model sampled on the same phases and wavelengths.

use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, Axis, Ix1, Ix2};

#[derive(thiserror::Error, Debug)]
pub enum ChromaticError {
    #[error("{name} is expected to be a {expected}D array, found {found}D")]
    Dimension {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("magnifications of shape {mu:?} do not match {phases} phases and {wavelengths} wavelengths")]
    ShapeMismatch {
        mu: Vec<usize>,
        phases: usize,
        wavelengths: usize,
    },
    #[error("{0} must be strictly increasing")]
    NotAscending(&'static str),
    #[error("{axis} {value} is outside [{min},{max}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("flux of shape {found:?} does not match {expected:?} (phases, wavelengths)")]
    FluxShape {
        expected: (usize, usize),
        found: (usize, usize),
    },
}
type Result<T> = std::result::Result<T, ChromaticError>;

/// Lower node index and fractional offset of `value` on `axis`
fn locate(name: &'static str, axis: &Array1<f64>, value: f64) -> Result<(usize, f64)> {
    let n = axis.len();
    let (min, max) = (axis[0], axis[n - 1]);
    if !(value >= min && value <= max) {
        return Err(ChromaticError::OutOfRange {
            axis: name,
            value,
            min,
            max,
        });
    }
    if n == 1 {
        return Ok((0, 0.));
    }
    let i = axis
        .as_slice()
        .map_or_else(
            || axis.iter().filter(|&&x| x <= value).count(),
            |x| x.partition_point(|&x| x <= value),
        )
        .saturating_sub(1)
        .min(n - 2);
    Ok((i, (value - axis[i]) / (axis[i + 1] - axis[i])))
}

fn ascending(name: &'static str, axis: &Array1<f64>) -> Result<()> {
    if axis.is_empty() || axis.windows(2).into_iter().any(|w| w[0] >= w[1]) {
        Err(ChromaticError::NotAscending(name))
    } else {
        Ok(())
    }
}

/// Magnification tabulated against phase and wavelength
#[derive(Debug, Clone)]
pub struct ChromaticMicrolensing {
    phases: Array1<f64>,
    wavelengths: Option<Array1<f64>>,
    // [phase, wavelength], a single column if achromatic
    mu: Array2<f64>,
}
impl ChromaticMicrolensing {
    /// Creates the magnification table
    ///
    /// Without wavelengths, `mu` is a 1D array of magnifications per phase
    /// that applies to every wavelength, otherwise `mu` is a 2D array
    /// indexed by `[phase, wavelength]`. Phases [days] and wavelengths
    /// [Angstrom] must be strictly increasing.
    pub fn new(mu: ArrayD<f64>, phases: ArrayD<f64>, wavelengths: Option<ArrayD<f64>>) -> Result<Self> {
        let found = phases.ndim();
        let phases = phases
            .into_dimensionality::<Ix1>()
            .map_err(|_| ChromaticError::Dimension {
                name: "phases",
                expected: 1,
                found,
            })?;
        ascending("phases", &phases)?;
        let (mu, wavelengths) = match wavelengths {
            None => {
                let found = mu.ndim();
                let mu = mu.into_dimensionality::<Ix1>().map_err(|_| ChromaticError::Dimension {
                    name: "mu",
                    expected: 1,
                    found,
                })?;
                (mu.insert_axis(Axis(1)), None)
            }
            Some(wavelengths) => {
                let found = wavelengths.ndim();
                let wavelengths = wavelengths.into_dimensionality::<Ix1>().map_err(|_| {
                    ChromaticError::Dimension {
                        name: "wavelengths",
                        expected: 1,
                        found,
                    }
                })?;
                ascending("wavelengths", &wavelengths)?;
                let found = mu.ndim();
                let mu = mu.into_dimensionality::<Ix2>().map_err(|_| ChromaticError::Dimension {
                    name: "mu",
                    expected: 2,
                    found,
                })?;
                (mu, Some(wavelengths))
            }
        };
        let n_wave = wavelengths.as_ref().map_or(1, |w| w.len());
        if mu.dim() != (phases.len(), n_wave) {
            return Err(ChromaticError::ShapeMismatch {
                mu: mu.shape().to_vec(),
                phases: phases.len(),
                wavelengths: n_wave,
            });
        }
        Ok(Self {
            phases,
            wavelengths,
            mu,
        })
    }
    pub fn is_achromatic(&self) -> bool {
        self.wavelengths.is_none()
    }
    pub fn min_phase(&self) -> f64 {
        self.phases[0]
    }
    pub fn max_phase(&self) -> f64 {
        self.phases[self.phases.len() - 1]
    }
    /// Range of wavelengths, `[0, ∞]` if achromatic
    pub fn wavelength_range(&self) -> (f64, f64) {
        self.wavelengths
            .as_ref()
            .map_or((0., f64::INFINITY), |w| (w[0], w[w.len() - 1]))
    }
    /// Linearly interpolated magnification at `phase` and `wave`
    pub fn magnification(&self, phase: f64, wave: f64) -> Result<f64> {
        let (i, u) = locate("phase", &self.phases, phase)?;
        let i1 = (i + 1).min(self.phases.len() - 1);
        match &self.wavelengths {
            None => {
                if !(wave >= 0.) {
                    return Err(ChromaticError::OutOfRange {
                        axis: "wavelength",
                        value: wave,
                        min: 0.,
                        max: f64::INFINITY,
                    });
                }
                Ok((1. - u) * self.mu[[i, 0]] + u * self.mu[[i1, 0]])
            }
            Some(wavelengths) => {
                let (j, v) = locate("wavelength", wavelengths, wave)?;
                let j1 = (j + 1).min(wavelengths.len() - 1);
                let mu = &self.mu;
                Ok((1. - u) * (1. - v) * mu[[i, j]]
                    + (1. - u) * v * mu[[i, j1]]
                    + u * (1. - v) * mu[[i1, j]]
                    + u * v * mu[[i1, j1]])
            }
        }
    }
    /// Applies the magnification to `flux`, indexed by `[phase, wavelength]`
    pub fn propagate(
        &self,
        wave: ArrayView1<'_, f64>,
        flux: ArrayView2<'_, f64>,
        phase: ArrayView1<'_, f64>,
    ) -> Result<Array2<f64>> {
        let expected = (phase.len(), wave.len());
        if flux.dim() != expected {
            return Err(ChromaticError::FluxShape {
                expected,
                found: flux.dim(),
            });
        }
        let mut magnified = flux.to_owned();
        for (mut row, &p) in magnified.rows_mut().into_iter().zip(phase.iter()) {
            for (f, &w) in row.iter_mut().zip(wave.iter()) {
                *f *= self.magnification(p, w)?;
            }
        }
        Ok(magnified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array};

    #[test]
    fn achromatic() {
        let cm = ChromaticMicrolensing::new(
            array![1., 2., 4.].into_dyn(),
            array![0., 10., 20.].into_dyn(),
            None,
        )
        .unwrap();
        assert!(cm.is_achromatic());
        let flux = Array2::ones((2, 3));
        let out = cm
            .propagate(array![3000., 5000., 9000.].view(), flux.view(), array![5., 20.].view())
            .unwrap();
        assert_eq!(out, array![[1.5, 1.5, 1.5], [4., 4., 4.]]);
    }

    #[test]
    fn bilinear_in_phase_and_wavelength() {
        let mu = array![[1., 2.], [3., 4.]];
        let cm = ChromaticMicrolensing::new(
            mu.into_dyn(),
            array![0., 2.].into_dyn(),
            Some(array![4000., 6000.].into_dyn()),
        )
        .unwrap();
        assert_relative_eq!(cm.magnification(1., 5000.).unwrap(), 2.5);
        assert_relative_eq!(cm.magnification(0., 6000.).unwrap(), 2.);
        assert_relative_eq!(cm.magnification(2., 4500.).unwrap(), 3.25);
        let flux = array![[2., 2.], [1., 1.]];
        let out = cm
            .propagate(array![4000., 6000.].view(), flux.view(), array![0., 2.].view())
            .unwrap();
        assert_eq!(out, array![[2., 4.], [3., 4.]]);
    }

    #[test]
    fn out_of_range() {
        let cm = ChromaticMicrolensing::new(
            Array::linspace(1., 2., 5).into_dyn(),
            Array::linspace(-10., 30., 5).into_dyn(),
            None,
        )
        .unwrap();
        assert_eq!(cm.min_phase(), -10.);
        assert_eq!(cm.max_phase(), 30.);
        assert!(matches!(
            cm.magnification(31., 5000.),
            Err(ChromaticError::OutOfRange { axis: "phase", .. })
        ));
        assert!(matches!(
            cm.magnification(0., -1.),
            Err(ChromaticError::OutOfRange {
                axis: "wavelength",
                ..
            })
        ));
    }

    #[test]
    fn invalid_tables() {
        let err = ChromaticMicrolensing::new(
            Array2::ones((3, 2)).into_dyn(),
            array![0., 1., 2.].into_dyn(),
            None,
        );
        assert!(matches!(
            err,
            Err(ChromaticError::Dimension {
                name: "mu",
                expected: 1,
                found: 2
            })
        ));
        let err = ChromaticMicrolensing::new(
            array![1., 2., 3.].into_dyn(),
            array![0., 1., 2.].into_dyn(),
            Some(array![1., 2.].into_dyn()),
        );
        assert!(matches!(
            err,
            Err(ChromaticError::Dimension {
                name: "mu",
                expected: 2,
                found: 1
            })
        ));
        let err = ChromaticMicrolensing::new(
            Array2::ones((3, 2)).into_dyn(),
            array![0., 1., 2.].into_dyn(),
            Some(array![1., 2., 3.].into_dyn()),
        );
        assert!(matches!(err, Err(ChromaticError::ShapeMismatch { .. })));
        let err = ChromaticMicrolensing::new(
            array![1., 2.].into_dyn(),
            array![1., 0.].into_dyn(),
            None,
        );
        assert!(matches!(err, Err(ChromaticError::NotAscending("phases"))));
    }

    #[test]
    fn flux_shape() {
        let cm = ChromaticMicrolensing::new(
            array![1., 1.].into_dyn(),
            array![0., 1.].into_dyn(),
            None,
        )
        .unwrap();
        assert!(matches!(
            cm.propagate(
                array![1., 2.].view(),
                Array2::ones((3, 2)).view(),
                array![0., 1.].view()
            ),
            Err(ChromaticError::FluxShape { .. })
        ));
    }
}
