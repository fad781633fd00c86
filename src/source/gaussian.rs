use super::{radii, squared_radii, Profiles, Result, SourceProfile};
use ndarray::{Array1, Array2, Array3, Axis};

/// Radius of the disk holding 0.999 of the flux of a 2D Gaussian, in units of σ
const R999_SIGMA: f64 = 3.7169222;
/// Ratio of the 0.999 flux radius to the half-light radius of a 2D Gaussian
const R999_R050: f64 = 3.1568630;

fn truncated_gaussian(d2: &Array2<f64>, radius: usize, sigma: f64) -> Array2<f64> {
    let r2 = (radius * radius) as f64;
    d2.mapv(|d2| {
        if d2 > r2 {
            0.
        } else if sigma == 0. {
            1.
        } else {
            (-d2 / (2. * sigma * sigma)).exp()
        }
    })
}

/// Gaussian source truncated at the radius holding 0.999 of its flux
#[derive(Debug, Clone)]
pub struct Gaussian {
    /// radius of the disk containing 0.999 of the flux [pixel]
    pub radius: usize,
    /// standard deviation [pixel]
    pub sigma: f64,
    profile: Array2<f64>,
    weight: f64,
}
impl Gaussian {
    /// Creates a Gaussian in a `(2r+1)²` kernel, `r` being `max_radius` if given
    /// or the Gaussian radius otherwise
    pub fn new(radius: usize, max_radius: Option<usize>) -> Self {
        let max_radius = max_radius.unwrap_or(radius);
        let sigma = radius as f64 / R999_SIGMA;
        let profile = truncated_gaussian(&squared_radii(max_radius), radius, sigma);
        let weight = profile.sum();
        Self {
            radius,
            sigma,
            profile,
            weight,
        }
    }
    pub fn half_light_radius(&self) -> f64 {
        self.radius as f64 / R999_R050
    }
    pub fn profile(&self) -> &Array2<f64> {
        &self.profile
    }
    pub fn weight(&self) -> f64 {
        self.weight
    }
}
impl SourceProfile for Gaussian {
    fn profiles(&self) -> Profiles<'_> {
        Profiles::Single {
            profile: self.profile.view().into_dyn(),
            weight: self.weight,
        }
    }
}

/// Gaussian sources of increasing radii sharing the kernel size of the largest one
#[derive(Debug, Clone)]
pub struct Gaussians {
    /// radii of the disks containing 0.999 of the flux [pixel]
    pub radii: Vec<usize>,
    /// standard deviations [pixel]
    pub sigma: Vec<f64>,
    profiles: Array3<f64>,
    weights: Array1<f64>,
}
impl Gaussians {
    pub fn new(max_radius: usize, min_radius: usize, step: usize) -> Result<Self> {
        let radii = radii(max_radius, min_radius, step)?;
        let d2 = squared_radii(max_radius);
        let n = d2.nrows();
        let sigma: Vec<f64> = radii.iter().map(|&r| r as f64 / R999_SIGMA).collect();
        let mut profiles = Array3::zeros((radii.len(), n, n));
        profiles
            .axis_iter_mut(Axis(0))
            .zip(radii.iter().zip(&sigma))
            .for_each(|(mut profile, (&r, &s))| {
                // a zero width Gaussian is evaluated with σ = 1 inside its single pixel
                let s = if s == 0. { 1. } else { s };
                profile.assign(&truncated_gaussian(&d2, r, s));
            });
        let weights = profiles.sum_axis(Axis(2)).sum_axis(Axis(1));
        Ok(Self {
            radii,
            sigma,
            profiles,
            weights,
        })
    }
    pub fn half_light_radii(&self) -> Vec<f64> {
        self.radii.iter().map(|&r| r as f64 / R999_R050).collect()
    }
    /// Kernels indexed as `[radius, row, column]`
    pub fn kernels(&self) -> &Array3<f64> {
        &self.profiles
    }
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }
}
impl SourceProfile for Gaussians {
    fn profiles(&self) -> Profiles<'_> {
        Profiles::Stack {
            profiles: self.profiles.view().into_dyn(),
            weights: self.weights.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_radius() {
        let g = Gaussian::new(0, Some(1));
        assert_eq!(g.weight(), 1.);
        assert_eq!(g.profile()[[1, 1]], 1.);
        assert_eq!(g.profile()[[0, 1]], 0.);
    }

    #[test]
    fn flux_fraction() {
        let g = Gaussian::new(20, None);
        let sigma = 20. / R999_SIGMA;
        // the discrete sum of a wide Gaussian is close to its integral
        let integral = 2. * std::f64::consts::PI * sigma * sigma;
        assert_relative_eq!(g.weight(), 0.999 * integral, max_relative = 0.02);
        assert_relative_eq!(g.half_light_radius(), 20. / R999_R050);
    }

    #[test]
    fn symmetric() {
        let g = Gaussian::new(3, Some(4));
        let p = g.profile();
        assert_eq!(p[[4, 2]], p[[2, 4]]);
        assert_eq!(p[[4, 1]], p[[7, 4]]);
        assert!(p[[4, 4]] > p[[4, 5]]);
        assert_eq!(p[[0, 4]], 0.);
    }

    #[test]
    fn stack_matches_singles() {
        let stack = Gaussians::new(4, 1, 1).unwrap();
        assert_eq!(stack.kernels().dim(), (4, 9, 9));
        for (t, &r) in stack.radii.iter().enumerate() {
            let single = Gaussian::new(r, Some(4));
            assert_eq!(stack.kernels().index_axis(Axis(0), t), single.profile().view());
            assert_relative_eq!(stack.weights()[t], single.weight(), max_relative = 1e-12);
        }
    }

    #[test]
    fn stack_with_point_source() {
        let stack = Gaussians::new(2, 0, 2).unwrap();
        assert_eq!(stack.radii, vec![0, 2]);
        assert_eq!(stack.weights()[0], 1.);
    }
}
