use super::{radii, squared_radii, Profiles, Result, SourceProfile};
use ndarray::{Array1, Array2, Array3, Axis};

/// Disk of uniform brightness
#[derive(Debug, Clone)]
pub struct UniformDisk {
    /// disk radius [pixel]
    pub radius: usize,
    profile: Array2<f64>,
    weight: f64,
}
impl UniformDisk {
    /// Creates a disk of `radius` pixels in a `(2r+1)²` kernel, `r` being
    /// `max_radius` if given or the disk radius otherwise
    pub fn new(radius: usize, max_radius: Option<usize>) -> Self {
        let max_radius = max_radius.unwrap_or(radius);
        let r2 = (radius * radius) as f64;
        let profile = squared_radii(max_radius).mapv(|d2| if d2 <= r2 { 1. } else { 0. });
        let weight = profile.sum();
        Self {
            radius,
            profile,
            weight,
        }
    }
    pub fn half_light_radius(&self) -> f64 {
        self.radius as f64 / 2f64.sqrt()
    }
    pub fn profile(&self) -> &Array2<f64> {
        &self.profile
    }
    pub fn weight(&self) -> f64 {
        self.weight
    }
}
impl SourceProfile for UniformDisk {
    fn profiles(&self) -> Profiles<'_> {
        Profiles::Single {
            profile: self.profile.view().into_dyn(),
            weight: self.weight,
        }
    }
}

/// Uniform disks of increasing radii sharing the kernel size of the largest one
#[derive(Debug, Clone)]
pub struct UniformDisks {
    /// disk radii [pixel]
    pub radii: Vec<usize>,
    profiles: Array3<f64>,
    weights: Array1<f64>,
}
impl UniformDisks {
    pub fn new(max_radius: usize, min_radius: usize, step: usize) -> Result<Self> {
        let radii = radii(max_radius, min_radius, step)?;
        let d2 = squared_radii(max_radius);
        let n = d2.nrows();
        let mut profiles = Array3::zeros((radii.len(), n, n));
        profiles
            .axis_iter_mut(Axis(0))
            .zip(&radii)
            .for_each(|(mut profile, &r)| {
                let r2 = (r * r) as f64;
                profile.zip_mut_with(&d2, |p, &d2| *p = if d2 <= r2 { 1. } else { 0. });
            });
        let weights = profiles.sum_axis(Axis(2)).sum_axis(Axis(1));
        Ok(Self {
            radii,
            profiles,
            weights,
        })
    }
    pub fn half_light_radii(&self) -> Vec<f64> {
        self.radii
            .iter()
            .map(|&r| r as f64 / 2f64.sqrt())
            .collect()
    }
    /// Kernels indexed as `[radius, row, column]`
    pub fn kernels(&self) -> &Array3<f64> {
        &self.profiles
    }
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }
}
impl SourceProfile for UniformDisks {
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
    use ndarray::array;

    #[test]
    fn point_source() {
        let disk = UniformDisk::new(0, None);
        assert_eq!(disk.profile(), &array![[1.]]);
        assert_eq!(disk.weight(), 1.);
    }

    #[test]
    fn padded_disk() {
        let disk = UniformDisk::new(1, Some(2));
        assert_eq!(disk.profile().dim(), (5, 5));
        assert_eq!(disk.weight(), 5.);
        assert_eq!(disk.profile()[[2, 2]], 1.);
        assert_eq!(disk.profile()[[1, 1]], 0.);
    }

    #[test]
    fn disk_area() {
        let disk = UniformDisk::new(10, None);
        let area = std::f64::consts::PI * 100.;
        assert!((disk.weight() - area).abs() / area < 0.05);
        assert!((disk.half_light_radius() - 7.0710678).abs() < 1e-6);
    }

    #[test]
    fn stack() {
        let disks = UniformDisks::new(3, 0, 1).unwrap();
        assert_eq!(disks.radii, vec![0, 1, 2, 3]);
        assert_eq!(disks.kernels().dim(), (4, 7, 7));
        assert_eq!(disks.weights().to_vec(), vec![1., 5., 13., 29.]);
        let single = UniformDisk::new(2, Some(3));
        assert_eq!(
            disks.kernels().index_axis(Axis(0), 2),
            single.profile().view()
        );
    }
}
