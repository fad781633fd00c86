//! Physical length scales of microlensing
//!
//! Einstein radius of a point mass lens in the lens and source planes, and
//! the expansion rate of a supernova in units of that radius, for a flat
//! ΛCDM cosmology (radiation is neglected).

use serde::{Deserialize, Serialize};

/// Gravitational constant [m³/kg/s²]
pub const G: f64 = 6.6743e-11;
/// Speed of light [m/s]
pub const C: f64 = 299_792_458.;
/// Solar mass [kg]
pub const M_SUN: f64 = 1.988409870698051e30;
/// Megaparsec [m]
pub const MPC: f64 = 3.0856775814913673e22;
/// Day [s]
pub const DAY: f64 = 86_400.;

const INTEGRATION_STEPS: usize = 1000;

#[derive(thiserror::Error, Debug)]
pub enum LengthScaleError {
    #[error("expected 0 < z_lens < z_src, found z_lens={z_lens} and z_src={z_src}")]
    Redshifts { z_lens: f64, z_src: f64 },
}
type Result<T> = std::result::Result<T, LengthScaleError>;

/// Flat ΛCDM cosmology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cosmology {
    /// Hubble constant [km/s/Mpc]
    pub h0: f64,
    /// matter density parameter
    pub omega_m: f64,
}
impl Default for Cosmology {
    /// Planck 2018
    fn default() -> Self {
        Self {
            h0: 67.66,
            omega_m: 0.30966,
        }
    }
}
impl Cosmology {
    pub fn new(h0: f64, omega_m: f64) -> Self {
        Self { h0, omega_m }
    }
    /// Hubble distance c/H0 [Mpc]
    pub fn hubble_distance(&self) -> f64 {
        C * 1e-3 / self.h0
    }
    fn inv_efunc(&self, z: f64) -> f64 {
        let zp1 = 1. + z;
        1. / (self.omega_m * zp1 * zp1 * zp1 + 1. - self.omega_m).sqrt()
    }
    /// Line of sight comoving distance to redshift `z` [Mpc]
    pub fn comoving_distance(&self, z: f64) -> f64 {
        self.comoving_distance_z1z2(0., z)
    }
    /// Line of sight comoving distance between redshifts `z1` and `z2` [Mpc]
    pub fn comoving_distance_z1z2(&self, z1: f64, z2: f64) -> f64 {
        // composite Simpson's rule
        let n = INTEGRATION_STEPS;
        let h = (z2 - z1) / n as f64;
        let sum: f64 = (0..=n)
            .map(|i| {
                let w = match i {
                    0 => 1.,
                    i if i == n => 1.,
                    i if i % 2 == 1 => 4.,
                    _ => 2.,
                };
                w * self.inv_efunc(z1 + i as f64 * h)
            })
            .sum();
        self.hubble_distance() * sum * h / 3.
    }
    /// Angular diameter distance to redshift `z` [Mpc]
    pub fn angular_diameter_distance(&self, z: f64) -> f64 {
        self.comoving_distance(z) / (1. + z)
    }
    /// Angular diameter distance between redshifts `z1` and `z2` [Mpc]
    pub fn angular_diameter_distance_z1z2(&self, z1: f64, z2: f64) -> f64 {
        self.comoving_distance_z1z2(z1, z2) / (1. + z2)
    }
}

/// Einstein radius of a point mass lens of `m` solar masses in the lens and
/// source planes [m]
pub fn theta_star_physical(z_lens: f64, z_src: f64, m: f64, cosmo: &Cosmology) -> Result<(f64, f64)> {
    if !(z_lens > 0. && z_lens < z_src) {
        return Err(LengthScaleError::Redshifts { z_lens, z_src });
    }
    let d_d = cosmo.angular_diameter_distance(z_lens) * MPC;
    let d_s = cosmo.angular_diameter_distance(z_src) * MPC;
    let d_ds = cosmo.angular_diameter_distance_z1z2(z_lens, z_src) * MPC;
    let theta_star_lens = (4. * G * m * M_SUN / (C * C) * d_d * d_ds / d_s).sqrt();
    let theta_star_src = theta_star_lens * d_s / d_d;
    log::debug!("theta_star: {theta_star_lens:e}m (lens), {theta_star_src:e}m (source)");
    Ok((theta_star_lens, theta_star_src))
}

/// Expansion rate of a supernova with velocity `v` [km/s], in Einstein radii
/// of the source plane per day
pub fn sn_expansion_rate(z_lens: f64, z_src: f64, m: f64, cosmo: &Cosmology, v: f64) -> Result<f64> {
    let (_, theta_star_src) = theta_star_physical(z_lens, z_src, m, cosmo)?;
    Ok(v * 1e3 * DAY / theta_star_src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn einstein_de_sitter() {
        let eds = Cosmology::new(70., 1.);
        for z in [0.1, 0.5, 1., 3.] {
            let expected = 2. * eds.hubble_distance() * (1. - 1. / (1f64 + z).sqrt());
            assert_relative_eq!(eds.comoving_distance(z), expected, max_relative = 1e-8);
        }
    }

    #[test]
    fn low_redshift_hubble_law() {
        let cosmo = Cosmology::default();
        let z = 1e-4;
        assert_relative_eq!(
            cosmo.angular_diameter_distance(z),
            cosmo.hubble_distance() * z,
            max_relative = 1e-3
        );
        assert_eq!(cosmo.comoving_distance(0.), 0.);
    }

    #[test]
    fn distances_are_additive() {
        let cosmo = Cosmology::default();
        assert_relative_eq!(
            cosmo.comoving_distance(0.5) + cosmo.comoving_distance_z1z2(0.5, 1.2),
            cosmo.comoving_distance(1.2),
            max_relative = 1e-9
        );
    }

    #[test]
    fn einstein_radius() {
        let cosmo = Cosmology::default();
        let (lens, src) = theta_star_physical(0.5, 1., 1., &cosmo).unwrap();
        let d_d = cosmo.angular_diameter_distance(0.5);
        let d_s = cosmo.angular_diameter_distance(1.);
        assert_relative_eq!(src / lens, d_s / d_d, max_relative = 1e-12);
        // a solar mass lens at cosmological distances: ~1e-2 pc
        assert!(lens > 1e13 && lens < 1e15);
        let (lens4, _) = theta_star_physical(0.5, 1., 4., &cosmo).unwrap();
        assert_relative_eq!(lens4, 2. * lens, max_relative = 1e-12);
    }

    #[test]
    fn expansion_rate() {
        let cosmo = Cosmology::default();
        let (_, src) = theta_star_physical(0.3, 1.5, 0.3, &cosmo).unwrap();
        let rate = sn_expansion_rate(0.3, 1.5, 0.3, &cosmo, 1e4).unwrap();
        assert_relative_eq!(rate, 1e7 * DAY / src, max_relative = 1e-12);
    }

    #[test]
    fn redshift_order() {
        let cosmo = Cosmology::default();
        assert!(matches!(
            theta_star_physical(1., 0.5, 1., &cosmo),
            Err(LengthScaleError::Redshifts { .. })
        ));
        assert!(sn_expansion_rate(0.5, 0.5, 1., &cosmo, 1e4).is_err());
    }
}
