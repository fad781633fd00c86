//! Magnification maps
//!
//! A magnification map is produced by an external ray shooting code. It is
//! received here as a dense array of magnifications, with row 0 at the top
//! of the map, plus its geometry and the macro model it was computed for.

use crate::{geometry::RegularGrid, stars::Stars};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum MagMapError {
    #[error("failed to open the map metadata file")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize the map metadata")]
    Pickle(#[from] serde_pickle::Error),
}
type Result<T> = std::result::Result<T, MagMapError>;

/// Map geometry and macro model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagMapParams {
    pub center: [f64; 2],
    /// distances from the center to the edges along y1 and y2
    pub half_length: [f64; 2],
    /// total convergence
    #[serde(default)]
    pub kappa_tot: f64,
    #[serde(default)]
    pub shear: f64,
    /// convergence in point mass lenses
    #[serde(default)]
    pub kappa_star: f64,
}
impl MagMapParams {
    pub fn new(center: [f64; 2], half_length: [f64; 2]) -> Self {
        Self {
            center,
            half_length,
            kappa_tot: 0.,
            shear: 0.,
            kappa_star: 0.,
        }
    }
    pub fn macro_model(self, kappa_tot: f64, shear: f64, kappa_star: f64) -> Self {
        Self {
            kappa_tot,
            shear,
            kappa_star,
            ..self
        }
    }
    /// Loads the parameters from a Python pickle of a dictionary with keys
    /// `center`, `half_length`, `kappa_tot`, `shear` and `kappa_star`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        Ok(serde_pickle::from_reader(&mut file, Default::default())?)
    }
}

/// Magnification map
#[derive(Debug, Clone)]
pub struct MagMap {
    magnifications: Array2<f64>,
    grid: RegularGrid,
    params: MagMapParams,
    stars: Option<Stars>,
}
impl MagMap {
    pub fn new(magnifications: Array2<f64>, params: MagMapParams) -> Self {
        let grid = RegularGrid::from_shape(magnifications.dim(), params.center, params.half_length);
        Self {
            magnifications,
            grid,
            params,
            stars: None,
        }
    }
    pub fn with_stars(self, stars: Stars) -> Self {
        Self {
            stars: Some(stars),
            ..self
        }
    }
    pub fn magnifications(&self) -> ArrayView2<'_, f64> {
        self.magnifications.view()
    }
    pub fn grid(&self) -> &RegularGrid {
        &self.grid
    }
    pub fn params(&self) -> &MagMapParams {
        &self.params
    }
    pub fn stars(&self) -> Option<&Stars> {
        self.stars.as_ref()
    }
    /// Number of pixels along y1 (columns) and y2 (rows)
    pub fn num_pixels(&self) -> [usize; 2] {
        self.grid.num_pixels
    }
    pub fn pixel_scales(&self) -> [f64; 2] {
        self.grid.pixel_scales()
    }
    /// Average magnification of the macro model
    pub fn mu_ave(&self) -> f64 {
        let MagMapParams {
            kappa_tot, shear, ..
        } = self.params;
        1. / ((1. - kappa_tot).powi(2) - shear * shear)
    }
    pub fn stellar_fraction(&self) -> f64 {
        self.params.kappa_star / self.params.kappa_tot
    }
    pub fn smooth_fraction(&self) -> f64 {
        1. - self.stellar_fraction()
    }
    /// Magnifications relative to the macro model, in magnitudes
    pub fn magnitudes(&self) -> Array2<f64> {
        let mu_ave = self.mu_ave().abs();
        self.magnifications.mapv(|mu| -2.5 * (mu / mu_ave).log10())
    }
}
