//! # Microlensing light curves and caustic crossing distances
//!
//! Derived products of gravitational microlensing magnification maps:
//!  - light curves of finite, possibly time varying, sources moving over a
//!    magnification map ([lightcurves]),
//!  - distances to a change in the number of caustic crossings, for an
//!    expanding or a moving source ([ncc]).
//!
//! Maps and caustic crossing counts are computed by an external engine and
//! received as dense arrays together with their [geometry].
//!
//! ```no_run
//! use microlensing::{lightcurves, npy, source::UniformDisk, MagMap, MagMapParams};
//! use rand::{rngs::StdRng, SeedableRng};
//! # fn main() -> microlensing::Result<()> {
//! let map = npy::read::<f64, _>("map.npy")?
//!     .into_dimensionality::<ndarray::Ix2>()
//!     .map_err(npy::NpyError::from)?;
//! let magmap = MagMap::new(map, MagMapParams::new([0., 0.], [10., 10.]));
//! let disk = UniformDisk::new(5, None);
//! let mut rng = StdRng::seed_from_u64(0);
//! let lc = lightcurves::constant_source(&magmap, &disk, 100usize, true, &mut rng)?;
//! # Ok(())
//! # }
//! ```

pub mod chromatic;
mod error;
pub mod geometry;
pub mod interpolation;
pub mod length_scales;
pub mod lightcurves;
pub mod magmap;
pub mod ncc;
pub mod npy;
pub mod source;
pub mod stars;

pub use error::Error;
pub use geometry::RegularGrid;
pub use interpolation::{Extrapolation, MagnificationInterpolator};
pub use lightcurves::{LightCurve, LightCurves, Positions};
pub use magmap::{MagMap, MagMapParams};
pub use ncc::Ncc;
pub use source::{Profiles, SourceProfile};
pub use stars::Stars;

pub type Result<T> = std::result::Result<T, Error>;
