use crate::{
    chromatic::ChromaticError, geometry::GeometryError, interpolation::InterpolationError,
    length_scales::LengthScaleError, lightcurves::LightCurveError, magmap::MagMapError,
    ncc::NccError, npy::NpyError, source::SourceError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `geometry` module")]
    Geometry(#[from] GeometryError),
    #[error("Error in the `interpolation` module")]
    Interpolation(#[from] InterpolationError),
    #[error("Error in the `lightcurves` module")]
    LightCurve(#[from] LightCurveError),
    #[error("Error in the `source` module")]
    Source(#[from] SourceError),
    #[error("Error in the `magmap` module")]
    MagMap(#[from] MagMapError),
    #[error("Error in the `ncc` module")]
    Ncc(#[from] NccError),
    #[error("Error in the `length_scales` module")]
    LengthScale(#[from] LengthScaleError),
    #[error("Error in the `chromatic` module")]
    Chromatic(#[from] ChromaticError),
    #[error("Error in the `npy` module")]
    Npy(#[from] NpyError),
}
