//! Numpy `.npy` and `.npz` files
//!
//! Magnification maps and caustic crossing counts are exchanged with the
//! engines that compute them as numpy arrays.

use ndarray::{ArrayD, Dimension, IxDyn, ShapeBuilder};
use npyz::{npz::NpzArchive, NpyFile, Order, WriterBuilder};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read},
    path::Path,
};

#[derive(thiserror::Error, Debug)]
pub enum NpyError {
    #[error("failed to read or write numpy array")]
    Io(#[from] std::io::Error),
    #[error("numpy array with unexpected shape")]
    Shape(#[from] ndarray::ShapeError),
    #[error("array {0} not found in the npz archive")]
    Missing(String),
}
type Result<T> = std::result::Result<T, NpyError>;

fn into_array<T: npyz::Deserialize, R: Read>(npy: NpyFile<R>) -> Result<ArrayD<T>> {
    let shape: Vec<usize> = npy.shape().iter().map(|&n| n as usize).collect();
    let order = npy.order();
    let data = npy.into_vec::<T>()?;
    log::debug!("loaded {:?} array ({:?} order)", shape, order);
    Ok(match order {
        Order::C => ArrayD::from_shape_vec(IxDyn(&shape), data)?,
        Order::Fortran => ArrayD::from_shape_vec(IxDyn(&shape).f(), data)?,
    })
}

/// Reads an array from a `.npy` file
pub fn read<T: npyz::Deserialize, P: AsRef<Path>>(path: P) -> Result<ArrayD<T>> {
    let file = BufReader::new(File::open(path)?);
    into_array(NpyFile::new(file)?)
}

/// Reads the array `name` from a `.npz` archive
pub fn read_npz<T: npyz::Deserialize, P: AsRef<Path>>(path: P, name: &str) -> Result<ArrayD<T>> {
    let mut npz = NpzArchive::open(path)?;
    let npy = npz
        .by_name(name)?
        .ok_or_else(|| NpyError::Missing(name.to_string()))?;
    into_array(npy)
}

/// Reads an array from either a `.npy` file or, given a name, a `.npz` archive
pub fn load<T: npyz::Deserialize, P: AsRef<Path>>(path: P, name: Option<&str>) -> Result<ArrayD<T>> {
    match name {
        Some(name) => read_npz(path, name),
        None => read(path),
    }
}

/// Writes an array of any dimension to a `.npy` file, in C order
pub fn write<T, D, P>(path: P, array: &ndarray::Array<T, D>) -> Result<()>
where
    T: npyz::AutoSerialize + Clone,
    D: Dimension,
    P: AsRef<Path>,
{
    let shape: Vec<u64> = array.shape().iter().map(|&n| n as u64).collect();
    let mut file = BufWriter::new(File::create(path)?);
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&shape)
        .writer(&mut file)
        .begin_nd()?;
    writer.extend(array.iter().cloned())?;
    writer.finish()?;
    Ok(())
}
