//! Distances to caustics
//!
//! Computes, from a map of the number of caustic crossings, the distance to
//! the next change of the count for an expanding source or, with `--angle`,
//! for a source moving along that direction.

use anyhow::Context;
use microlensing::{ncc, npy, Ncc};
use ndarray::Ix2;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "ncc_distances", about = "Distances to a change in the number of caustic crossings")]
struct Opt {
    /// Number of caustic crossings (.npy or .npz of integers)
    #[structopt(parse(from_os_str))]
    counts: PathBuf,
    /// Name of the counts in a .npz archive
    #[structopt(long)]
    npz_name: Option<String>,
    /// Grid center (y1,y2)
    #[structopt(long, number_of_values = 2, allow_hyphen_values = true)]
    center: Option<Vec<f64>>,
    /// Grid half length along y1 and y2
    #[structopt(long, number_of_values = 2, required = true)]
    half_length: Vec<f64>,
    /// Direction of travel of the source with respect to the y1 axis [degree]
    #[structopt(short, long, allow_hyphen_values = true)]
    angle: Option<f64>,
    /// Distances output file
    #[structopt(short, long, default_value = "distances.npy", parse(from_os_str))]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let (center, half_length) = match (opt.center.as_deref(), opt.half_length.as_slice()) {
        (None, &[h1, h2]) => ([0.; 2], [h1, h2]),
        (Some(&[c1, c2]), &[h1, h2]) => ([c1, c2], [h1, h2]),
        _ => anyhow::bail!("--center and --half-length expect 2 values each"),
    };
    let counts = npy::load::<i32, _>(&opt.counts, opt.npz_name.as_deref())
        .with_context(|| format!("failed to load {}", opt.counts.display()))?
        .into_dimensionality::<Ix2>()
        .context("the caustic crossings counts must be a 2D array")?;
    let ncc = Ncc::new(counts, center, half_length);
    log::info!(
        "{:?} pixels caustic crossings map with pixel scales {:?}",
        ncc.num_pixels(),
        ncc.pixel_scales()
    );

    let distances = match opt.angle {
        Some(angle) => ncc::moving_source(&ncc, angle)?,
        None => ncc::expanding_source(&ncc)?,
    };
    npy::write(&opt.output, &distances)?;
    println!(
        "{:?} distances written to {}",
        distances.dim(),
        opt.output.display()
    );
    Ok(())
}
