//! Light curves of a finite source
//!
//! Samples a magnification map at random positions with a uniform disk or a
//! gaussian source and writes the magnifications to a `.npy` file.
//!
//! ```shell
//! RUST_LOG=info cargo r -r --bin lightcurves -- map.npy --half-length 25 25 --radius 10 --num 1000
//! ```

use anyhow::Context;
use microlensing::{
    lightcurves::LightCurves,
    npy,
    source::{Gaussian, Gaussians, SourceProfile, UniformDisk, UniformDisks},
    Extrapolation, MagMap, MagMapParams,
};
use ndarray::Ix2;
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use structopt::StructOpt;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
enum Profile {
    Disk,
    Gaussian,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "lightcurves", about = "Microlensing light curves of finite sources")]
struct Opt {
    /// Magnification map (.npy or .npz)
    #[structopt(parse(from_os_str))]
    map: PathBuf,
    /// Name of the map in a .npz archive
    #[structopt(long)]
    npz_name: Option<String>,
    /// Pickle file with the map center, half length and macro model
    #[structopt(long, parse(from_os_str))]
    meta: Option<PathBuf>,
    /// Map center (y1,y2)
    #[structopt(long, number_of_values = 2, allow_hyphen_values = true)]
    center: Option<Vec<f64>>,
    /// Map half length along y1 and y2
    #[structopt(long, number_of_values = 2)]
    half_length: Option<Vec<f64>>,
    /// Source profile: disk or gaussian
    #[structopt(short, long, default_value = "disk")]
    profile: Profile,
    /// Source radius [pixel]
    #[structopt(short, long)]
    radius: usize,
    /// Source radius at the start of a changing source [pixel]
    #[structopt(long, default_value = "0")]
    min_radius: usize,
    /// Radius step of a changing source [pixel]
    #[structopt(long, default_value = "1")]
    step: usize,
    /// Source radius increasing from `min-radius` to `radius`
    #[structopt(long)]
    changing: bool,
    /// Number of random positions
    #[structopt(short, long, default_value = "100")]
    num: usize,
    /// Random generator seed
    #[structopt(long, default_value = "0")]
    seed: u64,
    /// Sampling beyond the outer pixel centers: extrapolate, clamp or fail
    #[structopt(long, default_value = "extrapolate")]
    extrapolation: Extrapolation,
    /// Magnifications output file
    #[structopt(short, long, default_value = "lightcurves.npy", parse(from_os_str))]
    output: PathBuf,
    /// Positions output file
    #[structopt(long, parse(from_os_str))]
    positions: Option<PathBuf>,
}

fn pair(values: Option<Vec<f64>>, default: Option<[f64; 2]>, name: &str) -> anyhow::Result<[f64; 2]> {
    match values.as_deref() {
        Some(&[y1, y2]) => Ok([y1, y2]),
        Some(_) => anyhow::bail!("--{name} expects 2 values"),
        None => default.with_context(|| format!("--{name} or --meta is required")),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    log::debug!("{:?}", opt);

    let params = match &opt.meta {
        Some(meta) => MagMapParams::load(meta)
            .with_context(|| format!("failed to load {}", meta.display()))?,
        None => MagMapParams::new(
            pair(opt.center.clone(), Some([0.; 2]), "center")?,
            pair(opt.half_length.clone(), None, "half-length")?,
        ),
    };
    let map = npy::load::<f64, _>(&opt.map, opt.npz_name.as_deref())
        .with_context(|| format!("failed to load {}", opt.map.display()))?
        .into_dimensionality::<Ix2>()
        .context("the magnification map must be a 2D array")?;
    let magmap = MagMap::new(map, params);
    log::info!(
        "{:?} pixels magnification map with pixel scales {:?}",
        magmap.num_pixels(),
        magmap.pixel_scales()
    );

    let source: Box<dyn SourceProfile> = match (opt.profile, opt.changing) {
        (Profile::Disk, false) => Box::new(UniformDisk::new(opt.radius, None)),
        (Profile::Gaussian, false) => Box::new(Gaussian::new(opt.radius, None)),
        (Profile::Disk, true) => Box::new(UniformDisks::new(opt.radius, opt.min_radius, opt.step)?),
        (Profile::Gaussian, true) => Box::new(Gaussians::new(opt.radius, opt.min_radius, opt.step)?),
    };

    let mut rng = StdRng::seed_from_u64(opt.seed);
    let lightcurves = LightCurves::new(&magmap)
        .extrapolation(opt.extrapolation)
        .return_positions(opt.positions.is_some());
    let lc = if opt.changing {
        lightcurves.changing_source(source.as_ref(), opt.num, &mut rng)?
    } else {
        lightcurves.constant_source(source.as_ref(), opt.num, &mut rng)?
    };

    npy::write(&opt.output, &lc.magnifications)?;
    println!(
        "{:?} magnifications of a {} source written to {}",
        lc.magnifications.shape(),
        opt.profile,
        opt.output.display()
    );
    if let (Some(path), Some(positions)) = (&opt.positions, &lc.positions) {
        npy::write(path, positions)?;
        println!("positions written to {}", path.display());
    }
    Ok(())
}
