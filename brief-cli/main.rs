use std::path::{Path, PathBuf};

use brief_cli::{format_match, BriefPipeline, GrayFrame};
use brief_core::{BriefConfig, Keypoint};
use image::GrayImage;
use imageproc::corners::corners_fast9;
use imageproc::filter::gaussian_blur_f32;
use log::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "brief", about = "Match FAST corners between two images with BRIEF descriptors")]
struct Opt {
    /// Descriptor length in bits (128, 256 or 512)
    #[structopt(short, long)]
    bits: Option<usize>,
    /// Seed for the sampling pattern; random if omitted
    #[structopt(short, long)]
    seed: Option<u64>,
    /// FAST-9 corner threshold
    #[structopt(short, long, default_value = "40")]
    threshold: u8,
    /// Gaussian blur sigma applied before detection and description
    #[structopt(long, default_value = "2.0")]
    sigma: f32,
    /// TOML configuration file (requires the `serde` feature)
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Disable rayon parallelism
    #[structopt(long)]
    sequential: bool,
    /// First image
    #[structopt(parse(from_os_str))]
    image_a: PathBuf,
    /// Second image
    #[structopt(parse(from_os_str))]
    image_b: PathBuf,
}

fn load_config(opt: &Opt) -> Result<BriefConfig, Box<dyn std::error::Error>> {
    let mut config = match &opt.config {
        #[cfg(feature = "serde")]
        Some(path) => BriefConfig::load_toml(path)?,
        #[cfg(not(feature = "serde"))]
        Some(_) => return Err("configuration files require the `serde` feature".into()),
        None => BriefConfig::default(),
    };
    if let Some(bits) = opt.bits {
        config.bits = bits;
    }
    if let Some(seed) = opt.seed {
        config.seed = Some(seed);
    }
    if opt.sequential {
        config.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

fn load_frame(path: &Path, sigma: f32, threshold: u8) -> Result<GrayFrame, Box<dyn std::error::Error>> {
    let gray: GrayImage = image::open(path)?.to_luma8();
    let blurred = if sigma > 0.0 { gaussian_blur_f32(&gray, sigma) } else { gray };
    let keypoints = corners_fast9(&blurred, threshold)
        .into_iter()
        .map(|c| Keypoint::new(c.x as usize, c.y as usize))
        .collect::<Vec<_>>();
    let (w, h) = blurred.dimensions();
    debug!("{}: {}x{}, {} corners", path.display(), w, h, keypoints.len());
    Ok(GrayFrame {
        pixels: blurred.into_raw(),
        width: w as usize,
        height: h as usize,
        keypoints,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let config = load_config(&opt)?;
    info!("{}", config.summary());
    let pipeline = BriefPipeline::new(config)?;
    pipeline.init_threads()?;

    let mut frames = Vec::with_capacity(2);
    for path in [&opt.image_a, &opt.image_b] {
        let mut frame = load_frame(path, opt.sigma, opt.threshold)?;
        pipeline.retain_describable(&mut frame.keypoints, frame.width, frame.height);
        frames.push(frame);
    }

    let matches = pipeline.match_frames(&frames[0], &frames[1])?;
    for m in &matches {
        println!("{}", format_match(m));
    }
    println!("done");
    Ok(())
}
