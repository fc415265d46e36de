//! Calibration Flag Inspector
//!
//! Shows the solver constraint mask produced for a calibration model and a
//! set of options, either given on the command line or loaded from YAML.
//!
//! Usage:
//! ```bash
//! cargo run --example calibration_flags -- --model fisheye -k 1 --fix-principal-point
//! cargo run --example calibration_flags -- --model pinhole --options samples/calibration_options.yaml
//! ```

use calib_backend::{CalibrationFlags, CalibrationModel, CalibrationOptions};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Calibration flag inspection tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Calibration model (pinhole, fisheye)
    #[arg(short = 'm', long, default_value = "pinhole")]
    model: String,

    /// YAML file with calibration options; overrides the flags below
    #[arg(short = 'o', long)]
    options: Option<PathBuf>,

    /// Number of radial distortion coefficients to solve for
    #[arg(short = 'k', long, default_value = "2", allow_negative_numbers = true)]
    k_coefficients: i32,

    /// Hold the principal point fixed
    #[arg(long)]
    fix_principal_point: bool,

    /// Hold the aspect ratio fixed (pinhole only)
    #[arg(long)]
    fix_aspect_ratio: bool,

    /// Force tangential distortion to zero (pinhole only)
    #[arg(long)]
    zero_tangent_dist: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let cli = Cli::parse();
    let model: CalibrationModel = cli.model.parse()?;

    let options = match &cli.options {
        Some(path) => {
            info!("Loading calibration options from: {:?}", path);
            CalibrationOptions::load_from_yaml(&path.to_string_lossy())?
        }
        None => CalibrationOptions {
            k_coefficients: cli.k_coefficients,
            fix_principal_point: cli.fix_principal_point,
            fix_aspect_ratio: cli.fix_aspect_ratio,
            zero_tangential_distortion: cli.zero_tangent_dist,
        },
    };
    info!("Options: {:?}", options);

    let flags = CalibrationFlags::from_options(model, &options);

    println!("Model: {}", model);
    println!("Flags: {}", flags);
    for flag in flags.iter() {
        println!("  {:?}", flag);
    }

    Ok(())
}
