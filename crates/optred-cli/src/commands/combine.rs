use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use optred_core::calibrate::{build_master_bias, build_master_flat};
use optred_core::classify::{classify_header, expand_inputs};
use optred_core::consts::DEFAULT_PROPAGATED_KEYWORDS;
use optred_core::frame::{Frame, FrameKind};
use optred_core::io::{master_bias_path, master_flat_path, prepare_output, read_frame, write_frame};
use optred_core::pipeline::load_master;
use optred_core::stack::{CombineMethod, SigmaClipParams};
use optred_core::telescope::Telescope;
use tracing::warn;

use super::{overwrite_policy, OverwriteArg, TelescopeArg};
use crate::progress::confirm_delete;

#[derive(Clone, Copy, ValueEnum)]
pub enum MasterKindArg {
    Bias,
    Flat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CombineMethodArg {
    Mean,
    Median,
    SigmaClip,
}

impl CombineMethodArg {
    pub fn to_method(self, sigma: f32, iterations: usize) -> CombineMethod {
        match self {
            Self::Mean => CombineMethod::Mean,
            Self::Median => CombineMethod::Median,
            Self::SigmaClip => CombineMethod::SigmaClip(SigmaClipParams { iterations, sigma }),
        }
    }
}

#[derive(Args)]
pub struct CombineArgs {
    /// Input FITS files or glob patterns
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Which master to build
    #[arg(short, long, value_enum)]
    pub kind: MasterKindArg,

    /// Filter name for a master flat (read from the first frame if omitted)
    #[arg(long)]
    pub filter: Option<String>,

    /// Master bias to subtract from flats
    #[arg(long)]
    pub master_bias: Option<PathBuf>,

    /// Combine method (default: mean for bias, median for flat)
    #[arg(long, value_enum)]
    pub method: Option<CombineMethodArg>,

    /// Sigma threshold for sigma-clip combining
    #[arg(long, default_value = "2.5")]
    pub sigma: f32,

    /// Rejection iterations for sigma-clip combining
    #[arg(long, default_value = "2")]
    pub iterations: usize,

    /// Output file (default: masterbias.fits / masterflat_<filter>.fits)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Ask before deleting existing outputs (same as --overwrite confirm)
    #[arg(short, long)]
    pub interactive: bool,

    /// What to do with existing outputs
    #[arg(long, value_enum)]
    pub overwrite: Option<OverwriteArg>,

    /// Telescope/camera layout
    #[arg(short, long, value_enum, default_value = "generic")]
    pub telescope: TelescopeArg,
}

fn load_inputs(paths: &[PathBuf], telescope: Telescope, expected: FrameKind) -> Result<Vec<Frame>> {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Reading [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );

    let mut frames = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        let frame = read_frame(path, telescope)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match classify_header(&frame.header, telescope, path) {
            Ok((kind, _)) if kind != expected => {
                warn!(path = %path.display(), "Header says {kind}, combining as {expected}")
            }
            Err(e) => warn!(path = %path.display(), "{e}"),
            _ => {}
        }
        frames.push(frame);
        pb.set_position(i as u64 + 1);
    }
    pb.finish();
    Ok(frames)
}

fn frame_filter(frame: &Frame, telescope: Telescope) -> Option<String> {
    frame
        .header
        .get_text(telescope.filter_keyword())
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
}

pub fn run(args: &CombineArgs) -> Result<()> {
    let telescope: Telescope = args.telescope.into();
    let paths = expand_inputs(&args.files)?;
    let keywords: Vec<String> = DEFAULT_PROPAGATED_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect();

    let (master, output) = match args.kind {
        MasterKindArg::Bias => {
            let method = args
                .method
                .unwrap_or(CombineMethodArg::Mean)
                .to_method(args.sigma, args.iterations);
            println!("Combining {} bias frames ({})", paths.len(), method);
            let frames = load_inputs(&paths, telescope, FrameKind::Bias)?;
            let master = build_master_bias(&frames, &method, &keywords)?;
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| master_bias_path(std::path::Path::new(".")));
            (master, output)
        }
        MasterKindArg::Flat => {
            let Some(ref bias_path) = args.master_bias else {
                bail!("--master-bias is required to combine flats");
            };
            let master_bias = load_master(bias_path)?;
            let method = args
                .method
                .unwrap_or(CombineMethodArg::Median)
                .to_method(args.sigma, args.iterations);
            let frames = load_inputs(&paths, telescope, FrameKind::Flat)?;

            let filter = match &args.filter {
                Some(f) => f.trim().to_string(),
                None => match frames.first().and_then(|f| frame_filter(f, telescope)) {
                    Some(f) => f,
                    None => bail!("No --filter given and the first flat has no filter keyword"),
                },
            };
            for frame in &frames {
                if let Some(other) = frame_filter(frame, telescope).filter(|f| *f != filter) {
                    warn!(frame = %frame.label(), "Flat taken through {other}, not {filter}");
                }
            }

            println!(
                "Combining {} flat frames for filter {} ({})",
                frames.len(),
                filter,
                method
            );
            let master = build_master_flat(&frames, &master_bias, &filter, &method, &keywords)?;
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| master_flat_path(std::path::Path::new("."), &filter));
            (master, output)
        }
    };

    let policy = overwrite_policy(args.overwrite, args.interactive).unwrap_or_default();
    prepare_output(&output, policy, confirm_delete)?;
    write_frame(&output, &master)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved to {}", output.display());
    Ok(())
}
