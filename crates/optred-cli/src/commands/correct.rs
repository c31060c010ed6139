use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use optred_core::calibrate::correct_frame;
use optred_core::classify::expand_inputs;
use optred_core::io::{corrected_path, prepare_output, read_frame, write_frame};
use optred_core::pipeline::load_master;
use optred_core::telescope::Telescope;

use super::{overwrite_policy, OverwriteArg, TelescopeArg};
use crate::progress::confirm_delete;

#[derive(Args)]
pub struct CorrectArgs {
    /// Science FITS files or glob patterns
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Master bias frame
    #[arg(long)]
    pub master_bias: PathBuf,

    /// Master flat frame for the filter of these files
    #[arg(long)]
    pub master_flat: PathBuf,

    /// Directory for corrected frames (default: next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

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

pub fn run(args: &CorrectArgs) -> Result<()> {
    let telescope: Telescope = args.telescope.into();
    let master_bias = load_master(&args.master_bias)?;
    let master_flat = load_master(&args.master_flat)?;
    let paths = expand_inputs(&args.files)?;
    let policy = overwrite_policy(args.overwrite, args.interactive).unwrap_or_default();

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Correcting [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );

    let mut written = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        let science = read_frame(path, telescope)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let corrected = correct_frame(&science, &master_bias, &master_flat)
            .with_context(|| format!("Failed to correct {}", path.display()))?;
        let output = corrected_path(path, args.output_dir.as_deref());
        prepare_output(&output, policy, |p| pb.suspend(|| confirm_delete(p)))
            .with_context(|| format!("Not overwriting {}", output.display()))?;
        write_frame(&output, &corrected)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        written.push(output);
        pb.set_position(i as u64 + 1);
    }
    pb.finish();

    for output in &written {
        println!("Saved to {}", output.display());
    }
    Ok(())
}
