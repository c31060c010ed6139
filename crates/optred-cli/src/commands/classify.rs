use anyhow::Result;
use clap::Args;
use optred_core::classify::{classify_files, expand_inputs};
use optred_core::frame::FrameKind;

use super::TelescopeArg;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Input FITS files or glob patterns
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Telescope/camera layout
    #[arg(short, long, value_enum, default_value = "generic")]
    pub telescope: TelescopeArg,
}

pub fn run(args: &ClassifyArgs) -> Result<()> {
    let paths = expand_inputs(&args.files)?;
    let classified = classify_files(&paths, args.telescope.into());

    println!("Inspected:   {}", classified.inspected);
    println!("Bias:        {}", classified.count(FrameKind::Bias));
    println!("Dark:        {}", classified.count(FrameKind::Dark));
    println!("Flat:        {}", classified.count(FrameKind::Flat));
    println!("Object:      {}", classified.count(FrameKind::Object));

    if !classified.filters.is_empty() {
        println!();
        println!("Filters:");
        for filter in &classified.filters {
            println!(
                "  {:<10} {} flat, {} object",
                filter,
                classified.files_for_filter(FrameKind::Flat, filter).len(),
                classified.files_for_filter(FrameKind::Object, filter).len()
            );
        }
    }

    if !classified.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for skipped in &classified.skipped {
            println!("  {} - {}", skipped.path.display(), skipped.reason);
        }
    }

    Ok(())
}
