use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use optred_core::classify::classify_header;
use optred_core::io::read_frame;
use optred_core::stats::FrameStats;
use optred_core::telescope::Telescope;

use super::TelescopeArg;

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Telescope/camera layout
    #[arg(short, long, value_enum, default_value = "generic")]
    pub telescope: TelescopeArg,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let telescope: Telescope = args.telescope.into();

    for (i, path) in args.files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let frame = read_frame(path, telescope)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let header = &frame.header;
        let stats = FrameStats::of(&frame);
        let (planes, h, w) = frame.shape();

        println!("File:        {}", path.display());
        match classify_header(header, telescope, path) {
            Ok((kind, Some(filter))) => println!("Type:        {kind} ({filter})"),
            Ok((kind, None)) => println!("Type:        {kind}"),
            Err(e) => println!("Type:        unknown ({e})"),
        }
        if let Some(object) = header.get_text("OBJECT") {
            println!("Object:      {}", object);
        }
        if let Some(exptime) = header.get("EXPTIME") {
            println!("Exposure:    {} s", exptime);
        }
        if planes > 1 {
            println!("Dimensions:  {}x{} x {} planes", w, h, planes);
        } else {
            println!("Dimensions:  {}x{}", w, h);
        }
        println!("Keywords:    {}", header.len());
        println!(
            "Pixels:      mean {:.2}  median {:.2}  stddev {:.2}",
            stats.mean, stats.median, stats.stddev
        );
        println!("Range:       {:.2} .. {:.2}", stats.min, stats.max);
        if stats.non_finite > 0 {
            println!("Non-finite:  {}", stats.non_finite);
        }
    }

    Ok(())
}
