use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use optred_core::pipeline::{run_reduction_reported, ReductionConfig};

use super::combine::CombineMethodArg;
use super::{overwrite_policy, OverwriteArg, TelescopeArg};
use crate::progress::BarReporter;
use crate::summary::{print_reduction_results, print_reduction_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Input FITS files or glob patterns (overrides the config's inputs)
    pub files: Vec<String>,

    /// Reduction config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use this master bias instead of combining bias frames
    #[arg(long)]
    pub master_bias: Option<PathBuf>,

    /// Use an existing master flat for a filter, as FILTER=PATH (repeatable)
    #[arg(long, value_parser = parse_filter_master)]
    pub master_flat: Vec<(String, PathBuf)>,

    /// Directory for masters and corrected frames
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Ask before deleting existing outputs (same as --overwrite confirm)
    #[arg(short, long)]
    pub interactive: bool,

    /// What to do with existing outputs (default: from config, else replace)
    #[arg(long, value_enum)]
    pub overwrite: Option<OverwriteArg>,

    /// Bias combine method
    #[arg(long, value_enum)]
    pub bias_method: Option<CombineMethodArg>,

    /// Flat combine method
    #[arg(long, value_enum)]
    pub flat_method: Option<CombineMethodArg>,

    /// Sigma threshold for sigma-clip combining
    #[arg(long, default_value = "2.5")]
    pub sigma: f32,

    /// Rejection iterations for sigma-clip combining
    #[arg(long, default_value = "2")]
    pub iterations: usize,

    /// Telescope/camera layout (default: from config, else generic)
    #[arg(short, long, value_enum)]
    pub telescope: Option<TelescopeArg>,
}

fn parse_filter_master(s: &str) -> std::result::Result<(String, PathBuf), String> {
    let (filter, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FILTER=PATH, got '{s}'"))?;
    let filter = filter.trim();
    if filter.is_empty() || path.is_empty() {
        return Err(format!("expected FILTER=PATH, got '{s}'"));
    }
    Ok((filter.to_string(), PathBuf::from(path)))
}

fn build_config(args: &RunArgs) -> Result<ReductionConfig> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid reduction config")?
    } else {
        if args.files.is_empty() {
            bail!("No input files given and no --config");
        }
        ReductionConfig::default()
    };
    Ok(apply_args(config, args))
}

/// Command-line values take precedence over the config file.
fn apply_args(mut config: ReductionConfig, args: &RunArgs) -> ReductionConfig {
    if !args.files.is_empty() {
        config.inputs = args.files.clone();
    }
    if let Some(telescope) = args.telescope {
        config.telescope = telescope.into();
    }
    if let Some(ref dir) = args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(ref bias) = args.master_bias {
        config.master_bias = Some(bias.clone());
    }
    for (filter, path) in &args.master_flat {
        config.master_flats.insert(filter.clone(), path.clone());
    }
    if let Some(policy) = overwrite_policy(args.overwrite, args.interactive) {
        config.overwrite = policy;
    }
    if let Some(method) = args.bias_method {
        config.bias.method = method.to_method(args.sigma, args.iterations);
    }
    if let Some(method) = args.flat_method {
        config.flat.method = method.to_method(args.sigma, args.iterations);
    }
    config
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    print_reduction_summary(&config);

    let reporter = Arc::new(BarReporter::for_policy(config.overwrite)?);
    let summary = run_reduction_reported(&config, reporter.clone())?;
    reporter.finish();

    print_reduction_results(&summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use optred_core::io::OverwritePolicy;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse_args(argv: &[&str]) -> RunArgs {
        let argv = std::iter::once("run").chain(argv.iter().copied());
        TestCli::try_parse_from(argv).unwrap().args
    }

    fn config_with(text: &str, argv: &[&str]) -> ReductionConfig {
        apply_args(toml::from_str(text).unwrap(), &parse_args(argv))
    }

    #[test]
    fn test_config_confirm_prompts_without_flag() {
        let config = config_with(
            r#"
inputs = ["raw/*.fits"]
overwrite = "confirm"
"#,
            &[],
        );
        assert_eq!(config.overwrite, OverwritePolicy::Confirm);
        assert!(BarReporter::for_policy(config.overwrite)
            .unwrap()
            .is_interactive());
    }

    #[test]
    fn test_replace_policy_does_not_prompt() {
        let config = config_with(r#"inputs = ["raw/*.fits"]"#, &[]);
        assert_eq!(config.overwrite, OverwritePolicy::Replace);
        assert!(!BarReporter::for_policy(config.overwrite)
            .unwrap()
            .is_interactive());
    }

    #[test]
    fn test_overwrite_flags_override_config() {
        let text = r#"
inputs = ["raw/*.fits"]
overwrite = "keep"
"#;
        assert_eq!(
            config_with(text, &["--interactive"]).overwrite,
            OverwritePolicy::Confirm
        );
        assert_eq!(
            config_with(text, &["--overwrite", "replace"]).overwrite,
            OverwritePolicy::Replace
        );
        assert_eq!(config_with(text, &[]).overwrite, OverwritePolicy::Keep);
    }

    #[test]
    fn test_files_replace_config_inputs() {
        let config = config_with(r#"inputs = ["raw/*.fits"]"#, &["a.fits", "b.fits"]);
        assert_eq!(config.inputs, vec!["a.fits", "b.fits"]);
    }

    #[test]
    fn test_parse_filter_master() {
        let (filter, path) = parse_filter_master("R=old/masterflat_R.fits").unwrap();
        assert_eq!(filter, "R");
        assert_eq!(path, PathBuf::from("old/masterflat_R.fits"));
    }

    #[test]
    fn test_parse_filter_master_rejects_missing_separator() {
        assert!(parse_filter_master("old/masterflat_R.fits").is_err());
        assert!(parse_filter_master("=x.fits").is_err());
        assert!(parse_filter_master("R=").is_err());
    }
}
