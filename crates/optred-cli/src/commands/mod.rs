pub mod classify;
pub mod combine;
pub mod config;
pub mod correct;
pub mod info;
pub mod pipeline;

use clap::ValueEnum;
use optred_core::io::OverwritePolicy;
use optred_core::telescope::Telescope;

#[derive(Clone, Copy, ValueEnum)]
pub enum TelescopeArg {
    Generic,
    Vatt,
    #[value(name = "90prime")]
    Prime90,
    Swope,
}

impl From<TelescopeArg> for Telescope {
    fn from(arg: TelescopeArg) -> Self {
        match arg {
            TelescopeArg::Generic => Telescope::Generic,
            TelescopeArg::Vatt => Telescope::Vatt,
            TelescopeArg::Prime90 => Telescope::Prime90,
            TelescopeArg::Swope => Telescope::Swope,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OverwriteArg {
    Replace,
    Confirm,
    Keep,
}

impl From<OverwriteArg> for OverwritePolicy {
    fn from(arg: OverwriteArg) -> Self {
        match arg {
            OverwriteArg::Replace => OverwritePolicy::Replace,
            OverwriteArg::Confirm => OverwritePolicy::Confirm,
            OverwriteArg::Keep => OverwritePolicy::Keep,
        }
    }
}

/// Policy from `--overwrite`; `--interactive` is shorthand for `confirm`.
pub fn overwrite_policy(arg: Option<OverwriteArg>, interactive: bool) -> Option<OverwritePolicy> {
    if interactive {
        Some(OverwritePolicy::Confirm)
    } else {
        arg.map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    enum TestCli {
        Combine(combine::CombineArgs),
        Correct(correct::CorrectArgs),
    }

    #[test]
    fn test_overwrite_policy() {
        assert_eq!(overwrite_policy(None, false), None);
        assert_eq!(
            overwrite_policy(Some(OverwriteArg::Keep), false),
            Some(OverwritePolicy::Keep)
        );
        assert_eq!(
            overwrite_policy(Some(OverwriteArg::Keep), true),
            Some(OverwritePolicy::Confirm)
        );
    }

    #[test]
    fn test_combine_and_correct_accept_overwrite_policy() {
        let cli = TestCli::try_parse_from([
            "optred", "combine", "-k", "bias", "--overwrite", "keep", "b*.fits",
        ])
        .unwrap();
        let TestCli::Combine(args) = cli else {
            panic!("expected combine");
        };
        assert_eq!(
            overwrite_policy(args.overwrite, args.interactive),
            Some(OverwritePolicy::Keep)
        );

        let cli = TestCli::try_parse_from([
            "optred",
            "correct",
            "--master-bias",
            "masterbias.fits",
            "--master-flat",
            "masterflat_R.fits",
            "-i",
            "obj*.fits",
        ])
        .unwrap();
        let TestCli::Correct(args) = cli else {
            panic!("expected correct");
        };
        assert_eq!(
            overwrite_policy(args.overwrite, args.interactive),
            Some(OverwritePolicy::Confirm)
        );
    }
}
