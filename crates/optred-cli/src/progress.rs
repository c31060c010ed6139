use std::path::Path;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use optred_core::io::OverwritePolicy;
use optred_core::pipeline::{ProgressReporter, ReductionStage};

/// Drives an indicatif bar from pipeline progress and, when interactive,
/// asks on the terminal before outputs are deleted.
pub struct BarReporter {
    bar: ProgressBar,
    interactive: bool,
}

impl BarReporter {
    pub fn new(interactive: bool) -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:20} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar, interactive })
    }

    /// Reporter that prompts exactly when the policy asks for confirmation.
    pub fn for_policy(policy: OverwritePolicy) -> anyhow::Result<Self> {
        Self::new(policy == OverwritePolicy::Confirm)
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: ReductionStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn confirm_overwrite(&self, path: &Path) -> bool {
        if !self.interactive {
            return true;
        }
        self.bar.suspend(|| confirm_delete(path))
    }
}

/// Ask whether `path` may be deleted. Anything but "n"/"no" is a yes.
pub fn confirm_delete(path: &Path) -> bool {
    let term = Term::stderr();
    let prompt = format!(
        "{} exists and will be deleted. Press ENTER to continue or type 'n' to stop: ",
        path.display()
    );
    if term.write_str(&prompt).is_err() {
        return false;
    }
    match term.read_line() {
        Ok(answer) => !matches!(answer.trim().to_ascii_lowercase().as_str(), "n" | "no"),
        Err(_) => false,
    }
}
