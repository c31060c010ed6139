use std::path::{Path, PathBuf};

use crate::classify::SkippedFile;

/// Reduction stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReductionStage {
    Classifying,
    CombiningBias,
    CombiningFlats,
    Correcting,
    Writing,
}

impl std::fmt::Display for ReductionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classifying => write!(f, "Classifying frames"),
            Self::CombiningBias => write!(f, "Combining bias"),
            Self::CombiningFlats => write!(f, "Combining flats"),
            Self::Correcting => write!(f, "Correcting frames"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for a reduction run.
///
/// All methods have default implementations: progress calls do nothing and
/// overwrite confirmation is granted.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage, if known.
    fn begin_stage(&self, _stage: ReductionStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}

    /// Asked before an existing output is deleted under
    /// [`OverwritePolicy::Confirm`](crate::io::OverwritePolicy::Confirm).
    fn confirm_overwrite(&self, _path: &Path) -> bool {
        true
    }
}

/// Reporter that ignores progress and always confirms.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Where a master came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MasterSource {
    /// Combined from `frames` inputs and written to `path`.
    Combined { path: PathBuf, frames: usize },
    /// Loaded from a user-supplied file.
    Supplied(PathBuf),
}

impl MasterSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Combined { path, .. } => path,
            Self::Supplied(path) => path,
        }
    }
}

/// Outcome of one filter.
#[derive(Clone, Debug)]
pub struct FilterSummary {
    pub filter: String,
    pub master_flat: MasterSource,
    pub corrected: Vec<PathBuf>,
}

/// What a reduction run produced.
#[derive(Clone, Debug, Default)]
pub struct ReductionSummary {
    pub inspected: usize,
    pub bias_frames: usize,
    pub dark_frames: usize,
    pub flat_frames: usize,
    pub object_frames: usize,
    pub master_bias: Option<MasterSource>,
    pub filters: Vec<FilterSummary>,
    /// Filters with objects or flats but no usable master flat.
    pub skipped_filters: Vec<String>,
    pub skipped_files: Vec<SkippedFile>,
}

impl ReductionSummary {
    /// Every corrected frame written, across filters.
    pub fn corrected(&self) -> impl Iterator<Item = &PathBuf> {
        self.filters.iter().flat_map(|f| f.corrected.iter())
    }
}
