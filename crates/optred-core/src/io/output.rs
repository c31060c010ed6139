use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{CORRECTED_SUFFIX, MASTER_BIAS_STEM, MASTER_FLAT_STEM};
use crate::error::{OptredError, Result};

/// What to do when an output file already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Delete the old file and write the new one.
    #[default]
    Replace,
    /// Ask before deleting; a refusal aborts with an error.
    Confirm,
    /// Never delete; existing outputs are an error.
    Keep,
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "Replace"),
            Self::Confirm => write!(f, "Confirm"),
            Self::Keep => write!(f, "Keep"),
        }
    }
}

/// Clear the way for writing `path`.
///
/// Existing files are deleted before the new one is created; nothing is
/// written atomically, so an interrupted run can lose the old output.
pub fn prepare_output<F>(path: &Path, policy: OverwritePolicy, confirm: F) -> Result<()>
where
    F: FnOnce(&Path) -> bool,
{
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        return Ok(());
    }
    match policy {
        OverwritePolicy::Replace => {}
        OverwritePolicy::Confirm => {
            if !confirm(path) {
                return Err(OptredError::OutputExists(path.to_path_buf()));
            }
        }
        OverwritePolicy::Keep => return Err(OptredError::OutputExists(path.to_path_buf())),
    }
    warn!(path = %path.display(), "Deleting existing file");
    std::fs::remove_file(path)?;
    Ok(())
}

pub fn master_bias_path(dir: &Path) -> PathBuf {
    dir.join(format!("{MASTER_BIAS_STEM}.fits"))
}

pub fn master_flat_path(dir: &Path, filter: &str) -> PathBuf {
    dir.join(format!("{}.fits", master_flat_name(filter)))
}

/// `IMAGETYP` value and file stem of a filter's master flat.
pub fn master_flat_name(filter: &str) -> String {
    format!("{MASTER_FLAT_STEM}_{}", sanitize_filter(filter))
}

/// Filter names are free text; keep them safe for file names.
fn sanitize_filter(filter: &str) -> String {
    filter
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Output path of a corrected science frame: `<stem>-bsub_flat.fits`,
/// beside the input unless `output_dir` is given.
pub fn corrected_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = strip_fits_extension(&name);
    let file_name = format!("{stem}{CORRECTED_SUFFIX}.fits");
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// True for files named like [`corrected_path`] output.
pub fn is_corrected_output(path: &Path) -> bool {
    path.file_name()
        .map(|n| strip_fits_extension(&n.to_string_lossy()).ends_with(CORRECTED_SUFFIX))
        .unwrap_or(false)
}

fn strip_fits_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    for ext in [".fits", ".fit", ".fts"] {
        if lower.ends_with(ext) {
            return &name[..name.len() - ext.len()];
        }
    }
    name
}
