use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{OptredError, Result};
use crate::frame::FrameKind;
use crate::header::Header;
use crate::io::{is_corrected_output, read_header};
use crate::telescope::Telescope;

/// A flat or object frame with the filter it was taken through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilteredFrame {
    pub path: PathBuf,
    pub filter: String,
}

/// A file the classifier could not bucket.
#[derive(Clone, Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Frames bucketed by exposure type.
#[derive(Clone, Debug, Default)]
pub struct ClassifiedFrames {
    pub bias: Vec<PathBuf>,
    pub darks: Vec<PathBuf>,
    pub flats: Vec<FilteredFrame>,
    pub objects: Vec<FilteredFrame>,
    /// Filters of flats and objects, in first-seen order.
    pub filters: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub inspected: usize,
}

impl ClassifiedFrames {
    pub fn push(&mut self, path: PathBuf, kind: FrameKind, filter: Option<String>) {
        if let Some(ref f) = filter {
            if !self.filters.contains(f) {
                self.filters.push(f.clone());
            }
        }
        match (kind, filter) {
            (FrameKind::Bias, _) => self.bias.push(path),
            (FrameKind::Dark, _) => self.darks.push(path),
            (FrameKind::Flat, Some(filter)) => self.flats.push(FilteredFrame { path, filter }),
            (FrameKind::Object, Some(filter)) => self.objects.push(FilteredFrame { path, filter }),
            (kind, None) => self.skipped.push(SkippedFile {
                path,
                reason: format!("{kind} frame without a filter"),
            }),
        }
    }

    /// Paths of flats or objects taken through exactly `filter`.
    pub fn files_for_filter(&self, kind: FrameKind, filter: &str) -> Vec<PathBuf> {
        let list = match kind {
            FrameKind::Flat => &self.flats,
            FrameKind::Object => &self.objects,
            _ => return Vec::new(),
        };
        list.iter()
            .filter(|f| f.filter == filter.trim())
            .map(|f| f.path.clone())
            .collect()
    }

    pub fn count(&self, kind: FrameKind) -> usize {
        match kind {
            FrameKind::Bias => self.bias.len(),
            FrameKind::Dark => self.darks.len(),
            FrameKind::Flat => self.flats.len(),
            FrameKind::Object => self.objects.len(),
        }
    }
}

/// Determine the kind (and filter, for flats and objects) from a header.
pub fn classify_header(
    header: &Header,
    telescope: Telescope,
    path: &Path,
) -> Result<(FrameKind, Option<String>)> {
    let type_key = telescope.type_keyword();
    let value = header
        .get_text(type_key)
        .ok_or_else(|| OptredError::MissingKeyword {
            path: path.to_path_buf(),
            key: type_key.to_string(),
        })?;
    let kind = FrameKind::from_type_value(&value).ok_or_else(|| OptredError::UnknownFrameType {
        path: path.to_path_buf(),
        value: value.clone(),
    })?;

    if !kind.has_filter() {
        return Ok((kind, None));
    }
    let filter_key = telescope.filter_keyword();
    let filter = header
        .get_text(filter_key)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| OptredError::MissingKeyword {
            path: path.to_path_buf(),
            key: filter_key.to_string(),
        })?;
    Ok((kind, Some(filter)))
}

/// Expand glob patterns. A pattern that matches nothing is kept as a
/// literal path so the classifier can report it missing.
///
/// Previously corrected frames (`*-bsub_flat.fits`) still carry their
/// science type, so they are dropped here rather than corrected again.
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matched = 0;
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(p) => {
                    matched += 1;
                    if is_corrected_output(&p) {
                        warn!(path = %p.display(), "Already corrected, ignoring");
                    } else {
                        paths.push(p);
                    }
                }
                Err(e) => warn!(error = %e, "Unreadable glob match"),
            }
        }
        if matched == 0 {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

/// Read each file's primary header and bucket it.
///
/// Missing or unclassifiable files are logged and skipped.
pub fn classify_files(paths: &[PathBuf], telescope: Telescope) -> ClassifiedFrames {
    let mut out = ClassifiedFrames {
        inspected: paths.len(),
        ..Default::default()
    };

    for path in paths {
        let result = read_header(path, 0).and_then(|h| classify_header(&h, telescope, path));
        match result {
            Ok((kind, filter)) => out.push(path.clone(), kind, filter),
            Err(e) => {
                warn!("{} - {}, ignoring", path.display(), e);
                out.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        inspected = out.inspected,
        bias = out.bias.len(),
        darks = out.darks.len(),
        flats = out.flats.len(),
        objects = out.objects.len(),
        filters = ?out.filters,
        skipped = out.skipped.len(),
        "Classified frames"
    );
    out
}
