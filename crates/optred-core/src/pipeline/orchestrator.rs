use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::calibrate::{build_master_bias, build_master_flat, correct_frame};
use crate::classify::{classify_files, expand_inputs, ClassifiedFrames};
use crate::error::{OptredError, Result};
use crate::frame::{Frame, FrameKind};
use crate::io::{
    corrected_path, master_bias_path, master_flat_path, prepare_output, read_frame, read_master,
    write_frame,
};
use crate::telescope::Telescope;

use super::config::ReductionConfig;
use super::types::{
    FilterSummary, MasterSource, NoOpReporter, ProgressReporter, ReductionStage, ReductionSummary,
};

/// Load a user-supplied master. It must exist.
pub fn load_master(path: &Path) -> Result<Frame> {
    if !path.is_file() {
        return Err(OptredError::MissingMaster(path.to_path_buf()));
    }
    let frame = read_master(path)?;
    info!(path = %path.display(), shape = ?frame.shape(), "Using supplied master");
    Ok(frame)
}

fn load_frames(
    paths: &[PathBuf],
    telescope: Telescope,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<Frame>> {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let frame = read_frame(path, telescope)?;
            reporter.advance(i + 1);
            Ok(frame)
        })
        .collect()
}

/// Clear `path` according to the overwrite policy and write `frame` there.
fn write_output(
    path: &Path,
    frame: &Frame,
    config: &ReductionConfig,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    prepare_output(path, config.overwrite, |p| reporter.confirm_overwrite(p))?;
    write_frame(path, frame)?;
    info!(path = %path.display(), "Wrote frame");
    Ok(())
}

fn resolve_master_bias(
    config: &ReductionConfig,
    classified: &ClassifiedFrames,
    reporter: &dyn ProgressReporter,
) -> Result<(Frame, MasterSource)> {
    if let Some(path) = &config.master_bias {
        return Ok((load_master(path)?, MasterSource::Supplied(path.clone())));
    }
    if classified.bias.is_empty() {
        return Err(OptredError::NoFrames(FrameKind::Bias.to_string()));
    }

    reporter.begin_stage(ReductionStage::CombiningBias, Some(classified.bias.len()));
    let frames = load_frames(&classified.bias, config.telescope, reporter)?;
    let master = build_master_bias(&frames, &config.bias.method, &config.propagated_keywords)?;
    reporter.finish_stage();

    let path = master_bias_path(config.master_dir());
    reporter.begin_stage(ReductionStage::Writing, Some(1));
    write_output(&path, &master, config, reporter)?;
    reporter.finish_stage();
    info!(frames = frames.len(), path = %path.display(), "Master bias created");

    Ok((
        master,
        MasterSource::Combined {
            path,
            frames: frames.len(),
        },
    ))
}

/// Master flat for one filter, or `None` when there is neither an override
/// nor any flat taken through it.
fn resolve_master_flat(
    config: &ReductionConfig,
    classified: &ClassifiedFrames,
    filter: &str,
    master_bias: &Frame,
    reporter: &dyn ProgressReporter,
) -> Result<Option<(Frame, MasterSource)>> {
    if let Some(path) = config.master_flat_override(filter) {
        let master = load_master(path)?;
        return Ok(Some((master, MasterSource::Supplied(path.to_path_buf()))));
    }
    let flats = classified.files_for_filter(FrameKind::Flat, filter);
    if flats.is_empty() {
        return Ok(None);
    }

    reporter.begin_stage(ReductionStage::CombiningFlats, Some(flats.len()));
    let frames = load_frames(&flats, config.telescope, reporter)?;
    let master = build_master_flat(
        &frames,
        master_bias,
        filter,
        &config.flat.method,
        &config.propagated_keywords,
    )?;
    reporter.finish_stage();

    let path = master_flat_path(config.master_dir(), filter);
    reporter.begin_stage(ReductionStage::Writing, Some(1));
    write_output(&path, &master, config, reporter)?;
    reporter.finish_stage();
    info!(filter, frames = frames.len(), path = %path.display(), "Master flat created");

    Ok(Some((
        master,
        MasterSource::Combined {
            path,
            frames: frames.len(),
        },
    )))
}

/// Run a full reduction without progress reporting.
pub fn run_reduction(config: &ReductionConfig) -> Result<ReductionSummary> {
    run_reduction_reported(config, Arc::new(NoOpReporter))
}

/// Classify the inputs, build (or load) the masters and correct every
/// object frame whose filter has a master flat.
pub fn run_reduction_reported(
    config: &ReductionConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<ReductionSummary> {
    let reporter = reporter.as_ref();

    reporter.begin_stage(ReductionStage::Classifying, None);
    let paths = expand_inputs(&config.inputs)?;
    let classified = classify_files(&paths, config.telescope);
    reporter.finish_stage();

    let mut summary = ReductionSummary {
        inspected: classified.inspected,
        bias_frames: classified.bias.len(),
        dark_frames: classified.darks.len(),
        flat_frames: classified.flats.len(),
        object_frames: classified.objects.len(),
        skipped_files: classified.skipped.clone(),
        ..Default::default()
    };

    let (master_bias, bias_source) = resolve_master_bias(config, &classified, reporter)?;
    summary.master_bias = Some(bias_source);

    if !classified.darks.is_empty() {
        info!(count = classified.darks.len(), "Dark frames are not used, ignoring");
    }

    for filter in &classified.filters {
        let Some((master_flat, flat_source)) =
            resolve_master_flat(config, &classified, filter, &master_bias, reporter)?
        else {
            let objects = classified.files_for_filter(FrameKind::Object, filter).len();
            warn!(filter = %filter, objects, "No flats and no master flat, skipping filter");
            summary.skipped_filters.push(filter.clone());
            continue;
        };

        let objects = classified.files_for_filter(FrameKind::Object, filter);
        reporter.begin_stage(ReductionStage::Correcting, Some(objects.len()));
        let mut corrected = Vec::with_capacity(objects.len());
        for (i, path) in objects.iter().enumerate() {
            let science = read_frame(path, config.telescope)?;
            let frame = correct_frame(&science, &master_bias, &master_flat)?;
            let out = corrected_path(path, config.output_dir.as_deref());
            write_output(&out, &frame, config, reporter)?;
            corrected.push(out);
            reporter.advance(i + 1);
        }
        reporter.finish_stage();
        info!(filter = %filter, frames = corrected.len(), "Corrected frames");

        summary.filters.push(FilterSummary {
            filter: filter.clone(),
            master_flat: flat_source,
            corrected,
        });
    }

    Ok(summary)
}
