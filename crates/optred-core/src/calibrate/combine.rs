use tracing::{debug, info};

use crate::consts::{FILTER_KEY, IMAGETYP_KEY, MASTER_BIAS_STEM};
use crate::error::{OptredError, Result};
use crate::frame::Frame;
use crate::header::Header;
use crate::io::output::master_flat_name;
use crate::stack::{combine, CombineMethod};
use crate::stats::{frame_median, FrameStats};

fn log_input_stats(frames: &[Frame], kind: &str) {
    for frame in frames {
        let s = FrameStats::of(frame);
        debug!(
            frame = %frame.label(),
            mean = s.mean,
            median = s.median,
            stddev = s.stddev,
            "{kind} input"
        );
    }
    info!(count = frames.len(), "Loaded {kind} frames");
}

/// Amplifier headers of a master come from the last input, like the
/// propagated primary keywords.
fn master_plane_headers(frames: &[Frame]) -> Vec<Header> {
    frames
        .last()
        .map(|f| f.plane_headers.clone())
        .unwrap_or_default()
}

/// Header for a derived master: propagated keywords from the last input,
/// a new `IMAGETYP`, and provenance lines naming every input.
fn master_header(
    frames: &[Frame],
    keywords: &[String],
    imagetyp: &str,
    label: &str,
    method: &CombineMethod,
) -> Header {
    let mut header = Header::new();
    if let Some(representative) = frames.last() {
        header.copy_from(&representative.header, keywords);
    }
    header.set(IMAGETYP_KEY, imagetyp);

    let inputs: Vec<String> = frames
        .iter()
        .map(|f| {
            f.source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| f.label())
        })
        .collect();
    header.add_history(format!("{} - master {label} created", super::timestamp()));
    header.add_comment(format!(
        "Master {label} created from {method} of: [{}]",
        inputs.join(", ")
    ));
    header
}

/// Combine bias frames into a master bias.
pub fn build_master_bias(
    frames: &[Frame],
    method: &CombineMethod,
    keywords: &[String],
) -> Result<Frame> {
    log_input_stats(frames, "bias");
    let mut master = combine(frames, method)?;
    master.header = master_header(frames, keywords, MASTER_BIAS_STEM, "bias", method);
    master.plane_headers = master_plane_headers(frames);
    Ok(master)
}

/// Subtract the master bias and scale a flat to unit median.
pub fn normalize_flat(flat: &Frame, master_bias: &Frame) -> Result<Frame> {
    master_bias.ensure_same_shape(flat)?;
    let mut out = flat.clone();
    out.data -= &master_bias.data;

    let median = frame_median(&out);
    if !median.is_finite() || median == 0.0 {
        return Err(OptredError::DegenerateFlat {
            path: flat.label(),
            median,
        });
    }
    out.data /= median;
    debug!(frame = %flat.label(), median, "Normalized flat");
    Ok(out)
}

/// Combine one filter's flats into a master flat with median ~1.
///
/// Each flat is bias subtracted and divided by its own median before the
/// stack is reduced, so exposures at different illumination levels carry
/// equal weight.
pub fn build_master_flat(
    frames: &[Frame],
    master_bias: &Frame,
    filter: &str,
    method: &CombineMethod,
    keywords: &[String],
) -> Result<Frame> {
    log_input_stats(frames, "flat");
    let normalized = frames
        .iter()
        .map(|f| normalize_flat(f, master_bias))
        .collect::<Result<Vec<_>>>()?;
    let mut master = combine(&normalized, method)?;

    let mut keys = keywords.to_vec();
    if !keys.iter().any(|k| k.eq_ignore_ascii_case(FILTER_KEY)) {
        keys.push(FILTER_KEY.to_string());
    }
    let label = format!("flat ({filter})");
    master.header = master_header(frames, &keys, &master_flat_name(filter), &label, method);
    master.plane_headers = master_plane_headers(frames);
    Ok(master)
}
