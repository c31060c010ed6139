use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::Frame;
use crate::stats::count_non_finite;

/// Bias subtract and flat field a science frame: `(frame - bias) / flat`.
///
/// Dead flat pixels leave `inf`/`nan` in the output; they are counted and
/// logged, not masked. Correcting an already corrected frame subtracts the
/// bias a second time.
pub fn correct_frame(science: &Frame, master_bias: &Frame, master_flat: &Frame) -> Result<Frame> {
    science.ensure_same_shape(master_bias)?;
    science.ensure_same_shape(master_flat)?;

    let data = (&science.data - &master_bias.data) / &master_flat.data;

    let mut header = science.header.clone();
    header.add_history(format!(
        "{} - Bias and flat field corrected",
        super::timestamp()
    ));

    let corrected = Frame {
        data,
        header,
        plane_headers: science.plane_headers.clone(),
        source: science.source.clone(),
    };

    let bad = count_non_finite(&corrected);
    if bad > 0 {
        warn!(frame = %science.label(), pixels = bad, "Non-finite pixels after flat division");
    }
    debug!(frame = %science.label(), "Bias and flat corrected");
    Ok(corrected)
}
