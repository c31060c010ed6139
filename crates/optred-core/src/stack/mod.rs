pub mod mean;
pub mod median;
pub mod sigma_clip;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OptredError, Result};
use crate::frame::Frame;

pub use mean::mean_stack;
pub use median::median_stack;
pub use sigma_clip::{sigma_clip_stack, SigmaClipParams};

/// Pixel-wise reduction used to combine a stack of frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CombineMethod {
    Mean,
    Median,
    SigmaClip(SigmaClipParams),
}

impl fmt::Display for CombineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Median => write!(f, "median"),
            Self::SigmaClip(p) => write!(f, "sigma-clipped mean ({}σ, {} iter)", p.sigma, p.iterations),
        }
    }
}

/// Combine frames with the given method. The result has an empty header.
pub fn combine(frames: &[Frame], method: &CombineMethod) -> Result<Frame> {
    match method {
        CombineMethod::Mean => mean_stack(frames),
        CombineMethod::Median => median_stack(frames),
        CombineMethod::SigmaClip(params) => sigma_clip_stack(frames, params),
    }
}

/// All frames must be present and share one shape.
pub(crate) fn check_stack(frames: &[Frame]) -> Result<(usize, usize, usize)> {
    let first = frames.first().ok_or(OptredError::EmptySequence)?;
    for frame in &frames[1..] {
        first.ensure_same_shape(frame)?;
    }
    Ok(first.shape())
}
