use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::Frame;
use crate::header::Header;

use super::check_stack;

/// Parameters for sigma-clipped mean stacking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SigmaClipParams {
    /// Number of rejection iterations (default: 2).
    pub iterations: usize,
    /// Values beyond mean +/- sigma*stddev are rejected (default: 2.5).
    pub sigma: f32,
}

impl Default for SigmaClipParams {
    fn default() -> Self {
        Self {
            iterations: 2,
            sigma: 2.5,
        }
    }
}

/// Stack frames using sigma-clipped mean.
///
/// Per pixel: compute mean and stddev, reject values more than `sigma` standard
/// deviations from the mean, then recompute the mean from remaining values.
/// Repeat for the configured number of iterations. Cosmic-ray hits in bias
/// and flat stacks are the usual rejects.
pub fn sigma_clip_stack(frames: &[Frame], params: &SigmaClipParams) -> Result<Frame> {
    let (planes, h, w) = check_stack(frames)?;
    let n = frames.len();
    let mut result = Array3::<f32>::zeros((planes, h, w));

    let mut pixel_values = vec![0.0f32; n];
    let mut mask = vec![true; n];

    for p in 0..planes {
        for row in 0..h {
            for col in 0..w {
                for (i, frame) in frames.iter().enumerate() {
                    pixel_values[i] = frame.data[[p, row, col]];
                    mask[i] = true;
                }
                result[[p, row, col]] = clipped_mean(&pixel_values, &mut mask, params);
            }
        }
    }

    Ok(Frame::new(result, Header::new()))
}

fn clipped_mean(values: &[f32], mask: &mut [bool], params: &SigmaClipParams) -> f32 {
    for _ in 0..params.iterations {
        let (mean, stddev) = mean_stddev(values, mask);
        if stddev < 1e-10 {
            break;
        }
        let lo = mean - params.sigma * stddev;
        let hi = mean + params.sigma * stddev;
        for (keep, &v) in mask.iter_mut().zip(values) {
            if *keep && (v < lo || v > hi) {
                *keep = false;
            }
        }
    }

    let (sum, count) = values
        .iter()
        .zip(mask.iter())
        .filter(|(_, keep)| **keep)
        .fold((0.0f32, 0u32), |(s, c), (&v, _)| (s + v, c + 1));

    if count > 0 {
        sum / count as f32
    } else {
        // If all values rejected, fall back to full mean
        values.iter().sum::<f32>() / values.len() as f32
    }
}

fn mean_stddev(values: &[f32], mask: &[bool]) -> (f32, f32) {
    let mut sum = 0.0f32;
    let mut count = 0u32;
    for (&v, &keep) in values.iter().zip(mask) {
        if keep {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f32;

    let mut var_sum = 0.0f32;
    for (&v, &keep) in values.iter().zip(mask) {
        if keep {
            let d = v - mean;
            var_sum += d * d;
        }
    }
    let stddev = (var_sum / count as f32).sqrt();
    (mean, stddev)
}
