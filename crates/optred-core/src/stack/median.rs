use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::Result;
use crate::frame::Frame;
use crate::header::Header;
use crate::stats::median_in_place;

use super::check_stack;

/// Stack frames by computing the median at each pixel position.
///
/// Uses `select_nth_unstable` for O(n) median without full sort.
/// Parallelizes at the row level for planes >= 256x256.
pub fn median_stack(frames: &[Frame]) -> Result<Frame> {
    let (planes, h, w) = check_stack(frames)?;
    let n = frames.len();

    let mut result = Array3::<f32>::zeros((planes, h, w));
    for p in 0..planes {
        let plane = if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
            median_plane_parallel(frames, p, h, w)
        } else {
            median_plane(frames, p, h, w)
        };
        result.index_axis_mut(Axis(0), p).assign(&plane);
    }

    Ok(Frame::new(result, Header::new()))
}

fn median_plane(frames: &[Frame], p: usize, h: usize, w: usize) -> Array2<f32> {
    let mut result = Array2::<f32>::zeros((h, w));
    let mut pixel_values = vec![0.0f32; frames.len()];

    for row in 0..h {
        for col in 0..w {
            for (i, frame) in frames.iter().enumerate() {
                pixel_values[i] = frame.data[[p, row, col]];
            }
            result[[row, col]] = median_in_place(&mut pixel_values);
        }
    }
    result
}

fn median_plane_parallel(frames: &[Frame], p: usize, h: usize, w: usize) -> Array2<f32> {
    let n = frames.len();
    // Row-parallel: each row allocates its own pixel_values
    let rows: Vec<Vec<f32>> = (0..h)
        .into_par_iter()
        .map(|row| {
            let mut pixel_values = vec![0.0f32; n];
            let mut row_result = vec![0.0f32; w];
            for (col, result) in row_result.iter_mut().enumerate() {
                for (i, frame) in frames.iter().enumerate() {
                    pixel_values[i] = frame.data[[p, row, col]];
                }
                *result = median_in_place(&mut pixel_values);
            }
            row_result
        })
        .collect();

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}
