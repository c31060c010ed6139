use ndarray::Array3;

use crate::error::Result;
use crate::frame::Frame;
use crate::header::Header;

use super::check_stack;

/// Stack frames by computing the mean at each pixel.
pub fn mean_stack(frames: &[Frame]) -> Result<Frame> {
    let shape = check_stack(frames)?;
    let n = frames.len() as f32;

    let mut sum = Array3::<f32>::zeros(shape);

    for frame in frames {
        sum += &frame.data;
    }

    sum /= n;

    Ok(Frame::new(sum, Header::new()))
}
