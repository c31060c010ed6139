use ndarray::ArrayBase;

use crate::frame::Frame;

/// Whole-frame pixel statistics over finite values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub mean: f64,
    pub median: f32,
    pub stddev: f64,
    pub min: f32,
    pub max: f32,
    /// Number of NaN/inf pixels, excluded from the other fields.
    pub non_finite: usize,
}

impl FrameStats {
    pub fn of(frame: &Frame) -> Self {
        pixel_stats(&frame.data)
    }
}

/// Statistics of any pixel array.
pub fn pixel_stats<S, D>(data: &ArrayBase<S, D>) -> FrameStats
where
    S: ndarray::Data<Elem = f32>,
    D: ndarray::Dimension,
{
    let mut values: Vec<f32> = data.iter().copied().filter(|v| v.is_finite()).collect();
    let non_finite = data.len() - values.len();
    if values.is_empty() {
        return FrameStats {
            non_finite,
            ..Default::default()
        };
    }

    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    FrameStats {
        mean,
        median: median_in_place(&mut values),
        stddev: var.sqrt(),
        min,
        max,
        non_finite,
    }
}

/// Median of a frame's finite pixels (NaN if there are none).
pub fn frame_median(frame: &Frame) -> f32 {
    let mut values: Vec<f32> = frame.data.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return f32::NAN;
    }
    median_in_place(&mut values)
}

/// Median via `select_nth_unstable`; even counts average the middle pair.
/// Reorders `values`. Must not be empty.
pub fn median_in_place(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Number of NaN/inf pixels in a frame.
pub fn count_non_finite(frame: &Frame) -> usize {
    frame.data.iter().filter(|v| !v.is_finite()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Header;
    use ndarray::Array2;

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median_in_place(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median_in_place(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median_in_place(&mut [7.0]), 7.0);
    }

    #[test]
    fn test_stats_basic() {
        let frame = Frame::from_plane(
            Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
            Header::new(),
        );
        let s = FrameStats::of(&frame);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert_eq!(s.median, 2.5);
        assert!((s.stddev - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!((s.min, s.max), (1.0, 4.0));
        assert_eq!(s.non_finite, 0);
    }

    #[test]
    fn test_stats_skip_non_finite() {
        let frame = Frame::from_plane(
            Array2::from_shape_vec((1, 4), vec![1.0, f32::NAN, 3.0, f32::INFINITY]).unwrap(),
            Header::new(),
        );
        let s = FrameStats::of(&frame);
        assert_eq!(s.non_finite, 2);
        assert_eq!(s.median, 2.0);
        assert_eq!(count_non_finite(&frame), 2);
    }

    #[test]
    fn test_frame_median_all_nan() {
        let frame = Frame::from_plane(Array2::from_elem((2, 2), f32::NAN), Header::new());
        assert!(frame_median(&frame).is_nan());
    }
}
