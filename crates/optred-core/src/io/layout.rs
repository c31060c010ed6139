use ndarray::{concatenate, s, Array2, Axis};

use crate::error::{OptredError, Result};

/// Join the two VATT amplifier halves into one image.
///
/// The second amplifier reads out in the opposite direction, so it is
/// mirrored left to right before it is placed beside the first.
pub fn join_split_amplifiers(first: Array2<f32>, second: Array2<f32>) -> Result<Array2<f32>> {
    if first.nrows() != second.nrows() {
        return Err(OptredError::ShapeMismatch {
            expected: (1, first.nrows(), first.ncols()),
            found: (1, second.nrows(), second.ncols()),
            context: "second amplifier".into(),
        });
    }
    let mirrored = second.slice(s![.., ..;-1]);
    Ok(concatenate(Axis(1), &[first.view(), mirrored])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_mirrors_second_half() {
        let first = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let second = Array2::from_shape_vec((2, 2), vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let joined = join_split_amplifiers(first, second).unwrap();
        assert_eq!(joined.dim(), (2, 4));
        assert_eq!(joined.row(0).to_vec(), vec![1.0, 2.0, 6.0, 5.0]);
        assert_eq!(joined.row(1).to_vec(), vec![3.0, 4.0, 8.0, 7.0]);
    }

    #[test]
    fn test_join_height_mismatch() {
        let first = Array2::<f32>::zeros((3, 2));
        let second = Array2::<f32>::zeros((4, 2));
        assert!(join_split_amplifiers(first, second).is_err());
    }

    #[test]
    fn test_join_allows_different_widths() {
        let first = Array2::<f32>::zeros((2, 3));
        let second = Array2::<f32>::ones((2, 1));
        let joined = join_split_amplifiers(first, second).unwrap();
        assert_eq!(joined.dim(), (2, 4));
        assert_eq!(joined[[1, 3]], 1.0);
    }
}
