use std::str::FromStr;

use ndarray::{s, Array2, ArrayView2};

use crate::error::{OptredError, Result};

/// A FITS section `[x1:x2,y1:y2]`: 1-based, inclusive, `x` along NAXIS1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrimSection {
    pub x_start: usize,
    pub x_end: usize,
    pub y_start: usize,
    pub y_end: usize,
}

impl TrimSection {
    pub fn width(&self) -> usize {
        self.x_end - self.x_start + 1
    }

    pub fn height(&self) -> usize {
        self.y_end - self.y_start + 1
    }

    /// Cut the section out of a `(height, width)` plane.
    pub fn apply(&self, plane: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (h, w) = plane.dim();
        if self.x_end > w || self.y_end > h {
            return Err(OptredError::InvalidTrimSection(format!(
                "{self} exceeds a {w}x{h} image"
            )));
        }
        Ok(plane
            .slice(s![self.y_start - 1..self.y_end, self.x_start - 1..self.x_end])
            .to_owned())
    }
}

impl FromStr for TrimSection {
    type Err = OptredError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || OptredError::InvalidTrimSection(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .ok_or_else(invalid)?;
        let (xs, ys) = inner.split_once(',').ok_or_else(invalid)?;
        let (x_start, x_end) = parse_range(xs).ok_or_else(invalid)?;
        let (y_start, y_end) = parse_range(ys).ok_or_else(invalid)?;
        Ok(Self {
            x_start,
            x_end,
            y_start,
            y_end,
        })
    }
}

impl std::fmt::Display for TrimSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{},{}:{}]",
            self.x_start, self.x_end, self.y_start, self.y_end
        )
    }
}

fn parse_range(s: &str) -> Option<(usize, usize)> {
    let (a, b) = s.split_once(':')?;
    let a: usize = a.trim().parse().ok()?;
    let b: usize = b.trim().parse().ok()?;
    (a >= 1 && a <= b).then_some((a, b))
}
