use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{OptredError, Result};
use crate::header::Header;

/// A CCD frame: one or more pixel planes plus the primary header.
///
/// Pixel data has shape `(planes, height, width)`. Single-amplifier images
/// carry one plane; multi-extension cameras carry one plane per amplifier.
/// Values are raw detector units (ADU) as f32.
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Array3<f32>,
    pub header: Header,
    /// Extension header of each plane, for frames read from one extension
    /// per amplifier. Empty otherwise.
    pub plane_headers: Vec<Header>,
    /// File the frame was read from, if any.
    pub source: Option<PathBuf>,
}

impl Frame {
    pub fn new(data: Array3<f32>, header: Header) -> Self {
        Self {
            data,
            header,
            plane_headers: Vec::new(),
            source: None,
        }
    }

    pub fn with_plane_headers(mut self, headers: Vec<Header>) -> Self {
        self.plane_headers = headers;
        self
    }

    pub fn plane_header(&self, index: usize) -> Option<&Header> {
        self.plane_headers.get(index)
    }

    /// Wrap a single 2D image.
    pub fn from_plane(plane: Array2<f32>, header: Header) -> Self {
        Self::new(plane.insert_axis(Axis(0)), header)
    }

    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    pub fn planes(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn is_single_plane(&self) -> bool {
        self.planes() == 1
    }

    pub fn plane(&self, index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), index)
    }

    /// Display name used in logs and error messages.
    pub fn label(&self) -> String {
        match &self.source {
            Some(p) => p.display().to_string(),
            None => "<memory>".to_string(),
        }
    }

    /// Error unless `other` has the same pixel shape.
    pub fn ensure_same_shape(&self, other: &Frame) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(OptredError::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
                context: other.label(),
            });
        }
        Ok(())
    }
}

/// Exposure type of a raw frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    Bias,
    Dark,
    Flat,
    Object,
}

impl FrameKind {
    /// Classify a free-text type value by case-insensitive prefix.
    ///
    /// `zero` and `bias` are both bias frames.
    pub fn from_type_value(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value.starts_with("zero") || value.starts_with("bias") {
            Some(Self::Bias)
        } else if value.starts_with("dark") {
            Some(Self::Dark)
        } else if value.starts_with("object") {
            Some(Self::Object)
        } else if value.starts_with("flat") {
            Some(Self::Flat)
        } else {
            None
        }
    }

    /// Flats and objects are tied to a filter.
    pub fn has_filter(&self) -> bool {
        matches!(self, Self::Flat | Self::Object)
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bias => write!(f, "bias"),
            Self::Dark => write!(f, "dark"),
            Self::Flat => write!(f, "flat"),
            Self::Object => write!(f, "object"),
        }
    }
}
