use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptredError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),

    #[error("{path}: missing header keyword {key}")]
    MissingKeyword { path: PathBuf, key: String },

    #[error("{path}: unknown image type \"{value}\"")]
    UnknownFrameType { path: PathBuf, value: String },

    #[error("Invalid header card: {0}")]
    InvalidCard(String),

    #[error("Invalid trim section: {0}")]
    InvalidTrimSection(String),

    #[error("{path}: expected at least {expected} image extension(s), found {found}")]
    MissingExtensions {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("{path}: HDU {hdu} does not contain an image")]
    NotAnImage { path: PathBuf, hdu: usize },

    #[error("Shape mismatch: expected {expected:?}, got {found:?} ({context})")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
        context: String,
    },

    #[error("Pixel buffer does not match image shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Flat frame {path} has a degenerate median ({median})")]
    DegenerateFlat { path: String, median: f32 },

    #[error("No {0} frames to combine and no master given")]
    NoFrames(String),

    #[error("Master frame not found: {0}")]
    MissingMaster(PathBuf),

    #[error("Refusing to overwrite existing file {0}")]
    OutputExists(PathBuf),

    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, OptredError>;
