use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{EXPTYPE_KEY, FILTER_KEY, IMAGETYP_KEY};

/// Camera/telescope combination, which decides header keywords and how the
/// pixel planes are assembled from the file's HDUs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Telescope {
    /// Single image in the primary HDU.
    #[default]
    Generic,
    /// VATT 4k CCD: two trimmed amplifier halves, second one read out reversed.
    Vatt,
    /// Bok 90Prime: one image extension per amplifier, kept as planes.
    #[serde(rename = "90prime")]
    Prime90,
    /// Swope CCD: primary image, type stored in `EXPTYPE`.
    Swope,
}

/// How a telescope's files map onto frame planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneLayout {
    Primary,
    SplitAmplifiers,
    MultiExtension,
}

impl Telescope {
    /// Header keyword holding the exposure type.
    pub fn type_keyword(&self) -> &'static str {
        match self {
            Self::Swope => EXPTYPE_KEY,
            _ => IMAGETYP_KEY,
        }
    }

    pub fn filter_keyword(&self) -> &'static str {
        FILTER_KEY
    }

    pub fn layout(&self) -> PlaneLayout {
        match self {
            Self::Generic | Self::Swope => PlaneLayout::Primary,
            Self::Vatt => PlaneLayout::SplitAmplifiers,
            Self::Prime90 => PlaneLayout::MultiExtension,
        }
    }
}

impl fmt::Display for Telescope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "Generic"),
            Self::Vatt => write!(f, "VATT"),
            Self::Prime90 => write!(f, "90Prime"),
            Self::Swope => write!(f, "Swope"),
        }
    }
}
