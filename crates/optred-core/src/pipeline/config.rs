use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PROPAGATED_KEYWORDS;
use crate::io::OverwritePolicy;
use crate::stack::CombineMethod;
use crate::telescope::Telescope;

/// Everything a reduction run needs. Serializes to TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReductionConfig {
    /// File paths or glob patterns.
    pub inputs: Vec<String>,
    #[serde(default)]
    pub telescope: Telescope,
    /// Where masters and corrected frames go. Defaults to each input's
    /// directory for corrected frames and the working directory for masters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Use this master bias instead of combining bias frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_bias: Option<PathBuf>,
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    #[serde(default = "default_propagated_keywords")]
    pub propagated_keywords: Vec<String>,
    /// Per-filter master flat overrides.
    #[serde(default)]
    pub master_flats: BTreeMap<String, PathBuf>,
    #[serde(default = "MasterConfig::bias")]
    pub bias: MasterConfig,
    #[serde(default = "MasterConfig::flat")]
    pub flat: MasterConfig,
}

fn default_propagated_keywords() -> Vec<String> {
    DEFAULT_PROPAGATED_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            inputs: vec!["*.fits".to_string()],
            telescope: Telescope::default(),
            output_dir: None,
            master_bias: None,
            overwrite: OverwritePolicy::default(),
            propagated_keywords: default_propagated_keywords(),
            master_flats: BTreeMap::new(),
            bias: MasterConfig::bias(),
            flat: MasterConfig::flat(),
        }
    }
}

impl ReductionConfig {
    /// Directory masters are written to.
    pub fn master_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Master flat override for `filter`, matched on trimmed name.
    pub fn master_flat_override(&self, filter: &str) -> Option<&Path> {
        let filter = filter.trim();
        self.master_flats
            .iter()
            .find(|(k, _)| k.trim() == filter)
            .map(|(_, p)| p.as_path())
    }
}

/// How one kind of master is combined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasterConfig {
    pub method: CombineMethod,
}

impl MasterConfig {
    pub fn bias() -> Self {
        Self {
            method: CombineMethod::Mean,
        }
    }

    pub fn flat() -> Self {
        Self {
            method: CombineMethod::Median,
        }
    }
}
