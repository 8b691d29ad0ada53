use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::collect::global_variables::{
    get_data_file, get_output_path, BOUNDARY_FILE, SAC_FILE, SPA_FILE,
};
use crate::export::site_table::FieldMapping;
use crate::geo_core::CrsId;
use crate::geometric::scale_bar::AnchorFraction;

/// CRS to force on individual layers, as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerCrsOverrides {
    pub boundary: Option<String>,
    pub sac: Option<String>,
    pub spa: Option<String>,
}

impl LayerCrsOverrides {
    /// Canonical CRS forced on the boundary layer, if any
    pub fn boundary(&self) -> Option<CrsId> {
        self.boundary.as_deref().map(CrsId::parse)
    }

    pub fn sac(&self) -> Option<CrsId> {
        self.sac.as_deref().map(CrsId::parse)
    }

    pub fn spa(&self) -> Option<CrsId> {
        self.spa.as_deref().map(CrsId::parse)
    }
}

/// Settings of a search run, loaded from a JSON file.
///
/// Every field is optional in the file; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub boundary_path: PathBuf,
    pub sac_path: PathBuf,
    pub spa_path: PathBuf,
    pub output_path: PathBuf,
    /// EPSG code used when the layers disagree
    pub target_epsg: Option<i64>,
    pub layer_crs: LayerCrsOverrides,
    pub scale_bar_anchor: AnchorFraction,
    pub export_fields: FieldMapping,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            boundary_path: get_data_file(BOUNDARY_FILE),
            sac_path: get_data_file(SAC_FILE),
            spa_path: get_data_file(SPA_FILE),
            output_path: get_output_path(),
            target_epsg: None,
            layer_crs: LayerCrsOverrides::default(),
            scale_bar_anchor: AnchorFraction::default(),
            export_fields: FieldMapping::default(),
        }
    }
}

impl RunConfig {
    /// Load a config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
