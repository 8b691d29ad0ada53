use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::commons::basic_functions::attribute_to_cell;
use crate::geometric::selection::SelectionResult;
use crate::layer::Feature;

/// Source attribute names of the exported columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub site_code: String,
    pub site_name: String,
    pub county: String,
    pub area: String,
    pub version: String,
    pub url: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        FieldMapping {
            site_code: "SITECODE".to_string(),
            site_name: "SITE_NAME".to_string(),
            county: "COUNTY".to_string(),
            area: "AREA".to_string(),
            version: "VERSION".to_string(),
            url: "URL".to_string(),
        }
    }
}

/// One row of a site table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteRecord {
    #[serde(rename = "Site Code")]
    pub site_code: String,
    #[serde(rename = "Site Name")]
    pub site_name: String,
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "Area")]
    pub area: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl SiteRecord {
    /// Read the mapped fields of `feature`; missing attributes become empty cells
    pub fn from_feature(feature: &Feature, fields: &FieldMapping) -> Self {
        let cell = |name: &str| attribute_to_cell(feature.attribute(name));
        SiteRecord {
            site_code: cell(&fields.site_code),
            site_name: cell(&fields.site_name),
            county: cell(&fields.county),
            area: cell(&fields.area),
            version: cell(&fields.version),
            url: cell(&fields.url),
        }
    }
}

/// Project a selection onto the exported fields, keeping feature order
pub fn site_records(selection: &SelectionResult, fields: &FieldMapping) -> Vec<SiteRecord> {
    selection
        .features
        .iter()
        .map(|f| SiteRecord::from_feature(f, fields))
        .collect()
}

/// Write a selection as CSV
pub fn write_site_table(
    selection: &SelectionResult,
    fields: &FieldMapping,
    path: &Path,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create site table: {:?}", path))?;

    // Written by hand so empty selections still get a header row
    writer
        .write_record(["Site Code", "Site Name", "County", "Area", "Version", "URL"])
        .context("Failed to write site table header")?;
    for record in site_records(selection, fields) {
        writer
            .serialize(&record)
            .with_context(|| format!("Failed to write site {}", record.site_code))?;
    }
    writer.flush().context("Failed to flush site table")?;

    info!(
        "{} table saved to: {:?} ({} sites)",
        selection.layer_name,
        path,
        selection.len()
    );
    Ok(())
}
