pub mod map_document;
pub mod site_table;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::collect::global_variables::{MAP_DOCUMENT_FILE, SAC_TABLE_FILE, SPA_TABLE_FILE};
use crate::pipeline::SearchOutcome;
use map_document::MapDocument;
use site_table::{write_site_table, FieldMapping};

/// Files written for one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub map_document: PathBuf,
    pub sac_table: PathBuf,
    pub spa_table: PathBuf,
}

/// Write the map document and both site tables into `output_path`
pub fn write_outputs(
    outcome: &SearchOutcome,
    fields: &FieldMapping,
    output_path: &Path,
) -> Result<OutputFiles> {
    std::fs::create_dir_all(output_path)
        .with_context(|| format!("Failed to create output directory: {:?}", output_path))?;

    let files = OutputFiles {
        map_document: output_path.join(MAP_DOCUMENT_FILE),
        sac_table: output_path.join(SAC_TABLE_FILE),
        spa_table: output_path.join(SPA_TABLE_FILE),
    };

    MapDocument::from_outcome(outcome).write(&files.map_document)?;
    write_site_table(&outcome.sac, fields, &files.sac_table)?;
    write_site_table(&outcome.spa, fields, &files.spa_table)?;

    Ok(files)
}
