use std::path::PathBuf;

pub const OUTPUT_PATH: &str = "./output";
pub const DATA_PATH: &str = "data_files";

pub const BOUNDARY_FILE: &str = "Counties___Ungen_2019.geojson";
pub const SAC_FILE: &str = "SAC_ITM_2023_02.geojson";
pub const SPA_FILE: &str = "SPA_ITM_2021_10.geojson";

pub const MAP_DOCUMENT_FILE: &str = "map.json";
pub const SAC_TABLE_FILE: &str = "SAC_sites.csv";
pub const SPA_TABLE_FILE: &str = "SPA_sites.csv";

pub fn get_output_path() -> PathBuf {
    PathBuf::from(OUTPUT_PATH)
}

/// Default location of an input layer
pub fn get_data_file(file_name: &str) -> PathBuf {
    PathBuf::from(DATA_PATH).join(file_name)
}
