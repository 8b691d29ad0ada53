//! rsnatura command-line tool
//!
//! Finds the SAC and SPA sites within a radius of a search point, then writes
//! a map composition document and one CSV table per designation.

mod prompt;

use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

use rsnatura::collect::layer_reader::LayerReader;
use rsnatura::config::RunConfig;
use rsnatura::export::write_outputs;
use rsnatura::geometric::crs::{check_consistency, CrsCheck};
use rsnatura::geometric::selection::SelectionResult;
use rsnatura::geometric::zone::SearchPoint;
use rsnatura::{logging, run_search, DefaultTransformer, SearchRequest, SiteLayers};

#[derive(Parser)]
#[command(name = "rsnatura")]
#[command(about = "Find Natura 2000 sites (SAC/SPA) within a radius of a point", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// County boundary layer (GeoJSON)
    #[arg(long)]
    boundary: Option<PathBuf>,

    /// Special Areas of Conservation layer (GeoJSON)
    #[arg(long)]
    sac: Option<PathBuf>,

    /// Special Protection Areas layer (GeoJSON)
    #[arg(long)]
    spa: Option<PathBuf>,

    /// X coordinate of the search point, prompted if missing
    #[arg(short = 'x', long, allow_hyphen_values = true)]
    x: Option<f64>,

    /// Y coordinate of the search point, prompted if missing
    #[arg(short = 'y', long, allow_hyphen_values = true)]
    y: Option<f64>,

    /// Search radius in kilometres, prompted if missing
    #[arg(short = 'r', long)]
    radius_km: Option<f64>,

    /// EPSG code to reproject to when the layers disagree (e.g. 2157 for ITM)
    #[arg(long)]
    target_epsg: Option<i64>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(path) = &self.boundary {
            config.boundary_path = path.clone();
        }
        if let Some(path) = &self.sac {
            config.sac_path = path.clone();
        }
        if let Some(path) = &self.spa {
            config.spa_path = path.clone();
        }
        if let Some(path) = &self.output_dir {
            config.output_path = path.clone();
        }
        if self.target_epsg.is_some() {
            config.target_epsg = self.target_epsg;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = logging::init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);

    let layers = SiteLayers::new(
        LayerReader::new(&config.boundary_path, config.layer_crs.boundary())
            .with_name("Boundary")
            .run()?,
        LayerReader::new(&config.sac_path, config.layer_crs.sac())
            .with_name("SAC")
            .run()?,
        LayerReader::new(&config.spa_path, config.layer_crs.spa())
            .with_name("SPA")
            .run()?,
    );

    let transformer = DefaultTransformer::default();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let target_epsg = match check_consistency(&layers) {
        CrsCheck::Consistent(crs) => {
            info!("All features are projected to {}", crs);
            None
        }
        CrsCheck::Mismatch([boundary, sac, spa]) => {
            warn!(
                "Input data will be reprojected: boundary {}, SAC {}, SPA {}",
                boundary, sac, spa
            );
            match config.target_epsg {
                Some(code) => Some(code),
                None => Some(prompt::prompt_value(
                    &mut input,
                    &mut output,
                    "Please enter the EPSG code used to reproject input data (ITM = 2157): ",
                    |answer| prompt::parse_target_epsg(answer, &transformer),
                )?),
            }
        }
    };

    let x = match args.x {
        Some(x) => x,
        None => prompt::prompt_value(
            &mut input,
            &mut output,
            "Enter X coordinate of search point: ",
            prompt::parse_coordinate,
        )?,
    };
    let y = match args.y {
        Some(y) => y,
        None => prompt::prompt_value(
            &mut input,
            &mut output,
            "Enter Y coordinate of search point: ",
            prompt::parse_coordinate,
        )?,
    };
    let radius_km = match args.radius_km {
        Some(r) => r,
        None => prompt::prompt_value(
            &mut input,
            &mut output,
            "Enter search radius in km: ",
            prompt::parse_radius,
        )?,
    };

    let mut request = SearchRequest::new(SearchPoint::new(x, y), radius_km)
        .with_target_epsg(target_epsg);
    request.anchor = config.scale_bar_anchor;

    let outcome = run_search(layers, &request, &transformer)?;
    let files = write_outputs(&outcome, &config.export_fields, &config.output_path)?;

    println!(
        "Search point ({}, {}), radius {} km, CRS {}",
        x, y, radius_km, outcome.active_crs
    );
    print_sites("SAC", &outcome.sac, &config);
    print_sites("SPA", &outcome.spa, &config);
    println!("Map document: {}", files.map_document.display());
    println!("Site tables: {}, {}", files.sac_table.display(), files.spa_table.display());

    Ok(())
}

fn print_sites(label: &str, selection: &SelectionResult, config: &RunConfig) {
    println!("{} sites within the zone: {}", label, selection.len());
    for feature in &selection.features {
        let field = |name: &str| {
            rsnatura::commons::basic_functions::attribute_to_cell(feature.attribute(name))
        };
        println!(
            "  {} {}",
            field(&config.export_fields.site_code),
            field(&config.export_fields.site_name)
        );
    }
}
