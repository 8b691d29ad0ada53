use tracing::info;

use crate::error::Result;
use crate::geo_core::{BoundingBox, CoordinateTransformer, CrsId};
use crate::geometric::crs::reconcile;
use crate::geometric::scale_bar::{compute_scale_bar, AnchorFraction, ScaleBarSpec};
use crate::geometric::selection::{select_pair, SelectionResult};
use crate::geometric::symbology::{default_legend, SymbolHandle};
use crate::geometric::zone::{build_zone, SearchPoint, ZoneOfInfluence};
use crate::layer::SiteLayers;

/// Caller inputs of one search, already validated by the boundary
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub point: SearchPoint,
    pub radius_km: f64,
    /// EPSG code to reproject to when the layers disagree
    pub target_epsg: Option<i64>,
    pub anchor: AnchorFraction,
}

impl SearchRequest {
    /// Request with the default scale-bar anchor and no target EPSG code
    pub fn new(point: SearchPoint, radius_km: f64) -> Self {
        SearchRequest {
            point,
            radius_km,
            target_epsg: None,
            anchor: AnchorFraction::default(),
        }
    }

    pub fn with_target_epsg(mut self, target_epsg: Option<i64>) -> Self {
        self.target_epsg = target_epsg;
        self
    }
}

/// Everything the map composer and the exporter consume
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub active_crs: CrsId,
    pub reprojected: bool,
    /// Input layers, in the active CRS
    pub layers: SiteLayers,
    pub zone: ZoneOfInfluence,
    pub extent: BoundingBox,
    pub sac: SelectionResult,
    pub spa: SelectionResult,
    pub scale_bar: ScaleBarSpec,
    pub legend: Vec<SymbolHandle>,
}

/// Run one search: reconcile CRS, buffer, select, lay out scale bar and legend
pub fn run_search<T: CoordinateTransformer + ?Sized>(
    layers: SiteLayers,
    request: &SearchRequest,
    transformer: &T,
) -> Result<SearchOutcome> {
    let reconciled = reconcile(layers, request.target_epsg, transformer)?;

    let zone = build_zone(request.point, request.radius_km)?;
    let (sac, spa) = select_pair(&reconciled.layers.sac, &reconciled.layers.spa, &zone)?;

    let extent = zone.map_extent();
    let scale_bar = compute_scale_bar(zone.radius_km(), &extent, request.anchor)?;
    let legend = default_legend()?;

    info!(
        "Search at ({}, {}) within {} km: {} SAC, {} SPA ({})",
        request.point.x,
        request.point.y,
        request.radius_km,
        sac.len(),
        spa.len(),
        reconciled.active_crs
    );

    Ok(SearchOutcome {
        active_crs: reconciled.active_crs,
        reprojected: reconciled.reprojected,
        layers: reconciled.layers,
        zone,
        extent,
        sac,
        spa,
        scale_bar,
        legend,
    })
}
