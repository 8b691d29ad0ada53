use anyhow::{Context, Result};
use geojson::FeatureCollection;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::geo_core::{BoundingBox, CrsId};
use crate::geometric::scale_bar::ScaleBarSpec;
use crate::geometric::symbology::{style_for, Category, Style, SymbolHandle, LEGEND_TITLE};
use crate::geometric::zone::SearchPoint;
use crate::layer::Feature;
use crate::pipeline::SearchOutcome;

/// A styled layer of the map
#[derive(Debug, Clone, Serialize)]
pub struct MapLayer {
    pub category: Category,
    pub label: String,
    pub style: Style,
    pub features: FeatureCollection,
}

impl MapLayer {
    fn new(category: Category, features: &[Feature]) -> Self {
        MapLayer {
            category,
            label: category.label().to_string(),
            style: style_for(category),
            features: to_feature_collection(features),
        }
    }
}

/// Input of the external map renderer, drawn bottom layer first
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub crs: CrsId,
    pub extent: BoundingBox,
    pub radius_km: f64,
    pub layers: Vec<MapLayer>,
    pub search_point: SearchPoint,
    pub search_point_style: Style,
    pub scale_bar: ScaleBarSpec,
    pub legend_title: String,
    pub legend: Vec<SymbolHandle>,
}

impl MapDocument {
    /// Assemble the document from a finished search
    pub fn from_outcome(outcome: &SearchOutcome) -> Self {
        let zone = Feature::new(outcome.zone.polygon().clone(), geojson::JsonObject::new());

        MapDocument {
            crs: outcome.active_crs.clone(),
            extent: outcome.extent,
            radius_km: outcome.zone.radius_km(),
            layers: vec![
                MapLayer::new(Category::Boundary, &outcome.layers.boundary.features),
                MapLayer::new(Category::Sac, &outcome.sac.features),
                MapLayer::new(Category::Spa, &outcome.spa.features),
                MapLayer::new(Category::Zone, &[zone]),
            ],
            search_point: outcome.zone.center(),
            search_point_style: style_for(Category::SearchPoint),
            scale_bar: outcome.scale_bar.clone(),
            legend_title: LEGEND_TITLE.to_string(),
            legend: outcome.legend.clone(),
        }
    }

    /// Save as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize map document")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write map document: {:?}", path))?;
        info!("Map document saved to: {:?}", path);
        Ok(())
    }
}

fn to_feature_collection(features: &[Feature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features
            .iter()
            .map(|f| geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&f.geometry))),
                id: None,
                properties: Some(f.attributes.clone()),
                foreign_members: None,
            })
            .collect(),
        foreign_members: None,
    }
}
