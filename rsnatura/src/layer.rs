use geo::{BoundingRect, MultiPolygon};
use geojson::JsonObject;

use crate::geo_core::{BoundingBox, CrsId};

/// A single polygonal feature with its attribute record
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Site footprint; plain polygons are stored as one-member multipolygons
    pub geometry: MultiPolygon<f64>,
    /// Attribute record (site code, name, county...)
    pub attributes: JsonObject,
}

impl Feature {
    /// Create a feature, promoting a plain polygon to a multipolygon
    pub fn new(geometry: impl Into<MultiPolygon<f64>>, attributes: JsonObject) -> Self {
        Feature {
            geometry: geometry.into(),
            attributes,
        }
    }

    /// Attribute value by field name
    pub fn attribute(&self, field: &str) -> Option<&serde_json::Value> {
        self.attributes.get(field)
    }
}

/// A named collection of features sharing one CRS
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub crs: CrsId,
    pub features: Vec<Feature>,
}

impl Layer {
    /// Create a layer from already parsed features
    pub fn new(name: impl Into<String>, crs: CrsId, features: Vec<Feature>) -> Self {
        Layer {
            name: name.into(),
            crs,
            features,
        }
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Extent of every feature in the layer, `None` for an empty layer
    pub fn total_bounds(&self) -> Option<BoundingBox> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.bounding_rect())
            .map(BoundingBox::from_rect)
            .reduce(|a, b| {
                BoundingBox::new(
                    a.min_x.min(b.min_x),
                    a.min_y.min(b.min_y),
                    a.max_x.max(b.max_x),
                    a.max_y.max(b.max_y),
                )
            })
    }
}

/// The three fixed inputs of a search
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLayers {
    /// Administrative boundary (county outlines), used for context and extent
    pub boundary: Layer,
    /// Special Areas of Conservation
    pub sac: Layer,
    /// Special Protection Areas
    pub spa: Layer,
}

impl SiteLayers {
    /// Bundle the three input layers
    pub fn new(boundary: Layer, sac: Layer, spa: Layer) -> Self {
        SiteLayers { boundary, sac, spa }
    }

    /// Layers in a fixed order: boundary, SAC, SPA
    pub fn as_array(&self) -> [&Layer; 3] {
        [&self.boundary, &self.sac, &self.spa]
    }
}
