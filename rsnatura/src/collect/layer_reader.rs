use anyhow::{bail, Context, Result};
use geo::MultiPolygon;
use geojson::{FeatureCollection, GeoJson, JsonObject};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::SiteError;
use crate::geo_core::CrsId;
use crate::layer::{Feature, Layer};

/// Reads a polygon layer from a GeoJSON file.
///
/// Shapefiles are expected to be converted beforehand, e.g.
/// `ogr2ogr -f GeoJSON SAC.geojson SAC.shp`.
pub struct LayerReader {
    filepath: PathBuf,
    /// Layer name, defaults to the file stem
    name: Option<String>,
    /// CRS to assign instead of the one declared in the file
    set_crs: Option<CrsId>,
}

impl LayerReader {
    pub fn new(filepath: impl Into<PathBuf>, set_crs: Option<CrsId>) -> Self {
        LayerReader {
            filepath: filepath.into(),
            name: None,
            set_crs,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read and parse the file
    pub fn run(&self) -> Result<Layer> {
        let content = std::fs::read_to_string(&self.filepath)
            .with_context(|| format!("Failed to read layer file: {:?}", self.filepath))?;

        let name = self.name.clone().unwrap_or_else(|| {
            self.filepath
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "layer".to_string())
        });

        let layer = layer_from_geojson_str(&name, &content, self.set_crs.clone())
            .with_context(|| format!("Failed to load layer from {:?}", self.filepath))?;
        info!(
            "Loaded layer {} ({} features, {}) from {:?}",
            layer.name,
            layer.len(),
            layer.crs,
            self.filepath
        );
        if let Some(bounds) = layer.total_bounds() {
            debug!("Layer {} extent {:?}", layer.name, bounds);
        }
        Ok(layer)
    }
}

/// Build a layer from GeoJSON text.
///
/// CRS resolution order: `set_crs`, then the legacy `crs` member, then
/// OGC:CRS84 (the GeoJSON default).
pub fn layer_from_geojson_str(name: &str, content: &str, set_crs: Option<CrsId>) -> Result<Layer> {
    let geojson: GeoJson = content.parse().context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        GeoJson::Geometry(_) => bail!("Expected a Feature or FeatureCollection, found a bare geometry"),
    };

    let declared = declared_crs(collection.foreign_members.as_ref());
    let crs = match (set_crs, declared) {
        (Some(crs), declared) => {
            if let Some(declared) = declared.filter(|d| d != &crs) {
                debug!("Layer {}: overriding declared CRS {} with {}", name, declared, crs);
            }
            crs
        }
        (None, Some(declared)) => declared,
        (None, None) => CrsId::Crs84,
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!("Layer {}: feature {} has no geometry, skipped", name, index);
            continue;
        };

        let geometry = geo::Geometry::<f64>::try_from(geometry).map_err(|e| {
            SiteError::Geometry(format!("layer {}, feature {}: {}", name, index, e))
        })?;
        let geometry = match geometry {
            geo::Geometry::Polygon(polygon) => MultiPolygon::from(polygon),
            geo::Geometry::MultiPolygon(multi) => multi,
            _ => {
                return Err(SiteError::Geometry(format!(
                    "layer {}, feature {}: expected a polygon or multipolygon",
                    name, index
                ))
                .into())
            }
        };

        features.push(Feature {
            geometry,
            attributes: feature.properties.unwrap_or_default(),
        });
    }

    Ok(Layer::new(name, crs, features))
}

/// CRS named by the pre-RFC 7946 `crs` member, if any
fn declared_crs(foreign_members: Option<&JsonObject>) -> Option<CrsId> {
    foreign_members?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .map(CrsId::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAC_GEOJSON: &str = r#"
    {
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::2157" } },
        "features": [
            {
                "type": "Feature",
                "properties": { "SITECODE": "000002", "SITE_NAME": "Ballyallia Lake" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "SITECODE": "000019" },
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": { "SITECODE": "000020" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20, 0], [30, 0], [30, 10], [20, 0]]],
                        [[[40, 0], [50, 0], [50, 10], [40, 0]]]
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn test_layer_from_geojson() {
        let layer = layer_from_geojson_str("sac", SAC_GEOJSON, None).unwrap();
        assert_eq!(layer.crs, CrsId::Epsg(2157));
        // Null geometry skipped
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.features[0].geometry.0.len(), 1);
        assert_eq!(layer.features[1].geometry.0.len(), 2);
        assert_eq!(
            layer.features[0].attribute("SITE_NAME").and_then(|v| v.as_str()),
            Some("Ballyallia Lake")
        );
    }

    #[test]
    fn test_set_crs_overrides_declared() {
        let layer = layer_from_geojson_str("sac", SAC_GEOJSON, Some(CrsId::Epsg(29902))).unwrap();
        assert_eq!(layer.crs, CrsId::Epsg(29902));
    }

    #[test]
    fn test_default_crs_is_crs84() {
        let content = r#"{"type": "FeatureCollection", "features": []}"#;
        let layer = layer_from_geojson_str("empty", content, None).unwrap();
        assert_eq!(layer.crs, CrsId::Crs84);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_point_geometry_rejected() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1, 2] } }
            ]
        }"#;
        let err = layer_from_geojson_str("points", content, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::Geometry(_))
        ));
    }

    #[test]
    fn test_reader_uses_file_stem() {
        let mut file = tempfile::Builder::new()
            .prefix("SAC_ITM")
            .suffix(".geojson")
            .tempfile()
            .unwrap();
        file.write_all(SAC_GEOJSON.as_bytes()).unwrap();

        let layer = LayerReader::new(file.path(), None).run().unwrap();
        assert!(layer.name.starts_with("SAC_ITM"));
        assert_eq!(layer.len(), 2);

        let named = LayerReader::new(file.path(), None).with_name("sac").run().unwrap();
        assert_eq!(named.name, "sac");
    }

    #[test]
    fn test_missing_file() {
        assert!(LayerReader::new("does/not/exist.geojson", None).run().is_err());
    }
}
