use geo::{BoundingRect, CoordsIter, Intersects};
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info, warn};

use crate::error::{Result, SiteError};
use crate::geo_core::CrsId;
use crate::geometric::zone::ZoneOfInfluence;
use crate::layer::{Feature, Layer};

/// Features of one layer that intersect the zone of influence
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub layer_name: String,
    pub crs: CrsId,
    /// Selected features, in source order, attributes untouched
    pub features: Vec<Feature>,
    /// Position of each selected feature in the source layer
    pub source_indices: Vec<usize>,
}

impl SelectionResult {
    /// Number of selected features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Bounding box of a feature stored in the R-tree
struct IndexedEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Envelope of a well-formed feature; `None` for empty geometries or
/// non-finite coordinates
fn feature_envelope(feature: &Feature) -> Option<AABB<[f64; 2]>> {
    if !feature
        .geometry
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
    {
        return None;
    }
    let rect = feature.geometry.bounding_rect()?;
    Some(AABB::from_corners(
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    ))
}

/// Select the features of `layer` intersecting `zone`.
///
/// Boundary contact counts as intersection. Malformed features (empty or
/// with non-finite coordinates) are excluded and logged; a degenerate zone
/// fails the whole selection.
pub fn select(layer: &Layer, zone: &ZoneOfInfluence) -> Result<SelectionResult> {
    let zone_polygon = zone.polygon();
    let zone_rect = zone_polygon
        .bounding_rect()
        .filter(|r| [r.min().x, r.min().y, r.max().x, r.max().y].iter().all(|v| v.is_finite()))
        .ok_or_else(|| {
            SiteError::Geometry("zone of influence has no finite extent".to_string())
        })?;

    let mut envelopes = Vec::with_capacity(layer.features.len());
    for (index, feature) in layer.features.iter().enumerate() {
        match feature_envelope(feature) {
            Some(envelope) => envelopes.push(IndexedEnvelope { index, envelope }),
            None => warn!(
                "Layer {}: feature {} has malformed geometry, excluded from selection",
                layer.name, index
            ),
        }
    }

    let tree = RTree::bulk_load(envelopes);
    let query = AABB::from_corners(
        [zone_rect.min().x, zone_rect.min().y],
        [zone_rect.max().x, zone_rect.max().y],
    );

    let candidates: Vec<usize> = tree
        .locate_in_envelope_intersecting(&query)
        .map(|e| e.index)
        .collect();
    debug!(
        "Layer {}: {} of {} features pass the bounding-box filter",
        layer.name,
        candidates.len(),
        layer.features.len()
    );

    let mut source_indices: Vec<usize> = candidates
        .into_iter()
        .filter(|&i| zone_polygon.intersects(&layer.features[i].geometry))
        .collect();
    source_indices.sort_unstable();

    let features = source_indices
        .iter()
        .map(|&i| layer.features[i].clone())
        .collect();

    info!(
        "Layer {}: {} features intersect the {} km zone",
        layer.name,
        source_indices.len(),
        zone.radius_km()
    );

    Ok(SelectionResult {
        layer_name: layer.name.clone(),
        crs: layer.crs.clone(),
        features,
        source_indices,
    })
}

/// Select from the SAC and SPA layers against the same zone
#[cfg(feature = "rayon")]
pub fn select_pair(
    sac: &Layer,
    spa: &Layer,
    zone: &ZoneOfInfluence,
) -> Result<(SelectionResult, SelectionResult)> {
    let (sac, spa) = rayon::join(|| select(sac, zone), || select(spa, zone));
    Ok((sac?, spa?))
}

/// Select from the SAC and SPA layers against the same zone
#[cfg(not(feature = "rayon"))]
pub fn select_pair(
    sac: &Layer,
    spa: &Layer,
    zone: &ZoneOfInfluence,
) -> Result<(SelectionResult, SelectionResult)> {
    Ok((select(sac, zone)?, select(spa, zone)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric::zone::{build_zone, SearchPoint};
    use geo::{polygon, MultiPolygon};
    use geojson::JsonObject;

    fn square(code: &str, x: f64, y: f64, size: f64) -> Feature {
        let mut attributes = JsonObject::new();
        attributes.insert("SITECODE".to_string(), code.into());
        Feature::new(
            polygon![
                (x: x, y: y),
                (x: x + size, y: y),
                (x: x + size, y: y + size),
                (x: x, y: y + size),
            ],
            attributes,
        )
    }

    fn codes(result: &SelectionResult) -> Vec<&str> {
        result
            .features
            .iter()
            .map(|f| f.attribute("SITECODE").and_then(|v| v.as_str()).unwrap_or(""))
            .collect()
    }

    fn zone() -> ZoneOfInfluence {
        build_zone(SearchPoint::new(0.0, 0.0), 1.0).unwrap()
    }

    #[test]
    fn test_inside_outside_and_order() {
        let layer = Layer::new(
            "sac",
            CrsId::Epsg(2157),
            vec![
                square("far", 30_000.0, 0.0, 500.0),
                square("inside", -100.0, -100.0, 200.0),
                square("overlap", 900.0, -50.0, 500.0),
                square("bbox-only", 800.0, 800.0, 100.0),
            ],
        );
        let result = select(&layer, &zone()).unwrap();
        assert_eq!(codes(&result), ["inside", "overlap"]);
        assert_eq!(result.source_indices, [1, 2]);
        assert_eq!(result.features[0], layer.features[1]);
    }

    #[test]
    fn test_touching_boundary_is_included() {
        // The zone has a vertex at (1000, 0)
        let layer = Layer::new(
            "spa",
            CrsId::Epsg(2157),
            vec![square("touch", 1000.0, -10.0, 20.0)],
        );
        let result = select(&layer, &zone()).unwrap();
        assert_eq!(codes(&result), ["touch"]);
    }

    #[test]
    fn test_site_containing_zone_is_included() {
        let layer = Layer::new(
            "spa",
            CrsId::Epsg(2157),
            vec![square("around", -50_000.0, -50_000.0, 100_000.0)],
        );
        assert_eq!(select(&layer, &zone()).unwrap().len(), 1);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let layer = Layer::new(
            "sac",
            CrsId::Epsg(2157),
            vec![
                square("a", -100.0, -100.0, 200.0),
                square("b", 5_000.0, 5_000.0, 200.0),
                square("c", 500.0, 500.0, 200.0),
            ],
        );
        let zone = zone();
        let first = select(&layer, &zone).unwrap();
        let second = select(&layer, &zone).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_feature_is_excluded() {
        let broken = Feature::new(
            polygon![
                (x: f64::NAN, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
            ],
            JsonObject::new(),
        );
        let empty = Feature::new(MultiPolygon::<f64>::new(vec![]), JsonObject::new());
        let layer = Layer::new(
            "sac",
            CrsId::Epsg(2157),
            vec![broken, empty, square("ok", 0.0, 0.0, 10.0)],
        );
        let result = select(&layer, &zone()).unwrap();
        assert_eq!(codes(&result), ["ok"]);
        assert_eq!(result.source_indices, [2]);
    }

    #[test]
    fn test_select_pair() {
        let sac = Layer::new("sac", CrsId::Epsg(2157), vec![square("s1", 0.0, 0.0, 10.0)]);
        let spa = Layer::new(
            "spa",
            CrsId::Epsg(2157),
            vec![square("p1", 40_000.0, 0.0, 10.0)],
        );
        let (sac_sel, spa_sel) = select_pair(&sac, &spa, &zone()).unwrap();
        assert_eq!(codes(&sac_sel), ["s1"]);
        assert!(spa_sel.is_empty());
        assert_eq!(spa_sel.layer_name, "spa");
    }
}
