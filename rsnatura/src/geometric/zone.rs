use geo::{BoundingRect, Coord, Polygon};
#[cfg(feature = "geos")]
use geo::{Geometry, Point};
#[cfg(not(feature = "geos"))]
use geo::LineString;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SiteError};
use crate::geo_core::BoundingBox;
use crate::geometric::scale_bar::ScaleRegime;

/// Vertices per quarter circle used to approximate the buffer.
///
/// Fixed: 200 vertices for the full circle, not caller-configurable.
pub const QUADRANT_SEGMENTS: usize = 50;

/// Search location in the active CRS (metres)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchPoint {
    pub x: f64,
    pub y: f64,
}

impl SearchPoint {
    /// Point from its coordinates in the active CRS
    pub fn new(x: f64, y: f64) -> Self {
        SearchPoint { x, y }
    }
}

impl From<SearchPoint> for Coord<f64> {
    fn from(point: SearchPoint) -> Self {
        Coord {
            x: point.x,
            y: point.y,
        }
    }
}

/// Circular buffer around the search point
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOfInfluence {
    center: SearchPoint,
    radius_km: f64,
    polygon: Polygon<f64>,
}

impl ZoneOfInfluence {
    /// Search point the zone is centered on
    pub fn center(&self) -> SearchPoint {
        self.center
    }

    /// Buffer radius in kilometres
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Buffer radius in CRS units (metres)
    pub fn radius_m(&self) -> f64 {
        self.radius_km * 1000.0
    }

    /// Buffer polygon
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Bounds of the buffer polygon
    pub fn bounding_box(&self) -> BoundingBox {
        let r = self.radius_m();
        match self.polygon.bounding_rect() {
            Some(rect) => BoundingBox::from_rect(rect),
            None => BoundingBox::new(
                self.center.x - r,
                self.center.y - r,
                self.center.x + r,
                self.center.y + r,
            ),
        }
    }

    /// Map extent: zone bounds plus a margin that grows with the radius regime
    pub fn map_extent(&self) -> BoundingBox {
        let margin = ScaleRegime::for_radius(self.radius_km).extent_margin_m();
        self.bounding_box().expand(margin)
    }
}

/// Buffer `point` by `radius_km` kilometres
pub fn build_zone(point: SearchPoint, radius_km: f64) -> Result<ZoneOfInfluence> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(SiteError::InvalidRadius(radius_km));
    }
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(SiteError::Geometry(format!(
            "search point ({}, {}) is not a finite coordinate",
            point.x, point.y
        )));
    }

    let radius_m = radius_km * 1000.0;
    let polygon = buffer_point(point, radius_m)?;
    debug!(
        "Zone of influence: {} km around ({}, {}), {} vertices",
        radius_km,
        point.x,
        point.y,
        polygon.exterior().0.len().saturating_sub(1)
    );

    Ok(ZoneOfInfluence {
        center: point,
        radius_km,
        polygon,
    })
}

/// GEOS point buffer with `QUADRANT_SEGMENTS` segments per quarter circle
#[cfg(feature = "geos")]
fn buffer_point(point: SearchPoint, radius_m: f64) -> Result<Polygon<f64>> {
    use geos::{Geom, Geometry as GeosGeometry};

    let center: GeosGeometry = Point::new(point.x, point.y)
        .try_into()
        .map_err(|e| SiteError::Geometry(format!("failed to convert search point to GEOS: {}", e)))?;
    let buffered = center
        .buffer(radius_m, QUADRANT_SEGMENTS as i32)
        .map_err(|e| SiteError::Geometry(format!("failed to buffer search point: {}", e)))?;
    let geometry: Geometry<f64> = buffered
        .try_into()
        .map_err(|e| SiteError::Geometry(format!("failed to convert GEOS buffer: {}", e)))?;

    match geometry {
        Geometry::Polygon(polygon) => Ok(polygon),
        other => Err(SiteError::Geometry(format!(
            "point buffer is not a polygon: {:?}",
            other
        ))),
    }
}

/// Same ring as the GEOS buffer, computed directly
#[cfg(not(feature = "geos"))]
fn buffer_point(point: SearchPoint, radius_m: f64) -> Result<Polygon<f64>> {
    use std::f64::consts::PI;

    let vertex_count = QUADRANT_SEGMENTS * 4;
    let ring: Vec<Coord<f64>> = (0..vertex_count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / vertex_count as f64;
            Coord {
                x: point.x + radius_m * angle.cos(),
                y: point.y + radius_m * angle.sin(),
            }
        })
        .collect();

    // Polygon::new closes the ring
    Ok(Polygon::new(LineString::from(ring), vec![]))
}
