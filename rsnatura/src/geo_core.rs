use std::fmt;

use geo::{MultiPolygon, Rect};
use serde::{Serialize, Serializer};

use crate::error::{Result, SiteError};

/// Canonical coordinate reference system identifier.
///
/// Layers often declare the same system with differently spelled codes
/// (`EPSG:2157`, `urn:ogc:def:crs:EPSG::2157`, a bare `2157`...). Parsing
/// normalizes every known spelling to `AUTHORITY:CODE` so equality means
/// "same system" rather than "same string".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrsId {
    /// EPSG registry code
    Epsg(u32),
    /// OGC CRS84 (lon/lat WGS84), the GeoJSON default. Kept apart from
    /// EPSG:4326 because the axis order differs.
    Crs84,
    /// Any identifier we cannot canonicalize, compared verbatim
    Other(String),
}

impl CrsId {
    /// Parse and canonicalize a CRS identifier
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        // Whitespace inside the identifier is ignored: `EPSG: 2157`
        let upper: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        if upper == "CRS84"
            || upper == "CRS:84"
            || upper.ends_with(":CRS84")
            || upper.ends_with("/CRS84")
        {
            return CrsId::Crs84;
        }
        if let Some(code) = epsg_code(&upper) {
            return CrsId::Epsg(code);
        }
        CrsId::Other(trimmed.to_string())
    }

    /// Build an identifier from a user-supplied EPSG integer code
    pub fn from_epsg(code: i64) -> Result<Self> {
        u32::try_from(code)
            .ok()
            .filter(|c| *c > 0)
            .map(CrsId::Epsg)
            .ok_or_else(|| SiteError::InvalidCrs(format!("EPSG code {} is not valid", code)))
    }

    /// Definition string understood by PROJ
    pub fn proj_definition(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CrsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsId::Epsg(code) => write!(f, "EPSG:{}", code),
            CrsId::Crs84 => write!(f, "OGC:CRS84"),
            CrsId::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for CrsId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn epsg_code(upper: &str) -> Option<u32> {
    let tail = if let Some(rest) = upper.strip_prefix("EPSG:") {
        rest
    } else if let Some(rest) = upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
        // urn:ogc:def:crs:EPSG:<version>:<code>, version may be empty
        rest.rsplit(':').next()?
    } else if upper.starts_with("HTTP://WWW.OPENGIS.NET/DEF/CRS/EPSG/")
        || upper.starts_with("HTTPS://WWW.OPENGIS.NET/DEF/CRS/EPSG/")
    {
        upper.rsplit('/').next()?
    } else {
        upper
    };

    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Converts geometries between coordinate systems.
///
/// The CRS reconciler only talks to this trait, so tests and builds without
/// PROJ can plug in their own implementation.
pub trait CoordinateTransformer {
    /// Fail with `InvalidCrs` if `crs` cannot be resolved
    fn resolve(&self, crs: &CrsId) -> Result<()>;

    /// Transform every geometry from `from` to `to`, preserving order
    fn transform_all(
        &self,
        from: &CrsId,
        to: &CrsId,
        geometries: &[MultiPolygon<f64>],
    ) -> Result<Vec<MultiPolygon<f64>>>;
}

/// PROJ-backed transformer
#[cfg(feature = "proj")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjTransformer;

#[cfg(feature = "proj")]
impl CoordinateTransformer for ProjTransformer {
    fn resolve(&self, crs: &CrsId) -> Result<()> {
        let definition = crs.proj_definition();
        proj::Proj::new_known_crs(&definition, &definition, None)
            .map(|_| ())
            .map_err(|e| SiteError::InvalidCrs(format!("{} cannot be resolved: {}", crs, e)))
    }

    fn transform_all(
        &self,
        from: &CrsId,
        to: &CrsId,
        geometries: &[MultiPolygon<f64>],
    ) -> Result<Vec<MultiPolygon<f64>>> {
        use geo::MapCoords;

        if from == to {
            return Ok(geometries.to_vec());
        }

        let proj = proj::Proj::new_known_crs(&from.proj_definition(), &to.proj_definition(), None)
            .map_err(|e| {
                SiteError::InvalidCrs(format!("no transformation from {} to {}: {}", from, to, e))
            })?;

        geometries
            .iter()
            .map(|geometry| {
                geometry
                    .try_map_coords(|c| {
                        proj.convert((c.x, c.y))
                            .map(|(x, y)| geo::Coord { x, y })
                    })
                    .map_err(|e| {
                        SiteError::Geometry(format!("failed to transform coordinates: {}", e))
                    })
            })
            .collect()
    }
}

/// Transformer used when the crate is built without PROJ.
///
/// Accepts only identity transformations.
#[cfg(not(feature = "proj"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityOnlyTransformer;

#[cfg(not(feature = "proj"))]
impl CoordinateTransformer for IdentityOnlyTransformer {
    fn resolve(&self, crs: &CrsId) -> Result<()> {
        match crs {
            CrsId::Other(raw) => Err(SiteError::InvalidCrs(format!("{} cannot be resolved", raw))),
            _ => Ok(()),
        }
    }

    fn transform_all(
        &self,
        from: &CrsId,
        to: &CrsId,
        geometries: &[MultiPolygon<f64>],
    ) -> Result<Vec<MultiPolygon<f64>>> {
        if from == to {
            return Ok(geometries.to_vec());
        }
        Err(SiteError::InvalidCrs(format!(
            "reprojection from {} to {} needs the `proj` feature",
            from, to
        )))
    }
}

#[cfg(feature = "proj")]
pub type DefaultTransformer = ProjTransformer;

#[cfg(not(feature = "proj"))]
pub type DefaultTransformer = IdentityOnlyTransformer;

/// Axis-aligned extent in the active CRS
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a box from its corner coordinates
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Convert a geo `Rect`
    pub fn from_rect(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    /// Grow the box by `margin` on every side
    pub fn expand(&self, margin: f64) -> Self {
        BoundingBox::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    /// Extent along x
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along y
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_crs_canonical_spellings() {
        let expected = CrsId::Epsg(2157);
        for raw in [
            "EPSG:2157",
            "epsg:2157",
            " 2157 ",
            "EPSG:02157",
            "urn:ogc:def:crs:EPSG::2157",
            "urn:ogc:def:crs:EPSG:9.8:2157",
            "http://www.opengis.net/def/crs/EPSG/0/2157",
        ] {
            assert_eq!(CrsId::parse(raw), expected, "{}", raw);
        }
        assert_eq!(expected.to_string(), "EPSG:2157");
    }

    #[test]
    fn test_crs84_is_not_epsg_4326() {
        assert_eq!(CrsId::parse("urn:ogc:def:crs:OGC:1.3:CRS84"), CrsId::Crs84);
        assert_ne!(CrsId::parse("OGC:CRS84"), CrsId::parse("EPSG:4326"));
    }

    #[test]
    fn test_crs84_aliases_and_inner_whitespace() {
        for raw in ["CRS:84", "crs:84", "OGC:CRS84", "CRS84"] {
            assert_eq!(CrsId::parse(raw), CrsId::Crs84, "{}", raw);
        }
        assert_eq!(CrsId::parse("EPSG: 2157"), CrsId::Epsg(2157));
        assert_eq!(CrsId::parse("urn:ogc:def:crs:EPSG:: 2157"), CrsId::Epsg(2157));
    }

    #[test]
    fn test_crs_other_kept_verbatim() {
        let crs = CrsId::parse("ESRI:102100");
        assert_eq!(crs, CrsId::Other("ESRI:102100".to_string()));
        assert_ne!(crs, CrsId::parse("EPSG:102100"));
    }

    #[test]
    fn test_from_epsg_rejects_non_positive() {
        assert!(matches!(CrsId::from_epsg(0), Err(SiteError::InvalidCrs(_))));
        assert!(matches!(CrsId::from_epsg(-4326), Err(SiteError::InvalidCrs(_))));
        assert_eq!(CrsId::from_epsg(2157).unwrap(), CrsId::Epsg(2157));
    }

    #[test]
    fn test_bounding_box_expand() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).expand(500.0);
        assert_eq!(bbox.min_x, -500.0);
        assert_eq!(bbox.max_y, 501.0);
        assert_eq!(bbox.width(), 1001.0);
    }

    #[test]
    fn test_default_transformer_identity() {
        let square: MultiPolygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]
        .into();
        let crs = CrsId::Epsg(2157);
        let out = DefaultTransformer::default()
            .transform_all(&crs, &crs, &[square.clone()])
            .unwrap();
        assert_eq!(out, vec![square]);
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_proj_transform_itm_to_wgs84() {
        // Needs PROJ data; only check the result when the pipeline could be built
        let square: MultiPolygon<f64> = polygon![
            (x: 533835.919, y: 680764.228),
            (x: 534835.919, y: 680764.228),
            (x: 534835.919, y: 681764.228),
        ]
        .into();
        let result = ProjTransformer.transform_all(
            &CrsId::Epsg(2157),
            &CrsId::Epsg(4326),
            &[square],
        );
        if let Ok(out) = result {
            use geo::CoordsIter;
            for c in out[0].coords_iter() {
                assert!(c.x.is_finite());
                assert!(c.y.is_finite());
            }
        }
    }
}
