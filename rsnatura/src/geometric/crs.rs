use tracing::{debug, info};

use crate::error::{Result, SiteError};
use crate::geo_core::{CoordinateTransformer, CrsId};
use crate::layer::{Feature, Layer, SiteLayers};

/// Outcome of comparing the input layers' coordinate systems
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrsCheck {
    /// Every layer is in this system
    Consistent(CrsId),
    /// Systems of boundary, SAC and SPA layers, at least two differ
    Mismatch([CrsId; 3]),
}

/// Compare the three layers by canonical CRS identity
pub fn check_consistency(layers: &SiteLayers) -> CrsCheck {
    let [boundary, sac, spa] = layers.as_array();
    if boundary.crs == sac.crs && sac.crs == spa.crs {
        CrsCheck::Consistent(boundary.crs.clone())
    } else {
        CrsCheck::Mismatch([boundary.crs.clone(), sac.crs.clone(), spa.crs.clone()])
    }
}

/// Layers guaranteed to share one coordinate system
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledLayers {
    pub active_crs: CrsId,
    pub layers: SiteLayers,
    /// Whether any reprojection took place
    pub reprojected: bool,
}

/// Bring all layers into one CRS.
///
/// Consistent layers pass through untouched. On a mismatch `target_epsg` is
/// required; every layer is then reprojected to it, producing new layers.
pub fn reconcile<T: CoordinateTransformer + ?Sized>(
    layers: SiteLayers,
    target_epsg: Option<i64>,
    transformer: &T,
) -> Result<ReconciledLayers> {
    match check_consistency(&layers) {
        CrsCheck::Consistent(crs) => {
            info!("All layers are in {}", crs);
            Ok(ReconciledLayers {
                active_crs: crs,
                layers,
                reprojected: false,
            })
        }
        CrsCheck::Mismatch([boundary, sac, spa]) => {
            info!(
                "Inconsistent layer CRS (boundary {}, SAC {}, SPA {}), reprojecting",
                boundary, sac, spa
            );
            let code = target_epsg.ok_or_else(|| {
                SiteError::InvalidCrs(
                    "layers use different coordinate systems and no target EPSG code was given"
                        .to_string(),
                )
            })?;
            let target = CrsId::from_epsg(code)?;
            transformer.resolve(&target)?;

            let layers = SiteLayers::new(
                reproject_layer(&layers.boundary, &target, transformer)?,
                reproject_layer(&layers.sac, &target, transformer)?,
                reproject_layer(&layers.spa, &target, transformer)?,
            );
            info!("Layers reprojected to {}", target);

            Ok(ReconciledLayers {
                active_crs: target,
                layers,
                reprojected: true,
            })
        }
    }
}

/// Return a copy of `layer` expressed in `target`.
///
/// A layer already in `target` is cloned as is.
pub fn reproject_layer<T: CoordinateTransformer + ?Sized>(
    layer: &Layer,
    target: &CrsId,
    transformer: &T,
) -> Result<Layer> {
    if &layer.crs == target {
        debug!("Layer {} already in {}", layer.name, target);
        return Ok(layer.clone());
    }

    let geometries: Vec<_> = layer.features.iter().map(|f| f.geometry.clone()).collect();
    let transformed = transformer.transform_all(&layer.crs, target, &geometries)?;
    if transformed.len() != layer.features.len() {
        return Err(SiteError::Geometry(format!(
            "transformation of layer {} returned {} geometries for {} features",
            layer.name,
            transformed.len(),
            layer.features.len()
        )));
    }

    let features = layer
        .features
        .iter()
        .zip(transformed)
        .map(|(feature, geometry)| Feature {
            geometry,
            attributes: feature.attributes.clone(),
        })
        .collect();

    debug!("Layer {} reprojected {} -> {}", layer.name, layer.crs, target);
    Ok(Layer::new(layer.name.clone(), target.clone(), features))
}
