//! Scale bar whose length and ticks follow the search radius.
//!
//! The bar does not scale continuously with the radius. One of three
//! regimes is picked so it never dwarfs or vanishes against the zone:
//!
//! | radius (km)   | total  | split       | labels                |
//! |---------------|--------|-------------|-----------------------|
//! | >= 10         | 20 km  | 10 + 10     | 0 km, 10 km, 20 km    |
//! | >= 5 and < 10 | 10 km  | 5 + 5       | 0 km, 5 km, 10 km     |
//! | < 5           | 5 km   | 2.5 + 2.5   | 0 km, 2.5 km, 5 km    |

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};
use crate::geo_core::BoundingBox;
use crate::geometric::symbology::Color;

/// Size regime of the scale bar, chosen from the radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleRegime {
    /// radius >= 10 km
    Large,
    /// 5 km <= radius < 10 km
    Medium,
    /// radius < 5 km
    Small,
}

/// Layout parameters of one regime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeParams {
    /// Radius at or above which the regime applies
    pub min_radius_km: f64,
    pub total_km: f64,
    /// Length of each of the two segments
    pub segment_km: f64,
    /// Labels sit `total / label_offset_divisor` below the bar
    pub label_offset_divisor: f64,
    /// Margin added around the zone for the map extent
    pub extent_margin_m: f64,
}

const REGIMES: [(ScaleRegime, RegimeParams); 3] = [
    (
        ScaleRegime::Large,
        RegimeParams {
            min_radius_km: 10.0,
            total_km: 20.0,
            segment_km: 10.0,
            label_offset_divisor: 20.0,
            extent_margin_m: 5000.0,
        },
    ),
    (
        ScaleRegime::Medium,
        RegimeParams {
            min_radius_km: 5.0,
            total_km: 10.0,
            segment_km: 5.0,
            label_offset_divisor: 20.0,
            extent_margin_m: 1000.0,
        },
    ),
    (
        ScaleRegime::Small,
        RegimeParams {
            min_radius_km: 0.0,
            total_km: 5.0,
            segment_km: 2.5,
            label_offset_divisor: 20.0,
            extent_margin_m: 500.0,
        },
    ),
];

impl ScaleRegime {
    /// Regime for a radius; lower bounds are inclusive
    pub fn for_radius(radius_km: f64) -> Self {
        REGIMES
            .iter()
            .find(|(_, params)| radius_km >= params.min_radius_km)
            .map(|(regime, _)| *regime)
            .unwrap_or(ScaleRegime::Small)
    }

    /// Layout parameters of this regime
    pub fn params(&self) -> RegimeParams {
        REGIMES
            .iter()
            .find(|(regime, _)| regime == self)
            .map(|(_, params)| *params)
            .unwrap_or(REGIMES[REGIMES.len() - 1].1)
    }

    pub fn extent_margin_m(&self) -> f64 {
        self.params().extent_margin_m
    }
}

/// Position of the bar's right end, as fractions of the map extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorFraction {
    pub x: f64,
    pub y: f64,
}

impl Default for AnchorFraction {
    fn default() -> Self {
        AnchorFraction { x: 0.92, y: 0.05 }
    }
}

/// One filled stretch of the bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
    pub color: Color,
}

/// Tick label under the bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickLabel {
    pub position: Coord<f64>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleBarSpec {
    pub regime: ScaleRegime,
    /// Right segment first (dark), then left segment (light)
    pub segments: Vec<BarSegment>,
    /// Left to right: 0, split, total
    pub labels: Vec<TickLabel>,
}

/// Lay out the scale bar for `radius_km` inside `extent`
pub fn compute_scale_bar(
    radius_km: f64,
    extent: &BoundingBox,
    anchor: AnchorFraction,
) -> Result<ScaleBarSpec> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(SiteError::InvalidRadius(radius_km));
    }

    let regime = ScaleRegime::for_radius(radius_km);
    let params = regime.params();

    let anchor = Coord {
        x: extent.min_x + extent.width() * anchor.x,
        y: extent.min_y + extent.height() * anchor.y,
    };
    let segment_m = params.segment_km * 1000.0;
    let total_m = params.total_km * 1000.0;
    let at = |offset_m: f64| Coord {
        x: anchor.x - offset_m,
        y: anchor.y,
    };

    let segments = vec![
        BarSegment {
            start: anchor,
            end: at(segment_m),
            color: Color::black(),
        },
        BarSegment {
            start: at(segment_m),
            end: at(total_m),
            color: Color::white(),
        },
    ];

    let label_y = anchor.y - total_m / params.label_offset_divisor;
    let labels = [total_m, total_m - segment_m, 0.0]
        .into_iter()
        .map(|offset_m| TickLabel {
            position: Coord {
                x: anchor.x - offset_m,
                y: label_y,
            },
            text: format!("{} km", (total_m - offset_m) / 1000.0),
        })
        .collect();

    Ok(ScaleBarSpec {
        regime,
        segments,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn extent() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 100_000.0, 100_000.0)
    }

    fn label_texts(spec: &ScaleBarSpec) -> Vec<&str> {
        spec.labels.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_regime_selection() {
        for r in [10.0, 10.5, 15.0, 250.0] {
            assert_eq!(ScaleRegime::for_radius(r), ScaleRegime::Large, "{}", r);
        }
        for r in [5.0, 5.01, 7.5, 9.999] {
            assert_eq!(ScaleRegime::for_radius(r), ScaleRegime::Medium, "{}", r);
        }
        for r in [0.1, 2.5, 4.999] {
            assert_eq!(ScaleRegime::for_radius(r), ScaleRegime::Small, "{}", r);
        }
    }

    #[test]
    fn test_labels_per_regime() {
        let spec = compute_scale_bar(15.0, &extent(), AnchorFraction::default()).unwrap();
        assert_eq!(label_texts(&spec), ["0 km", "10 km", "20 km"]);

        let spec = compute_scale_bar(10.0, &extent(), AnchorFraction::default()).unwrap();
        assert_eq!(label_texts(&spec), ["0 km", "10 km", "20 km"]);

        let spec = compute_scale_bar(5.0, &extent(), AnchorFraction::default()).unwrap();
        assert_eq!(label_texts(&spec), ["0 km", "5 km", "10 km"]);

        let spec = compute_scale_bar(3.0, &extent(), AnchorFraction::default()).unwrap();
        assert_eq!(label_texts(&spec), ["0 km", "2.5 km", "5 km"]);
    }

    #[test]
    fn test_segment_geometry() {
        let spec = compute_scale_bar(7.0, &extent(), AnchorFraction::default()).unwrap();
        assert_eq!(spec.regime, ScaleRegime::Medium);

        let right = &spec.segments[0];
        let left = &spec.segments[1];
        assert_relative_eq!(right.start.x, 92_000.0);
        assert_relative_eq!(right.start.y, 5_000.0);
        assert_relative_eq!(right.end.x, 87_000.0);
        assert_eq!(left.start, right.end);
        assert_relative_eq!(left.end.x, 82_000.0);
        assert_eq!(right.color, Color::black());
        assert_eq!(left.color, Color::white());
    }

    #[test]
    fn test_label_positions() {
        let spec = compute_scale_bar(20.0, &extent(), AnchorFraction::default()).unwrap();
        for (label, x) in spec.labels.iter().zip([72_000.0, 82_000.0, 92_000.0]) {
            assert_relative_eq!(label.position.x, x);
        }
        for label in &spec.labels {
            // 1/20 of the 20 km bar below the bar
            assert_relative_eq!(label.position.y, 5_000.0 - 1_000.0);
        }
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let err = compute_scale_bar(0.0, &extent(), AnchorFraction::default()).unwrap_err();
        assert!(matches!(err, SiteError::InvalidRadius(_)));
    }
}
