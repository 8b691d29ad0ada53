use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

/// Color in matplotlib notation: single-letter codes (`"g"`, `"k"`), names or
/// hex strings. Passed through untouched to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(code: impl Into<String>) -> Self {
        Color(code.into())
    }

    /// Dark fill of the scale bar
    pub fn black() -> Self {
        Color::new("k")
    }

    /// Light fill of the scale bar
    pub fn white() -> Self {
        Color::new("w")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(code: &str) -> Self {
        Color::new(code)
    }
}

/// Glyph drawn in a legend entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Filled unit rectangle
    Patch,
    /// Circle marker
    Marker,
}

/// One legend entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolHandle {
    pub label: String,
    pub kind: SymbolKind,
    pub face_color: Color,
    pub edge_color: Color,
    pub alpha: f64,
}

/// One rectangle handle per label, cycling through `colors`
pub fn generate_handles(
    labels: &[&str],
    colors: &[Color],
    edge: Option<Color>,
    alpha: Option<f64>,
) -> Result<Vec<SymbolHandle>> {
    if colors.is_empty() {
        return Err(SiteError::InvalidSymbology(
            "at least one color is required".to_string(),
        ));
    }
    let edge = edge.unwrap_or_else(Color::black);
    let alpha = alpha.unwrap_or(1.0);

    Ok(labels
        .iter()
        .enumerate()
        .map(|(i, label)| SymbolHandle {
            label: label.to_string(),
            kind: SymbolKind::Patch,
            face_color: colors[i % colors.len()].clone(),
            edge_color: edge.clone(),
            alpha,
        })
        .collect())
}

/// Semantic categories drawn on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Boundary,
    Sac,
    Spa,
    SearchPoint,
    Zone,
}

impl Category {
    /// Text shown in the legend and the map document
    pub fn label(&self) -> &'static str {
        match self {
            Category::Boundary => "County boundary",
            Category::Sac => "SAC",
            Category::Spa => "SPA",
            Category::SearchPoint => "Search Point",
            Category::Zone => "Zone of influence",
        }
    }
}

/// How a category is drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub edge_color: Color,
    /// `None` draws no fill
    pub face_color: Option<Color>,
    pub line_width: f64,
    pub alpha: f64,
    /// Marker size in points, only for point categories
    pub marker_size: Option<f64>,
}

/// Fixed style table
pub fn style_for(category: Category) -> Style {
    match category {
        Category::Boundary => Style {
            edge_color: Color::black(),
            face_color: Some(Color::white()),
            line_width: 1.0,
            alpha: 1.0,
            marker_size: None,
        },
        Category::Sac => Style {
            edge_color: Color::new("g"),
            face_color: Some(Color::new("g")),
            line_width: 1.0,
            alpha: 0.5,
            marker_size: None,
        },
        Category::Spa => Style {
            edge_color: Color::new("b"),
            face_color: Some(Color::new("b")),
            line_width: 1.0,
            alpha: 0.5,
            marker_size: None,
        },
        Category::SearchPoint => Style {
            edge_color: Color::new("r"),
            face_color: Some(Color::new("r")),
            line_width: 1.0,
            alpha: 1.0,
            marker_size: Some(6.0),
        },
        Category::Zone => Style {
            edge_color: Color::new("r"),
            face_color: None,
            line_width: 1.5,
            alpha: 1.0,
            marker_size: None,
        },
    }
}

pub const LEGEND_TITLE: &str = "Legend";

/// Legend of the map: SAC and SPA patches followed by the search point marker
pub fn default_legend() -> Result<Vec<SymbolHandle>> {
    let mut handles = generate_handles(
        &[Category::Sac.label()],
        &[style_for(Category::Sac).edge_color],
        None,
        None,
    )?;
    handles.extend(generate_handles(
        &[Category::Spa.label()],
        &[style_for(Category::Spa).edge_color],
        None,
        None,
    )?);

    let point = style_for(Category::SearchPoint);
    handles.push(SymbolHandle {
        label: Category::SearchPoint.label().to_string(),
        kind: SymbolKind::Marker,
        face_color: point.edge_color.clone(),
        edge_color: point.edge_color,
        alpha: point.alpha,
    });
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_cycle() {
        let colors = [Color::new("g"), Color::new("b")];
        let handles = generate_handles(&["A", "B", "C"], &colors, None, None).unwrap();

        let faces: Vec<&str> = handles.iter().map(|h| h.face_color.as_str()).collect();
        assert_eq!(faces, ["g", "b", "g"]);
        assert!(handles.iter().all(|h| h.edge_color == Color::black()));
        assert!(handles.iter().all(|h| h.alpha == 1.0));
    }

    #[test]
    fn test_edge_and_alpha_override() {
        let handles =
            generate_handles(&["A"], &[Color::new("g")], Some(Color::new("r")), Some(0.5)).unwrap();
        assert_eq!(handles[0].edge_color, Color::new("r"));
        assert_eq!(handles[0].alpha, 0.5);
    }

    #[test]
    fn test_empty_colors_rejected() {
        let err = generate_handles(&["A"], &[], None, None).unwrap_err();
        assert!(matches!(err, SiteError::InvalidSymbology(_)));
    }

    #[test]
    fn test_no_labels_no_handles() {
        let handles = generate_handles(&[], &[Color::new("g")], None, None).unwrap();
        assert!(handles.is_empty());
    }

    #[test]
    fn test_default_legend() {
        let legend = default_legend().unwrap();
        let labels: Vec<&str> = legend.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["SAC", "SPA", "Search Point"]);
        assert_eq!(legend[0].face_color, Color::new("g"));
        assert_eq!(legend[1].face_color, Color::new("b"));
        assert_eq!(legend[2].kind, SymbolKind::Marker);
    }
}
