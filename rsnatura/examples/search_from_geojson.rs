// Example: search SAC/SPA sites around a point from in-memory GeoJSON
use anyhow::Result;
use rsnatura::collect::layer_reader::layer_from_geojson_str;
use rsnatura::geometric::zone::SearchPoint;
use rsnatura::{run_search, DefaultTransformer, SearchRequest, SiteLayers};

const BOUNDARY: &str = r#"
{
    "type": "FeatureCollection",
    "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::2157" } },
    "features": [
        {
            "type": "Feature",
            "properties": { "COUNTY": "Westmeath" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [500000, 650000], [570000, 650000], [570000, 710000],
                    [500000, 710000], [500000, 650000]
                ]]
            }
        }
    ]
}"#;

const SAC: &str = r#"
{
    "type": "FeatureCollection",
    "crs": { "type": "name", "properties": { "name": "EPSG:2157" } },
    "features": [
        {
            "type": "Feature",
            "properties": { "SITECODE": "000688", "SITE_NAME": "Lough Owel SAC", "COUNTY": "Westmeath" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [533000, 680000], [535000, 680000], [535000, 682000],
                    [533000, 682000], [533000, 680000]
                ]]
            }
        },
        {
            "type": "Feature",
            "properties": { "SITECODE": "000692", "SITE_NAME": "Distant Bog SAC", "COUNTY": "Longford" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [563000, 680000], [565000, 680000], [565000, 682000],
                    [563000, 682000], [563000, 680000]
                ]]
            }
        }
    ]
}"#;

const SPA: &str = r#"
{
    "type": "FeatureCollection",
    "crs": { "type": "name", "properties": { "name": "2157" } },
    "features": []
}"#;

fn main() -> Result<()> {
    println!("=== Example: Natura 2000 search from GeoJSON ===\n");

    let layers = SiteLayers::new(
        layer_from_geojson_str("Boundary", BOUNDARY, None)?,
        layer_from_geojson_str("SAC", SAC, None)?,
        layer_from_geojson_str("SPA", SPA, None)?,
    );

    let request = SearchRequest::new(SearchPoint::new(533835.919, 680764.228), 15.0);
    let outcome = run_search(layers, &request, &DefaultTransformer::default())?;

    println!("Active CRS: {}", outcome.active_crs);
    println!("SAC sites within {} km: {}", request.radius_km, outcome.sac.len());
    for feature in &outcome.sac.features {
        println!("  {:?}", feature.attribute("SITE_NAME"));
    }
    println!("SPA sites within {} km: {}", request.radius_km, outcome.spa.len());

    println!("\nScale bar ({:?}):", outcome.scale_bar.regime);
    for label in &outcome.scale_bar.labels {
        println!(
            "  {} at ({:.1}, {:.1})",
            label.text, label.position.x, label.position.y
        );
    }

    Ok(())
}
