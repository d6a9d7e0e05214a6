//! Tests for style JSON parsing and rule evaluation.

use geo_types::{line_string, point, polygon, Geometry};
use map_common::{
    default_style_for, Color, Feature, Filter, GeometryKind, MapError, MarkerShape,
    MemoryFeatureSource, SrsId, StyleConfig, StyleDefinition,
};

fn square() -> Geometry<f64> {
    polygon![
        (x: 0.0, y: 0.0),
        (x: 1.0, y: 0.0),
        (x: 1.0, y: 1.0),
        (x: 0.0, y: 1.0),
    ]
    .into()
}

// ============================================================================
// JSON parsing
// ============================================================================

#[test]
fn test_parse_land_use_style() {
    let json = r##"{
        "name": "Land use",
        "fill_color": "#cccccc",
        "stroke_color": [40, 40, 40],
        "rules": [
            {"name": "water", "filter": {"op": "eq", "attribute": "class", "value": "water"},
             "symbol": {"fill": "#0000FF"}},
            {"name": "dense", "filter": {"op": "range", "attribute": "density", "min": 100},
             "symbol": {"fill": {"r": 200, "g": 0, "b": 0, "a": 128},
                        "stroke": {"color": "black", "width": 2.5}}},
            {"name": "towns", "filter": {"op": "geometry", "kind": "point"},
             "symbol": {"marker": {"shape": "square", "size": 8},
                        "label": {"attribute": "name", "size": 12}}}
        ]
    }"##;

    let style = StyleDefinition::from_json(json).unwrap();
    assert_eq!(style.name, "Land use");
    assert_eq!(style.rules.len(), 3);

    let water = Feature::new(square()).with_attribute("class", "water");
    assert_eq!(style.resolve_symbol(&water).fill.as_ref().unwrap().to_rgba(), (0, 0, 255, 255));

    let dense = Feature::new(square()).with_attribute("density", 250.0);
    let symbol = style.resolve_symbol(&dense);
    assert_eq!(symbol.fill.as_ref().unwrap().to_rgba(), (200, 0, 0, 128));
    assert_eq!(symbol.stroke.as_ref().unwrap().width, 2.5);

    let town = Feature::new(point!(x: 1.0, y: 1.0)).with_attribute("name", "Springfield");
    let symbol = style.resolve_symbol(&town);
    let marker = symbol.marker.as_ref().unwrap();
    assert_eq!(marker.shape, MarkerShape::Square);
    assert_eq!(marker.size, 8.0);
    let label = symbol.label.as_ref().unwrap();
    assert_eq!(label.font, "default");
    assert_eq!(label.color.to_rgba(), (0, 0, 0, 255));

    // Nothing matches: default fill and outline
    let sparse = Feature::new(square()).with_attribute("density", 3i64);
    let symbol = style.resolve_symbol(&sparse);
    assert_eq!(symbol.fill.as_ref().unwrap().to_rgba(), (204, 204, 204, 255));
    assert_eq!(symbol.stroke.as_ref().unwrap().color.to_rgba(), (40, 40, 40, 255));
}

#[test]
fn test_json_round_trip_preserves_rules() {
    let style = StyleDefinition::default_for(Some(GeometryKind::Line), (10, 20, 30));
    let json = style.to_json().unwrap();
    assert_eq!(StyleDefinition::from_json(&json).unwrap(), style);
}

#[test]
fn test_parse_rejects_empty_style() {
    let err = StyleDefinition::from_json(r#"{"name": "nothing"}"#).unwrap_err();
    assert!(matches!(err, MapError::InvalidStyle(_)));
}

#[test]
fn test_parse_rejects_bad_color() {
    let json = r##"{"rules": [{"symbol": {"fill": "#12345"}}]}"##;
    assert!(matches!(
        StyleDefinition::from_json(json),
        Err(MapError::InvalidStyle(_))
    ));
}

#[test]
fn test_parse_rejects_non_positive_stroke() {
    let json = r##"{"rules": [{"symbol": {"stroke": {"color": "red", "width": 0}}}]}"##;
    assert!(StyleDefinition::from_json(json).is_err());
}

#[test]
fn test_malformed_json_is_invalid_style() {
    assert!(matches!(
        StyleDefinition::from_json("{"),
        Err(MapError::InvalidStyle(_))
    ));
}

#[test]
fn test_style_and_features_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let style_path = dir.path().join("roads.json");
    let style = StyleDefinition::default_for(Some(GeometryKind::Line), (90, 90, 90));
    std::fs::write(&style_path, style.to_json().unwrap()).unwrap();
    assert_eq!(StyleDefinition::from_file(&style_path).unwrap(), style);

    let data_path = dir.path().join("roads.geojson");
    std::fs::write(
        &data_path,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"kind": "road"},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
        ]}"#,
    )
    .unwrap();
    let source = MemoryFeatureSource::from_geojson_file(&data_path, None).unwrap();
    assert_eq!(source.len(), 1);
    assert_eq!(default_style_for(&source, (90, 90, 90)), style);

    let missing = dir.path().join("missing.json");
    assert!(matches!(StyleDefinition::from_file(&missing), Err(MapError::Io(_))));
}

#[test]
fn test_unreadable_dataset_is_retryable_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MemoryFeatureSource::from_geojson_file(dir.path().join("gone.geojson"), None)
        .unwrap_err();

    assert!(matches!(err, MapError::FeatureSource(_)), "{:?}", err);
    assert!(err.is_retryable());
    match err {
        MapError::FeatureSource(inner) => {
            let io = inner.downcast_ref::<std::io::Error>().unwrap();
            assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_style_config_with_named_styles() {
    let json = r##"{"styles": {
        "red": {"fill_color": "red"},
        "blue": {"rules": [{"symbol": {"fill": "blue"}}]}
    }}"##;

    let config = StyleConfig::from_json(json).unwrap();
    assert_eq!(config.version, "1.0");
    assert!(config.get("red").is_some());
    assert!(config.get("blue").is_some());
    assert!(config.get("green").is_none());
}

#[test]
fn test_style_config_reports_bad_style_name() {
    let json = r##"{"styles": {"broken": {"name": "x"}}}"##;
    let err = StyleConfig::from_json(json).unwrap_err();
    assert!(err.to_string().contains("broken"));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_filters_on_missing_attribute_do_not_match() {
    let feature = Feature::new(square());
    assert!(!Filter::eq("kind", "x").matches(&feature));
    assert!(!Filter::range("kind", None, None).matches(&feature));
    assert!(!Filter::Ne {
        attribute: "kind".into(),
        value: "x".into()
    }
    .matches(&feature));
}

#[test]
fn test_compound_filters() {
    let feature = Feature::new(line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 2.0)])
        .with_attribute("kind", "river")
        .with_attribute("order", 3i64);

    let is_line = Filter::Geometry { kind: GeometryKind::Line };
    let big = Filter::range("order", Some(3.0), Some(5.0));
    let in_kinds = Filter::In {
        attribute: "kind".into(),
        values: vec!["canal".into(), "river".into()],
    };

    assert!(Filter::AllOf { filters: vec![is_line.clone(), big.clone(), in_kinds] }.matches(&feature));
    assert!(Filter::AnyOf { filters: vec![Filter::eq("kind", "road"), big] }.matches(&feature));
    assert!(!Filter::Not { filter: Box::new(is_line) }.matches(&feature));
    assert!(!Filter::range("order", None, Some(3.0)).matches(&feature));
}

// ============================================================================
// Default style
// ============================================================================

#[test]
fn test_default_style_per_geometry_kind() {
    let points = MemoryFeatureSource::with_features(
        SrsId::wgs84(),
        vec![Feature::new(point!(x: 0.0, y: 0.0))],
    );
    let style = default_style_for(&points, (1, 2, 3));
    let symbol = &style.rules[0].symbol;
    assert_eq!(symbol.marker.as_ref().unwrap().color, Some(Color::rgb(1, 2, 3)));
    assert!(symbol.fill.is_none());

    let lines = MemoryFeatureSource::with_features(
        SrsId::wgs84(),
        vec![Feature::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)])],
    );
    let style = default_style_for(&lines, (1, 2, 3));
    assert_eq!(style.rules[0].symbol.stroke.as_ref().unwrap().color, Color::rgb(1, 2, 3));

    let empty = MemoryFeatureSource::new(SrsId::wgs84());
    let style = default_style_for(&empty, (200, 0, 0));
    assert_eq!(style.rules[0].symbol.fill, Some(Color::rgb(200, 0, 0)));
}
