//! Tests for Extent parsing, validation and set operations.

use map_common::extent::{Extent, ExtentParseError};
use map_common::MapError;

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_integer_extent() {
    let extent: Extent = "-5,-5,5,5".parse().unwrap();
    assert_eq!(extent, Extent::new(-5.0, -5.0, 5.0, 5.0));
}

#[test]
fn test_parse_web_mercator_extent() {
    let extent =
        Extent::from_bbox_string("-20037508.34,-20037508.34,20037508.34,20037508.34").unwrap();
    assert!((extent.min_x - (-20037508.34)).abs() < 0.01);
    assert!((extent.max_y - 20037508.34).abs() < 0.01);
}

#[test]
fn test_parse_tolerates_spaces_around_numbers() {
    let extent = Extent::from_bbox_string(" 0, 1 ,2,3 ").unwrap();
    assert_eq!(extent, Extent::new(0.0, 1.0, 2.0, 3.0));
}

#[test]
fn test_parse_wrong_arity() {
    assert!(matches!(
        Extent::from_bbox_string("0,0,100"),
        Err(ExtentParseError::InvalidFormat(_))
    ));
    assert!(matches!(
        Extent::from_bbox_string("0,0,100,100,200"),
        Err(ExtentParseError::InvalidFormat(_))
    ));
    assert!(matches!(
        Extent::from_bbox_string(""),
        Err(ExtentParseError::InvalidFormat(_))
    ));
}

#[test]
fn test_parse_invalid_number() {
    assert!(matches!(
        Extent::from_bbox_string("abc,0,100,100"),
        Err(ExtentParseError::InvalidNumber(_))
    ));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_accepts_proper_extent() {
    Extent::new(-180.0, -90.0, 180.0, 90.0).validate().unwrap();
    Extent::new(0.0, 0.0, 1e-10, 1e-10).validate().unwrap();
}

#[test]
fn test_validate_rejects_zero_width_and_height() {
    let point = Extent::new(5.0, 5.0, 5.0, 5.0);
    assert!(matches!(point.validate(), Err(MapError::InvalidExtent(_))));

    let flat = Extent::new(0.0, 5.0, 10.0, 5.0);
    assert!(matches!(flat.validate(), Err(MapError::InvalidExtent(_))));
}

#[test]
fn test_validate_rejects_inverted() {
    let inverted = Extent::new(10.0, 10.0, 0.0, 0.0);
    assert_eq!(inverted.width(), -10.0);
    assert!(matches!(inverted.validate(), Err(MapError::InvalidExtent(_))));
}

#[test]
fn test_validate_rejects_infinite() {
    let extent = Extent::new(0.0, 0.0, f64::INFINITY, 1.0);
    assert!(extent.validate().is_err());
}

// ============================================================================
// Geometry helpers
// ============================================================================

#[test]
fn test_dimensions_and_center() {
    let extent = Extent::new(-100.0, 0.0, -50.0, 10.0);
    assert_eq!(extent.width(), 50.0);
    assert_eq!(extent.height(), 10.0);
    assert_eq!(extent.center(), (-75.0, 5.0));
}

#[test]
fn test_intersects_is_open_on_edges() {
    let a = Extent::new(0.0, 0.0, 10.0, 10.0);
    let touching = Extent::new(10.0, 0.0, 20.0, 10.0);
    let overlapping = Extent::new(5.0, 5.0, 15.0, 15.0);

    assert!(!a.intersects(&touching));
    assert!(a.intersects(&overlapping));
    assert!(overlapping.intersects(&a));
}

#[test]
fn test_intersection_with_self() {
    let extent = Extent::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(extent.intersection(&extent), Some(extent));
}

#[test]
fn test_contains_point_includes_edges() {
    let extent = Extent::new(0.0, 0.0, 10.0, 10.0);
    assert!(extent.contains_point(0.0, 5.0));
    assert!(extent.contains_point(10.0, 10.0));
    assert!(!extent.contains_point(-1.0, 5.0));
    assert!(!extent.contains_point(5.0, 11.0));
}

#[test]
fn test_from_points() {
    let extent = Extent::from_points([(3.0, -1.0), (-2.0, 4.0), (0.0, 0.0)]).unwrap();
    assert_eq!(extent, Extent::new(-2.0, -1.0, 3.0, 4.0));
    assert!(Extent::from_points(Vec::new()).is_none());
}

#[test]
fn test_buffered() {
    let extent = Extent::new(0.0, 0.0, 10.0, 10.0).buffered(1.0, 2.0);
    assert_eq!(extent, Extent::new(-1.0, -2.0, 11.0, 12.0));
}
