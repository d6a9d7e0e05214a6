//! Generators for synthetic, predictable feature sets.
//!
//! Every generator is deterministic so rendered output can be compared
//! across runs and threads.

use geo_types::{coord, LineString, Point, Polygon};
use map_common::{Extent, Feature, MemoryFeatureSource, SrsId};

/// Splits `extent` into `cols × rows` rectangular cells, one feature per cell,
/// classed alternately like the squares of a chessboard.
///
/// Each feature carries `row`, `col` and `class` (`"even"` or `"odd"` by
/// `row + col`) attributes.
///
/// ```
/// use map_common::{Extent, SrsId};
/// use test_utils::create_checkerboard;
///
/// let source = create_checkerboard(SrsId::wgs84(), Extent::new(0.0, 0.0, 4.0, 4.0), 4, 4);
/// assert_eq!(source.len(), 16);
/// ```
pub fn create_checkerboard(srs: SrsId, extent: Extent, cols: u32, rows: u32) -> MemoryFeatureSource {
    let dx = extent.width() / cols as f64;
    let dy = extent.height() / rows as f64;
    let mut source = MemoryFeatureSource::new(srs);

    for row in 0..rows {
        for col in 0..cols {
            let x0 = extent.min_x + col as f64 * dx;
            let y0 = extent.min_y + row as f64 * dy;
            let cell = Polygon::new(
                LineString::from(vec![
                    (x0, y0),
                    (x0 + dx, y0),
                    (x0 + dx, y0 + dy),
                    (x0, y0 + dy),
                    (x0, y0),
                ]),
                vec![],
            );
            let class = if (row + col) % 2 == 0 { "even" } else { "odd" };
            source.push(
                Feature::new(cell)
                    .with_attribute("row", row as i64)
                    .with_attribute("col", col as i64)
                    .with_attribute("class", class),
            );
        }
    }
    source
}

/// `count` straight lines radiating from the center of `extent` to its
/// inscribed circle. Each carries an `index` attribute.
pub fn create_radial_lines(srs: SrsId, extent: Extent, count: usize) -> MemoryFeatureSource {
    let (cx, cy) = extent.center();
    let radius = extent.width().min(extent.height()) / 2.0;
    let mut source = MemoryFeatureSource::new(srs);

    for i in 0..count {
        let angle = i as f64 / count.max(1) as f64 * std::f64::consts::TAU;
        let line = LineString::new(vec![
            coord! { x: cx, y: cy },
            coord! { x: cx + radius * angle.cos(), y: cy + radius * angle.sin() },
        ]);
        source.push(Feature::new(line).with_attribute("index", i as i64));
    }
    source
}

/// A regular `n × n` grid of points inset half a cell from the edges of
/// `extent`, named `"p{row}_{col}"`.
pub fn create_point_grid(srs: SrsId, extent: Extent, n: u32) -> MemoryFeatureSource {
    let dx = extent.width() / n as f64;
    let dy = extent.height() / n as f64;
    let mut source = MemoryFeatureSource::new(srs);

    for row in 0..n {
        for col in 0..n {
            let x = extent.min_x + (col as f64 + 0.5) * dx;
            let y = extent.min_y + (row as f64 + 0.5) * dy;
            source.push(
                Feature::new(Point::new(x, y))
                    .with_attribute("name", format!("p{}_{}", row, col)),
            );
        }
    }
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::{AttributeValue, FeatureSource, GeometryKind};

    #[test]
    fn test_checkerboard_classes() {
        let source = create_checkerboard(SrsId::wgs84(), Extent::new(0.0, 0.0, 2.0, 2.0), 2, 2);
        let features: Vec<_> = source.features().unwrap().map(|f| f.unwrap()).collect();
        assert_eq!(features.len(), 4);
        assert_eq!(features[0].attribute("class"), Some(&AttributeValue::from("even")));
        assert_eq!(features[1].attribute("class"), Some(&AttributeValue::from("odd")));
        assert_eq!(source.geometry_kind(), Some(GeometryKind::Polygon));
    }

    #[test]
    fn test_radial_lines_count() {
        let source = create_radial_lines(SrsId::wgs84(), Extent::new(-1.0, -1.0, 1.0, 1.0), 8);
        assert_eq!(source.len(), 8);
        assert_eq!(source.geometry_kind(), Some(GeometryKind::Line));
    }

    #[test]
    fn test_point_grid_inset() {
        let source = create_point_grid(SrsId::wgs84(), Extent::new(0.0, 0.0, 10.0, 10.0), 5);
        let first = source.features().unwrap().next().unwrap().unwrap();
        assert_eq!(first.geometry, geo_types::Geometry::Point(Point::new(1.0, 1.0)));
        assert_eq!(source.len(), 25);
    }
}
