//! Turns a render request plus an extent into pixels.
//!
//! Per feature: project every vertex into the output SRS and then into
//! pixel space, resolve the symbol, cull by bounding box, clip against the
//! image grown by a guard margin, and draw with tiny-skia. Labels are
//! collected and drawn last so geometry never covers them.
//!
//! Polygons are filled part by part with the even-odd rule, so holes are
//! empty and overlapping parts of one multipolygon do not cancel out.

use geo_types::{Coord, Geometry, LineString, Polygon};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use map_common::{
    Color, Extent, LabelSpec, MapError, MapResult, MarkerShape, MarkerSpec, SymbolSpec,
};
use projection::SrsTransform;
use rusttype::{Font, Scale};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use crate::clip::{bounds, clip_polyline, clip_ring, ClipRect, Point};
use crate::fontset::FontSet;
use crate::raster::RasterImage;
use crate::request::RenderRequest;

/// Extra guard band, in pixels, beyond stroke and marker extents.
const GUARD_PX: f64 = 2.0;

const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// Affine map from output-SRS coordinates to pixel coordinates, Y flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTransform {
    min_x: f64,
    max_y: f64,
    scale_x: f64,
    scale_y: f64,
}

impl PixelTransform {
    pub fn new(extent: &Extent, width: u32, height: u32) -> Self {
        Self {
            min_x: extent.min_x,
            max_y: extent.max_y,
            scale_x: width as f64 / extent.width(),
            scale_y: height as f64 / extent.height(),
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> Point {
        ((x - self.min_x) * self.scale_x, (self.max_y - y) * self.scale_y)
    }
}

/// Geometry in pixel space.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    /// Exterior ring first, then holes
    Polygon(Vec<Vec<Point>>),
    Line(Vec<Point>),
    Point(Point),
}

impl Shape {
    fn points(&self) -> Box<dyn Iterator<Item = &Point> + '_> {
        match self {
            Shape::Polygon(rings) => Box::new(rings.iter().flatten()),
            Shape::Line(points) => Box::new(points.iter()),
            Shape::Point(p) => Box::new(std::iter::once(p)),
        }
    }

    /// Label position and a weight used to pick among parts.
    fn anchor(&self) -> Option<(Point, f64)> {
        match self {
            Shape::Point(p) => Some((*p, 0.0)),
            Shape::Line(points) => line_midpoint(points),
            Shape::Polygon(rings) => rings.first().and_then(|ring| ring_centroid(ring)),
        }
    }
}

struct Projector<'a> {
    transform: &'a SrsTransform,
    view: PixelTransform,
}

impl Projector<'_> {
    fn point(&self, c: Coord<f64>) -> MapResult<Point> {
        let (x, y) = self.transform.transform_point(c.x, c.y)?;
        let p = self.view.apply(x, y);
        if !(p.0.is_finite() && p.1.is_finite()) {
            return Err(MapError::Projection(format!(
                "({}, {}) has no finite pixel position",
                c.x, c.y
            )));
        }
        Ok(p)
    }

    fn line(&self, line: &LineString<f64>) -> MapResult<Vec<Point>> {
        line.coords().map(|c| self.point(*c)).collect()
    }

    fn polygon(&self, polygon: &Polygon<f64>) -> MapResult<Shape> {
        let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
        rings.push(self.line(polygon.exterior())?);
        for hole in polygon.interiors() {
            rings.push(self.line(hole)?);
        }
        Ok(Shape::Polygon(rings))
    }

    fn geometry(&self, geometry: &Geometry<f64>, out: &mut Vec<Shape>) -> MapResult<()> {
        match geometry {
            Geometry::Point(p) => out.push(Shape::Point(self.point(p.0)?)),
            Geometry::MultiPoint(mp) => {
                for p in mp {
                    out.push(Shape::Point(self.point(p.0)?));
                }
            }
            Geometry::Line(l) => out.push(Shape::Line(vec![self.point(l.start)?, self.point(l.end)?])),
            Geometry::LineString(ls) => out.push(Shape::Line(self.line(ls)?)),
            Geometry::MultiLineString(mls) => {
                for ls in mls {
                    out.push(Shape::Line(self.line(ls)?));
                }
            }
            Geometry::Polygon(p) => out.push(self.polygon(p)?),
            Geometry::MultiPolygon(mp) => {
                for p in mp {
                    out.push(self.polygon(p)?);
                }
            }
            Geometry::Rect(r) => out.push(self.polygon(&r.to_polygon())?),
            Geometry::Triangle(t) => out.push(self.polygon(&t.to_polygon())?),
            Geometry::GeometryCollection(gc) => {
                for g in gc {
                    self.geometry(g, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Draws shapes onto the pixmap for one resolved symbol.
struct Painter<'a> {
    pixmap: &'a mut Pixmap,
    anti_alias: bool,
}

impl Painter<'_> {
    fn paint(&self, color: &Color) -> Paint<'static> {
        let (r, g, b, a) = color.to_rgba();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = self.anti_alias;
        paint
    }

    fn stroke_style(width: f32) -> Stroke {
        Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        }
    }

    /// Returns whether anything was drawn.
    fn draw(&mut self, shape: &Shape, symbol: &SymbolSpec, window: &ClipRect) -> bool {
        match shape {
            Shape::Polygon(rings) => self.draw_polygon(rings, symbol, window),
            Shape::Line(points) => self.draw_line(points, symbol, window),
            Shape::Point(p) => self.draw_marker(*p, symbol, window),
        }
    }

    fn draw_polygon(&mut self, rings: &[Vec<Point>], symbol: &SymbolSpec, window: &ClipRect) -> bool {
        let Some((exterior, holes)) = rings.split_first() else {
            return false;
        };
        let exterior = clip_ring(exterior, window);
        if exterior.len() < 3 {
            return false;
        }

        let mut pb = PathBuilder::new();
        add_ring(&mut pb, &exterior);
        for hole in holes {
            let hole = clip_ring(hole, window);
            if hole.len() >= 3 {
                add_ring(&mut pb, &hole);
            }
        }
        let Some(path) = pb.finish() else {
            return false;
        };

        if let Some(fill) = &symbol.fill {
            let paint = self.paint(fill);
            self.pixmap
                .fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
        }
        if let Some(stroke) = &symbol.stroke {
            let paint = self.paint(&stroke.color);
            self.pixmap.stroke_path(
                &path,
                &paint,
                &Self::stroke_style(stroke.width),
                Transform::identity(),
                None,
            );
        }
        symbol.fill.is_some() || symbol.stroke.is_some()
    }

    fn draw_line(&mut self, points: &[Point], symbol: &SymbolSpec, window: &ClipRect) -> bool {
        let (color, width) = match (&symbol.stroke, &symbol.fill) {
            (Some(stroke), _) => (&stroke.color, stroke.width),
            (None, Some(fill)) => (fill, DEFAULT_LINE_WIDTH),
            (None, None) => return false,
        };

        let mut pb = PathBuilder::new();
        for run in clip_polyline(points, window) {
            pb.move_to(run[0].0 as f32, run[0].1 as f32);
            for p in &run[1..] {
                pb.line_to(p.0 as f32, p.1 as f32);
            }
        }
        let Some(path) = pb.finish() else {
            return false;
        };

        let paint = self.paint(color);
        self.pixmap.stroke_path(
            &path,
            &paint,
            &Self::stroke_style(width),
            Transform::identity(),
            None,
        );
        true
    }

    fn draw_marker(&mut self, (x, y): Point, symbol: &SymbolSpec, window: &ClipRect) -> bool {
        if !window.contains((x, y)) {
            return false;
        }
        let marker = symbol.marker.clone().unwrap_or_else(default_marker);
        let color = marker
            .color
            .as_ref()
            .or(symbol.fill.as_ref())
            .or(symbol.stroke.as_ref().map(|s| &s.color));
        let Some(color) = color else {
            return false;
        };

        let (x, y) = (x as f32, y as f32);
        let r = marker.size / 2.0;
        let paint = self.paint(color);

        let path = match marker.shape {
            MarkerShape::Circle => PathBuilder::from_circle(x, y, r),
            MarkerShape::Square => Rect::from_xywh(x - r, y - r, marker.size, marker.size)
                .map(PathBuilder::from_rect),
            MarkerShape::Triangle => {
                let dx = r * 0.866_025_4;
                let mut pb = PathBuilder::new();
                pb.move_to(x, y - r);
                pb.line_to(x + dx, y + r / 2.0);
                pb.line_to(x - dx, y + r / 2.0);
                pb.close();
                pb.finish()
            }
            MarkerShape::Cross => {
                let mut pb = PathBuilder::new();
                pb.move_to(x - r, y);
                pb.line_to(x + r, y);
                pb.move_to(x, y - r);
                pb.line_to(x, y + r);
                if let Some(cross) = pb.finish() {
                    let stroke = Stroke {
                        width: (marker.size / 5.0).max(1.0),
                        ..Stroke::default()
                    };
                    self.pixmap
                        .stroke_path(&cross, &paint, &stroke, Transform::identity(), None);
                }
                return true;
            }
        };

        let Some(path) = path else {
            return false;
        };
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        if let Some(stroke) = &symbol.stroke {
            let outline = self.paint(&stroke.color);
            self.pixmap.stroke_path(
                &path,
                &outline,
                &Self::stroke_style(stroke.width),
                Transform::identity(),
                None,
            );
        }
        true
    }
}

fn add_ring(pb: &mut PathBuilder, ring: &[Point]) {
    pb.move_to(ring[0].0 as f32, ring[0].1 as f32);
    for p in &ring[1..] {
        pb.line_to(p.0 as f32, p.1 as f32);
    }
    pb.close();
}

fn default_marker() -> MarkerSpec {
    MarkerSpec {
        shape: MarkerShape::Circle,
        size: 6.0,
        color: None,
    }
}

/// Pixels beyond the image edge that must still be drawn so clipped edges
/// stay out of sight.
fn guard_margin(symbol: &SymbolSpec) -> f64 {
    let stroke = symbol.stroke.as_ref().map_or(DEFAULT_LINE_WIDTH, |s| s.width);
    let marker = symbol.marker.as_ref().map_or(6.0, |m| m.size);
    (stroke + marker) as f64 + GUARD_PX
}

/// Point halfway along a polyline, weighted by its length.
fn line_midpoint(points: &[Point]) -> Option<(Point, f64)> {
    let length: f64 = points.windows(2).map(|w| distance(w[0], w[1])).sum();
    if points.is_empty() {
        return None;
    }
    let mut remaining = length / 2.0;
    for w in points.windows(2) {
        let d = distance(w[0], w[1]);
        if d > 0.0 && remaining <= d {
            let t = remaining / d;
            let p = (w[0].0 + t * (w[1].0 - w[0].0), w[0].1 + t * (w[1].1 - w[0].1));
            return Some((p, length));
        }
        remaining -= d;
    }
    Some((points[0], length))
}

fn distance(a: Point, b: Point) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

/// Area centroid of a ring, weighted by its area. Degenerate rings fall back
/// to the vertex average.
fn ring_centroid(ring: &[Point]) -> Option<(Point, f64)> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len();
    let (mut a2, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let (p, q) = (ring[i], ring[(i + 1) % n]);
        let cross = p.0 * q.1 - q.0 * p.1;
        a2 += cross;
        cx += (p.0 + q.0) * cross;
        cy += (p.1 + q.1) * cross;
    }
    if a2.abs() < f64::EPSILON {
        let (sx, sy) = ring.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
        return Some(((sx / n as f64, sy / n as f64), 0.0));
    }
    Some(((cx / (3.0 * a2), cy / (3.0 * a2)), a2.abs() / 2.0))
}

struct PendingLabel {
    text: String,
    anchor: Point,
    spec: LabelSpec,
}

fn label_anchor(shapes: &[Shape]) -> Option<Point> {
    shapes
        .iter()
        .filter_map(Shape::anchor)
        .fold(None, |best: Option<(Point, f64)>, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
        .map(|(p, _)| p)
}

fn text_extent(font: &Font<'_>, scale: Scale, text: &str) -> (f64, f64) {
    let v = font.v_metrics(scale);
    let width = font
        .layout(text, scale, rusttype::point(0.0, v.ascent))
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| bb.max.x)
        .max()
        .unwrap_or(0);
    (width as f64, (v.ascent - v.descent) as f64)
}

fn draw_labels(image: &mut RgbaImage, labels: &[PendingLabel], fonts: &FontSet) -> usize {
    let mut drawn = 0;
    for label in labels {
        let Some(font) = fonts.font(&label.spec.font) else {
            tracing::warn!(font = %label.spec.font, text = %label.text, "Skipping label without a usable font");
            continue;
        };
        let scale = Scale::uniform(label.spec.size);
        let (w, h) = text_extent(font, scale, &label.text);
        let x = (label.anchor.0 - w / 2.0).round() as i32;
        let y = (label.anchor.1 - h / 2.0).round() as i32;
        let (r, g, b, a) = label.spec.color.to_rgba();
        draw_text_mut(image, Rgba([r, g, b, a]), x, y, scale, font, &label.text);
        drawn += 1;
    }
    drawn
}

/// Copy tiny-skia's premultiplied pixels out as straight RGBA.
fn demultiply(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

/// Render the features of `request` that fall inside `extent` (output SRS
/// units) into a `size.0 × size.1` image.
pub fn render_extent(
    request: &RenderRequest,
    extent: &Extent,
    size: (u32, u32),
) -> MapResult<RasterImage> {
    let (width, height) = size;
    let options = request.options();
    if width == 0 || height == 0 || width > options.max_size || height > options.max_size {
        return Err(MapError::InvalidSize { width, height });
    }
    extent.validate()?;

    let mut pixmap = Pixmap::new(width, height).ok_or(MapError::InvalidSize { width, height })?;
    let projector = Projector {
        transform: request.transform(),
        view: PixelTransform::new(extent, width, height),
    };

    let mut shapes = Vec::new();
    let mut labels = Vec::new();
    let (mut drawn, mut culled, mut skipped) = (0usize, 0usize, 0usize);

    for item in request.source().features()? {
        let feature = item?;

        shapes.clear();
        if let Err(e) = projector.geometry(&feature.geometry, &mut shapes) {
            tracing::warn!(error = %e, "Skipping feature that cannot be projected");
            skipped += 1;
            continue;
        }

        let symbol = request.style().resolve_symbol(&feature);
        let window = ClipRect::around_image(width, height, guard_margin(&symbol));

        let in_view = bounds(shapes.iter().flat_map(Shape::points))
            .is_some_and(|(min, max)| window.overlaps(min, max));
        if !in_view {
            culled += 1;
            continue;
        }

        let mut painter = Painter {
            pixmap: &mut pixmap,
            anti_alias: options.anti_alias,
        };
        let mut any = false;
        for shape in &shapes {
            any |= painter.draw(shape, &symbol, &window);
        }
        if any {
            drawn += 1;
        } else {
            culled += 1;
        }

        if let Some(spec) = &symbol.label {
            let text = feature
                .attribute(&spec.attribute)
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .filter(|t| !t.is_empty());
            if let (Some(text), Some(anchor)) = (text, label_anchor(&shapes)) {
                if anchor.0 >= 0.0
                    && anchor.1 >= 0.0
                    && anchor.0 < width as f64
                    && anchor.1 < height as f64
                {
                    labels.push(PendingLabel {
                        text,
                        anchor,
                        spec: spec.clone(),
                    });
                }
            }
        }
    }

    let mut image = demultiply(&pixmap);
    let labelled = draw_labels(&mut image, &labels, request.fonts());

    tracing::debug!(
        extent = ?extent,
        width,
        height,
        drawn,
        culled,
        skipped,
        labels = labelled,
        "Rendered extent"
    );

    Ok(RasterImage::from(image))
}
