//! Clipping of pixel-space geometry against an axis-aligned window.
//!
//! Rings use Sutherland–Hodgman, which keeps a ring closed and may leave
//! zero-width slivers along the window edge. The window passed in by the
//! rasterizer lies outside the visible image, so slivers never show.
//! Polylines use Liang–Barsky per segment.

/// A point in pixel space.
pub type Point = (f64, f64);

/// Axis-aligned clip window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipRect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// `(0, 0)..(width, height)` grown by `margin` on every side.
    pub fn around_image(width: u32, height: u32, margin: f64) -> Self {
        Self::new(-margin, -margin, width as f64 + margin, height as f64 + margin)
    }

    pub fn contains(&self, (x, y): Point) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Whether a bounding box `(min, max)` overlaps the window.
    pub fn overlaps(&self, min: Point, max: Point) -> bool {
        min.0 <= self.max_x && max.0 >= self.min_x && min.1 <= self.max_y && max.1 >= self.min_y
    }
}

/// Bounding box of a point set, `None` when empty.
pub fn bounds<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<(Point, Point)> {
    points.into_iter().fold(None, |acc, &(x, y)| match acc {
        None => Some(((x, y), (x, y))),
        Some((min, max)) => Some(((min.0.min(x), min.1.min(y)), (max.0.max(x), max.1.max(y)))),
    })
}

#[derive(Clone, Copy)]
enum Edge {
    Left(f64),
    Right(f64),
    Top(f64),
    Bottom(f64),
}

impl Edge {
    fn inside(self, (x, y): Point) -> bool {
        match self {
            Edge::Left(v) => x >= v,
            Edge::Right(v) => x <= v,
            Edge::Top(v) => y >= v,
            Edge::Bottom(v) => y <= v,
        }
    }

    /// Where segment `a`-`b` crosses this edge. Only called when the
    /// endpoints are on opposite sides, so the denominator is non-zero.
    fn intersect(self, a: Point, b: Point) -> Point {
        match self {
            Edge::Left(v) | Edge::Right(v) => {
                let t = (v - a.0) / (b.0 - a.0);
                (v, a.1 + t * (b.1 - a.1))
            }
            Edge::Top(v) | Edge::Bottom(v) => {
                let t = (v - a.1) / (b.1 - a.1);
                (a.0 + t * (b.0 - a.0), v)
            }
        }
    }
}

/// Clip a ring (closing vertex optional) to `rect`. The result is open;
/// fewer than three points means nothing is left.
pub fn clip_ring(ring: &[Point], rect: &ClipRect) -> Vec<Point> {
    let mut output: Vec<Point> = ring.to_vec();
    if output.len() > 1 && output.first() == output.last() {
        output.pop();
    }

    for edge in [
        Edge::Left(rect.min_x),
        Edge::Right(rect.max_x),
        Edge::Top(rect.min_y),
        Edge::Bottom(rect.max_y),
    ] {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for &current in &input {
            match (edge.inside(current), edge.inside(prev)) {
                (true, true) => output.push(current),
                (true, false) => {
                    output.push(edge.intersect(prev, current));
                    output.push(current);
                }
                (false, true) => output.push(edge.intersect(prev, current)),
                (false, false) => {}
            }
            prev = current;
        }
    }

    output
}

/// Liang–Barsky: the part of segment `a`-`b` inside `rect`.
pub fn clip_segment(a: Point, b: Point, rect: &ClipRect) -> Option<(Point, Point)> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    for (p, q) in [
        (-dx, a.0 - rect.min_x),
        (dx, rect.max_x - a.0),
        (-dy, a.1 - rect.min_y),
        (dy, rect.max_y - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| (a.0 + t * dx, a.1 + t * dy);
    Some((if t0 > 0.0 { at(t0) } else { a }, if t1 < 1.0 { at(t1) } else { b }))
}

/// Clip a polyline into the runs that lie inside `rect`.
pub fn clip_polyline(points: &[Point], rect: &ClipRect) -> Vec<Vec<Point>> {
    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], rect) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(start);
                }
                current.push(end);
            }
            None => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }
    runs
}
