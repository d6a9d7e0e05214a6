//! Extent types and operations.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::MapError;

/// An axis-aligned rectangle in geographic or projected coordinates.
///
/// For geographic SRS (EPSG:4326), coordinates are in degrees.
/// For projected SRS (EPSG:3857, etc.), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a `"minx,miny,maxx,maxy"` string.
    pub fn from_bbox_string(s: &str) -> Result<Self, ExtentParseError> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(ExtentParseError::InvalidFormat(s.to_string()));
        }

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| ExtentParseError::InvalidNumber(part.to_string()))
        };

        Ok(Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        })
    }

    /// Smallest extent containing all given points, `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let mut extent = Extent::new(x0, y0, x0, y0);
        for (x, y) in iter {
            extent.expand_to(x, y);
        }
        Some(extent)
    }

    /// Reject degenerate, inverted and non-finite extents.
    pub fn validate(&self) -> Result<(), MapError> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(MapError::InvalidExtent(format!(
                "non-finite coordinate in {:?}",
                self
            )));
        }
        if self.min_x >= self.max_x {
            return Err(MapError::InvalidExtent(format!(
                "min_x {} must be less than max_x {}",
                self.min_x, self.max_x
            )));
        }
        if self.min_y >= self.max_y {
            return Err(MapError::InvalidExtent(format!(
                "min_y {} must be less than max_y {}",
                self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Check if this extent intersects another (touching edges do not count).
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two extents.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        if !self.intersects(other) {
            return None;
        }

        Some(Extent {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this extent.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Grow the extent to include a point.
    pub fn expand_to(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// A copy of this extent grown by `dx` / `dy` on every side.
    pub fn buffered(&self, dx: f64, dy: f64) -> Extent {
        Extent::new(
            self.min_x - dx,
            self.min_y - dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }
}

impl FromStr for Extent {
    type Err = ExtentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bbox_string(s)
    }
}

impl From<(f64, f64, f64, f64)> for Extent {
    fn from((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> Self {
        Extent::new(min_x, min_y, max_x, max_y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtentParseError {
    #[error("Invalid extent format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in extent: {0}")]
    InvalidNumber(String),
}
