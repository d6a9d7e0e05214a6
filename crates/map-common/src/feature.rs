//! Features and the feature source interface consumed by the renderer.

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{MapError, MapResult};
use crate::srs::SrsId;

/// Broad geometry class used for symbol selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl GeometryKind {
    /// Classify a geometry. Collections take the kind of their first member.
    pub fn of(geometry: &Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(GeometryKind::Point),
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                Some(GeometryKind::Line)
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => Some(GeometryKind::Polygon),
            Geometry::GeometryCollection(collection) => {
                collection.iter().find_map(GeometryKind::of)
            }
        }
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl AttributeValue {
    /// Numeric view of the value; text is parsed when it looks like a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::Real(v) => Some(*v),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::Null | AttributeValue::Bool(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Equality used by style filters: numbers compare numerically, anything
    /// else compares by its text form.
    pub fn matches(&self, other: &AttributeValue) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }
        match (self, other) {
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => self.to_string() == other.to_string(),
            },
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Bool(v) => write!(f, "{}", v),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Real(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Real(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<&serde_json::Value> for AttributeValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => AttributeValue::Text(s.clone()),
            other => AttributeValue::Text(other.to_string()),
        }
    }
}

/// A geometry with attributes. Only X/Y ordinates are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn kind(&self) -> Option<GeometryKind> {
        GeometryKind::of(&self.geometry)
    }
}

/// Iterator over the features of a source. Borrowed when the source holds its
/// features in memory, owned when it produces them on the fly.
pub type FeatureIter<'a> = Box<dyn Iterator<Item = MapResult<Cow<'a, Feature>>> + 'a>;

/// A finite, restartable collection of features in one spatial reference.
///
/// Implementations must tolerate concurrent calls to [`features`](Self::features)
/// from several threads; the renderer never mutates a source.
pub trait FeatureSource: Send + Sync {
    /// Spatial reference of every feature geometry.
    fn srs(&self) -> &SrsId;

    /// Declared geometry class of the layer, if known.
    fn geometry_kind(&self) -> Option<GeometryKind> {
        None
    }

    /// Start a fresh pass over all features.
    fn features(&self) -> MapResult<FeatureIter<'_>>;
}

/// A feature source holding its features in memory.
#[derive(Debug, Clone)]
pub struct MemoryFeatureSource {
    srs: SrsId,
    features: Vec<Feature>,
}

impl MemoryFeatureSource {
    pub fn new(srs: SrsId) -> Self {
        Self {
            srs,
            features: Vec::new(),
        }
    }

    pub fn with_features(srs: SrsId, features: Vec<Feature>) -> Self {
        Self { srs, features }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Load features from a GeoJSON document.
    ///
    /// The SRS is taken from `srs` when given, then from a legacy `crs` member,
    /// and defaults to EPSG:4326. Features without geometry are skipped.
    pub fn from_geojson_str(text: &str, srs: Option<SrsId>) -> MapResult<Self> {
        let document: geojson::GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| MapError::feature_source(e))?;

        let (declared_srs, raw_features) = match document {
            geojson::GeoJson::FeatureCollection(collection) => (
                legacy_crs(collection.foreign_members.as_ref()),
                collection.features,
            ),
            geojson::GeoJson::Feature(feature) => (None, vec![feature]),
            geojson::GeoJson::Geometry(geometry) => (
                None,
                vec![geojson::Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: None,
                    foreign_members: None,
                }],
            ),
        };

        let srs = srs.or(declared_srs).unwrap_or_else(SrsId::wgs84);
        let mut source = MemoryFeatureSource::new(srs);

        for raw in raw_features {
            let Some(geometry) = raw.geometry else {
                tracing::debug!("Skipping GeoJSON feature without geometry");
                continue;
            };
            let geometry =
                Geometry::<f64>::try_from(geometry).map_err(MapError::feature_source)?;

            let mut feature = Feature::new(geometry);
            if let Some(properties) = raw.properties {
                for (name, value) in properties.iter() {
                    feature.attributes.insert(name.clone(), value.into());
                }
            }
            source.push(feature);
        }

        tracing::debug!(srs = %source.srs, count = source.len(), "Loaded GeoJSON features");
        Ok(source)
    }

    /// Load features from a GeoJSON file. Read failures are reported as
    /// [`MapError::FeatureSource`] like parse failures.
    pub fn from_geojson_file(path: impl AsRef<Path>, srs: Option<SrsId>) -> MapResult<Self> {
        let text = std::fs::read_to_string(path).map_err(MapError::feature_source)?;
        Self::from_geojson_str(&text, srs)
    }
}

impl FeatureSource for MemoryFeatureSource {
    fn srs(&self) -> &SrsId {
        &self.srs
    }

    fn geometry_kind(&self) -> Option<GeometryKind> {
        self.features.iter().find_map(Feature::kind)
    }

    fn features(&self) -> MapResult<FeatureIter<'_>> {
        Ok(Box::new(self.features.iter().map(|f| Ok(Cow::Borrowed(f)))))
    }
}

/// Read `{"crs": {"type": "name", "properties": {"name": "..."}}}`.
fn legacy_crs(members: Option<&geojson::JsonObject>) -> Option<SrsId> {
    let name = members?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;
    SrsId::parse(name).ok()
}
