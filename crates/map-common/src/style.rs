//! Style definitions for symbolizing vector features.
//!
//! A style is an ordered list of rules in the manner of a mapfile `CLASS`
//! block: each rule pairs a filter expression with a symbol, and the first
//! rule whose filter matches a feature decides how that feature is drawn.
//! Styles are stored as JSON; [`StyleDefinition::from_json`] is the parser
//! used by the persistence layer.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{MapError, MapResult};
use crate::feature::{AttributeValue, Feature, FeatureSource, GeometryKind};

/// Root style document - can contain multiple named styles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Version of the style schema
    #[serde(default = "default_version")]
    pub version: String,

    /// Named style definitions
    pub styles: HashMap<String, StyleDefinition>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StyleConfig {
    /// Load a style document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a style document and validate every style in it.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let config: StyleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Get a style by name.
    pub fn get(&self, name: &str) -> Option<&StyleDefinition> {
        self.styles.get(name)
    }

    pub fn validate(&self) -> MapResult<()> {
        for (name, style) in &self.styles {
            style
                .validate()
                .map_err(|e| MapError::InvalidStyle(format!("{}: {}", name, e)))?;
        }
        Ok(())
    }
}

/// How to symbolize the features of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Fill used when no rule matches
    #[serde(default)]
    pub fill_color: Option<Color>,

    /// Outline used when no rule matches
    #[serde(default)]
    pub stroke_color: Option<Color>,

    /// Rules, evaluated in order
    #[serde(default)]
    pub rules: Vec<StyleRule>,
}

impl StyleDefinition {
    /// Build and validate a style.
    pub fn new(
        name: impl Into<String>,
        fill_color: Option<Color>,
        stroke_color: Option<Color>,
        rules: Vec<StyleRule>,
    ) -> MapResult<Self> {
        let style = Self {
            name: name.into(),
            fill_color,
            stroke_color,
            rules,
        };
        style.validate()?;
        Ok(style)
    }

    /// Parse a single style from JSON.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let style: StyleDefinition = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }

    /// Load a single style from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> MapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The single-rule style a new layer gets: every feature is drawn in
    /// `color` at full opacity, with the symbol chosen by geometry class.
    pub fn default_for(kind: Option<GeometryKind>, color: (u8, u8, u8)) -> Self {
        let (r, g, b) = color;
        let color = Color::rgb(r, g, b);

        let symbol = match kind {
            Some(GeometryKind::Point) => SymbolSpec {
                marker: Some(MarkerSpec {
                    shape: MarkerShape::Circle,
                    size: default_marker_size(),
                    color: Some(color.clone()),
                }),
                ..SymbolSpec::default()
            },
            Some(GeometryKind::Line) => SymbolSpec {
                stroke: Some(StrokeSpec {
                    color: color.clone(),
                    width: default_line_width(),
                }),
                ..SymbolSpec::default()
            },
            Some(GeometryKind::Polygon) | None => SymbolSpec {
                fill: Some(color.clone()),
                ..SymbolSpec::default()
            },
        };

        Self {
            name: "default".to_string(),
            fill_color: Some(color),
            stroke_color: None,
            rules: vec![StyleRule {
                name: Some("default".to_string()),
                filter: Filter::All,
                symbol,
            }],
        }
    }

    pub fn validate(&self) -> MapResult<()> {
        if self.rules.is_empty() && self.fill_color.is_none() {
            return Err(MapError::InvalidStyle(
                "style needs at least one rule or a default fill color".to_string(),
            ));
        }

        if let Some(color) = &self.fill_color {
            color.validate()?;
        }
        if let Some(color) = &self.stroke_color {
            color.validate()?;
        }
        for (i, rule) in self.rules.iter().enumerate() {
            rule.symbol.validate().map_err(|e| {
                MapError::InvalidStyle(format!("rule {}: {}", rule.display_name(i), e))
            })?;
        }
        Ok(())
    }

    /// Pick the symbol for a feature: first matching rule wins, otherwise the
    /// style's default fill and outline.
    pub fn resolve_symbol(&self, feature: &Feature) -> Cow<'_, SymbolSpec> {
        match self.rules.iter().find(|rule| rule.filter.matches(feature)) {
            Some(rule) => Cow::Borrowed(&rule.symbol),
            None => Cow::Owned(self.fallback_symbol()),
        }
    }

    fn fallback_symbol(&self) -> SymbolSpec {
        SymbolSpec {
            fill: self.fill_color.clone(),
            stroke: self.stroke_color.clone().map(|color| StrokeSpec {
                color,
                width: default_line_width(),
            }),
            ..SymbolSpec::default()
        }
    }
}

/// Default style for the layer behind `source`, in the given color.
pub fn default_style_for(source: &dyn FeatureSource, color: (u8, u8, u8)) -> StyleDefinition {
    StyleDefinition::default_for(source.geometry_kind(), color)
}

/// A filter paired with the symbol to use when it matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub filter: Filter,

    pub symbol: SymbolSpec,
}

impl StyleRule {
    pub fn new(filter: Filter, symbol: SymbolSpec) -> Self {
        Self {
            name: None,
            filter,
            symbol,
        }
    }

    fn display_name(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", index))
    }
}

/// Feature predicate.
///
/// Comparisons against a missing attribute never match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Matches every feature
    #[default]
    All,

    Eq {
        attribute: String,
        value: AttributeValue,
    },

    Ne {
        attribute: String,
        value: AttributeValue,
    },

    In {
        attribute: String,
        values: Vec<AttributeValue>,
    },

    /// `min <= value < max`, either bound optional
    Range {
        attribute: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },

    Geometry {
        kind: GeometryKind,
    },

    AnyOf {
        filters: Vec<Filter>,
    },

    AllOf {
        filters: Vec<Filter>,
    },

    Not {
        filter: Box<Filter>,
    },
}

impl Filter {
    pub fn eq(attribute: &str, value: impl Into<AttributeValue>) -> Self {
        Filter::Eq {
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }

    pub fn range(attribute: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Filter::Range {
            attribute: attribute.to_string(),
            min,
            max,
        }
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { attribute, value } => feature
                .attribute(attribute)
                .map(|v| v.matches(value))
                .unwrap_or(false),
            Filter::Ne { attribute, value } => feature
                .attribute(attribute)
                .map(|v| !v.matches(value))
                .unwrap_or(false),
            Filter::In { attribute, values } => feature
                .attribute(attribute)
                .map(|v| values.iter().any(|candidate| v.matches(candidate)))
                .unwrap_or(false),
            Filter::Range {
                attribute,
                min,
                max,
            } => match feature.attribute(attribute).and_then(AttributeValue::as_f64) {
                Some(value) => {
                    let in_min = min.map(|m| value >= m).unwrap_or(true);
                    let in_max = max.map(|m| value < m).unwrap_or(true);
                    in_min && in_max
                }
                None => false,
            },
            Filter::Geometry { kind } => feature.kind() == Some(*kind),
            Filter::AnyOf { filters } => filters.iter().any(|f| f.matches(feature)),
            Filter::AllOf { filters } => filters.iter().all(|f| f.matches(feature)),
            Filter::Not { filter } => !filter.matches(feature),
        }
    }
}

/// The drawing instructions resolved for a feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SymbolSpec {
    /// Polygon fill
    #[serde(default)]
    pub fill: Option<Color>,

    /// Polygon outline or line stroke
    #[serde(default)]
    pub stroke: Option<StrokeSpec>,

    /// Point marker
    #[serde(default)]
    pub marker: Option<MarkerSpec>,

    /// Text label taken from an attribute
    #[serde(default)]
    pub label: Option<LabelSpec>,
}

impl SymbolSpec {
    /// Solid fill, nothing else.
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    /// Line stroke, nothing else.
    pub fn stroke(color: Color, width: f32) -> Self {
        Self {
            stroke: Some(StrokeSpec { color, width }),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(fill) = &self.fill {
            fill.validate().map_err(|e| e.to_string())?;
        }
        if let Some(stroke) = &self.stroke {
            stroke.color.validate().map_err(|e| e.to_string())?;
            if !(stroke.width > 0.0) {
                return Err(format!("stroke width must be positive, got {}", stroke.width));
            }
        }
        if let Some(marker) = &self.marker {
            if let Some(color) = &marker.color {
                color.validate().map_err(|e| e.to_string())?;
            }
            if !(marker.size > 0.0) {
                return Err(format!("marker size must be positive, got {}", marker.size));
            }
        }
        if let Some(label) = &self.label {
            label.color.validate().map_err(|e| e.to_string())?;
            if !(label.size > 0.0) {
                return Err(format!("label size must be positive, got {}", label.size));
            }
        }
        Ok(())
    }
}

/// Line stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSpec {
    pub color: Color,

    /// Line width in pixels
    #[serde(default = "default_line_width")]
    pub width: f32,
}

/// Point marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    #[serde(default)]
    pub shape: MarkerShape,

    /// Marker size (diameter) in pixels
    #[serde(default = "default_marker_size")]
    pub size: f32,

    /// Marker color, the symbol fill when absent
    #[serde(default)]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Cross,
}

/// Text label drawn from a feature attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    /// Attribute holding the label text
    pub attribute: String,

    /// Font name from the font set
    #[serde(default = "default_font")]
    pub font: String,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub size: f32,

    #[serde(default = "default_label_color")]
    pub color: Color,
}

fn default_line_width() -> f32 {
    1.0
}
fn default_marker_size() -> f32 {
    6.0
}
fn default_font() -> String {
    "default".to_string()
}
fn default_font_size() -> f32 {
    10.0
}
fn default_label_color() -> Color {
    Color::rgb(0, 0, 0)
}

/// Color representation supporting multiple formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string: "#RRGGBB" or "#RRGGBBAA"
    Hex(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    /// Opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgba { r, g, b, a: 255 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color::Rgba { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Color::Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert to RGBA, `None` for malformed hex strings, unknown names or
    /// arrays that are not 3 or 4 long.
    pub fn try_to_rgba(&self) -> Option<(u8, u8, u8, u8)> {
        match self {
            Color::Hex(s) if s.starts_with('#') => parse_hex_color(s),
            Color::Hex(s) => named_color(s).or_else(|| parse_hex_color(s)),
            Color::Array(arr) => match arr.as_slice() {
                [r, g, b] => Some((*r, *g, *b, 255)),
                [r, g, b, a] => Some((*r, *g, *b, *a)),
                _ => None,
            },
            Color::Rgba { r, g, b, a } => Some((*r, *g, *b, *a)),
        }
    }

    /// Convert to RGBA tuple, opaque black when malformed.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        self.try_to_rgba().unwrap_or((0, 0, 0, 255))
    }

    pub fn validate(&self) -> MapResult<()> {
        match self.try_to_rgba() {
            Some(_) => Ok(()),
            None => Err(MapError::InvalidStyle(format!("invalid color {:?}", self))),
        }
    }
}

fn parse_hex_color(s: &str) -> Option<(u8, u8, u8, u8)> {
    let s = s.trim_start_matches('#');
    if !s.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        6 => Some((channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some((channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<(u8, u8, u8, u8)> {
    let rgba = match name.to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "cyan" => (0, 255, 255, 255),
        "magenta" => (255, 0, 255, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => return None,
    };
    Some(rgba)
}
