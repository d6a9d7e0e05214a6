//! Common types shared by the projection and rendering crates.

pub mod error;
pub mod extent;
pub mod feature;
pub mod srs;
pub mod style;

pub use error::{MapError, MapResult};
pub use extent::Extent;
pub use feature::{AttributeValue, Feature, FeatureIter, FeatureSource, GeometryKind, MemoryFeatureSource};
pub use srs::SrsId;
pub use style::{
    default_style_for, Color, Filter, LabelSpec, MarkerShape, MarkerSpec, StrokeSpec, StyleConfig,
    StyleDefinition, StyleRule, SymbolSpec,
};
