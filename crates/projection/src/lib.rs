//! Spatial reference transformations.
//!
//! Implements the supported map projections from scratch without external
//! dependencies.

pub mod albers;
pub mod ellipsoid;
pub mod mercator;
pub mod polar;
pub mod registry;
pub mod transform;

pub use ellipsoid::Ellipsoid;
pub use registry::{ProjectionDef, SpatialReference, SrsRegistry};
pub use transform::{transform_point, SrsTransform};
