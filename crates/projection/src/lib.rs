//! Coordinate reference system transformations.
//!
//! Implements the projections the tiler needs from scratch without external
//! dependencies: spherical (web) mercator and plain geographic coordinates.

pub mod affine;
pub mod mercator;
pub mod transform;

pub use affine::Affine;
pub use transform::{transform_bounds, transform_point, ProjectionError};
