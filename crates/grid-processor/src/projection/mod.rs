//! Interpolation and reprojection onto tile grids.

pub mod interpolation;
pub mod reproject;

pub use interpolation::{bilinear_interpolate, nearest_interpolate};
pub use reproject::reproject_to_grid;
