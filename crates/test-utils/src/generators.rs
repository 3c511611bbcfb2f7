//! Synthetic raster generators.
//!
//! These create predictable, verifiable value patterns in row-major order
//! (row 0 first, top-to-bottom).

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// A grid where every cell holds `value`.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Elevation-like grid in meters.
///
/// Values rise linearly from `low` at the west edge to `high` at the east
/// edge and are constant along each column.
pub fn create_elevation_grid(width: usize, height: usize, low: f32, high: f32) -> Vec<f32> {
    let span = (width.max(2) - 1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(low + (high - low) * col as f32 / span);
        }
    }
    data
}

/// Overwrite a `size × size` block in the top-left corner with `nodata`.
pub fn punch_nodata_hole(data: &mut [f32], width: usize, size: usize, nodata: f32) {
    let height = data.len() / width.max(1);
    for row in 0..size.min(height) {
        for col in 0..size.min(width) {
            data[row * width + col] = nodata;
        }
    }
}
