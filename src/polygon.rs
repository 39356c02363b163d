use alloc::vec::Vec;

#[cfg(feature = "threads")]
use rayon::prelude::*;

use crate::error::DedupError;

/// Even-odd ray-casting test of one point against a closed polygon.
///
/// Edges are half-open in y, so a horizontal ray through a shared vertex
/// is counted once.
pub fn point_in_polygon(point: [f32; 2], polygon: &[[f32; 2]]) -> bool {
    let [x, y] = point;
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for (i, &[xi, yi]) in polygon.iter().enumerate() {
        let [xj, yj] = polygon[j];
        let straddles = (yi <= y && y < yj) || (yj <= y && y < yi);
        if straddles && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Classify each point as inside (`true`) or outside the polygon.
pub fn points_in_polygon(points: &[[f32; 2]], polygon: &[[f32; 2]]) -> Vec<bool> {
    #[cfg(feature = "threads")]
    let flags = points
        .par_iter()
        .map(|&p| point_in_polygon(p, polygon))
        .collect();
    #[cfg(not(feature = "threads"))]
    let flags = points
        .iter()
        .map(|&p| point_in_polygon(p, polygon))
        .collect();
    flags
}

fn as_pairs(coords: &[f32], dims: usize) -> Result<Vec<[f32; 2]>, DedupError> {
    if coords.len() % dims != 0 {
        return Err(DedupError::RaggedCoordinates {
            len: coords.len(),
            dims,
        });
    }
    Ok(coords.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
}

/// Classify flat, row-major coordinate buffers.
///
/// `points` holds `point_dims` values per point and `polygon` holds
/// `vertex_dims` values per vertex; both must be exactly 2.
pub fn classify_points_in_polygon(
    points: &[f32],
    point_dims: usize,
    polygon: &[f32],
    vertex_dims: usize,
) -> Result<Vec<bool>, DedupError> {
    if point_dims != 2 || vertex_dims != 2 {
        return Err(DedupError::InvalidShape {
            point_dims,
            vertex_dims,
        });
    }
    let points = as_pairs(points, point_dims)?;
    let polygon = as_pairs(polygon, vertex_dims)?;
    Ok(points_in_polygon(&points, &polygon))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    #[test]
    fn unit_square() {
        assert!(point_in_polygon([0.5, 0.5], &SQUARE));
        assert!(!point_in_polygon([2.0, 2.0], &SQUARE));
        assert!(!point_in_polygon([-0.1, 0.5], &SQUARE));
    }

    #[test]
    fn concave_notch() {
        // U shape open at the top between x=1 and x=2
        let u = [
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 3.0],
            [2.0, 3.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 3.0],
            [0.0, 3.0],
        ];
        assert!(point_in_polygon([0.5, 2.0], &u));
        assert!(point_in_polygon([2.5, 2.0], &u));
        assert!(!point_in_polygon([1.5, 2.0], &u));
        assert!(point_in_polygon([1.5, 0.5], &u));
    }

    #[test]
    fn degenerate_polygons() {
        assert!(!point_in_polygon([0.0, 0.0], &[]));
        assert!(!point_in_polygon([0.0, 0.0], &[[0.0, 0.0]]));
    }

    #[test]
    fn ragged_buffer() {
        assert!(matches!(
            classify_points_in_polygon(&[0.0, 1.0, 2.0], 2, &[0.0; 8], 2),
            Err(DedupError::RaggedCoordinates { len: 3, dims: 2 })
        ));
    }
}
