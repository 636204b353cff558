use geo::algorithm::line_intersection::LineIntersection;
use geo_types::Coord;

use crate::error::EditError;
use crate::geometry::validity::{first_crossing, open_ring, ring_area};

/// Splits a self-intersecting ring into simple rings.
///
/// The ring is cut at its first crossing into two loops, which are split recursively. Every cut
/// produces loops with fewer vertices than the input ring, so the recursion terminates.
/// Coordinates are snapped to a grid of `1 / precision`. Loops without area are dropped.
///
/// Overlapping collinear segments cannot be cut at a single point and result in an error.
pub(super) fn split_ring(
    ring: &[Coord<f64>],
    precision: f64,
) -> Result<Vec<Vec<Coord<f64>>>, EditError> {
    let snapped: Vec<_> = ring.iter().map(|c| snap(*c, precision)).collect();
    let ring = open_ring(&snapped);
    if ring.len() < 3 {
        return Ok(vec![]);
    }

    let Some((i, j, intersection)) = first_crossing(&ring) else {
        return if ring_area(&ring) > 0.0 {
            Ok(vec![ring])
        } else {
            Ok(vec![])
        };
    };

    let p = match intersection {
        LineIntersection::SinglePoint { intersection, .. } => snap(intersection, precision),
        LineIntersection::Collinear { .. } => {
            return Err(EditError::Geometry(
                "ring has overlapping collinear segments".into(),
            ))
        }
    };

    let mut first = Vec::with_capacity(j - i + 1);
    first.push(p);
    first.extend_from_slice(&ring[i + 1..=j]);

    let mut second = Vec::with_capacity(ring.len() - (j - i) + 1);
    second.extend_from_slice(&ring[..=i]);
    second.push(p);
    second.extend_from_slice(&ring[j + 1..]);

    let mut result = split_ring(&first, precision)?;
    result.extend(split_ring(&second, precision)?);
    Ok(result)
}

fn snap(c: Coord<f64>, precision: f64) -> Coord<f64> {
    Coord {
        x: (c.x * precision).round() / precision,
        y: (c.y * precision).round() / precision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo_types::coord;

    #[test]
    fn simple_ring_is_kept() {
        let ring = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
        ];
        let parts = split_ring(&ring, 1e7).expect("split");
        assert_eq!(parts, vec![ring.to_vec()]);
    }

    #[test]
    fn bowtie_splits_in_two() {
        let ring = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 2.0, y: 2.0 },
            coord! { x: 2.0, y: 0.0 },
            coord! { x: 0.0, y: 2.0 },
        ];
        let parts = split_ring(&ring, 1e7).expect("split");
        assert_eq!(parts.len(), 2);
        for part in &parts {
            assert_eq!(part.len(), 3);
            assert_abs_diff_eq!(ring_area(part), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn double_crossing_splits_in_three() {
        // Zig-zag band crossing itself twice.
        let ring = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 2.0, y: 2.0 },
            coord! { x: 4.0, y: 0.0 },
            coord! { x: 4.0, y: 2.0 },
            coord! { x: 2.0, y: 0.0 },
            coord! { x: 0.0, y: 2.0 },
        ];
        let parts = split_ring(&ring, 1e7).expect("split");
        assert_eq!(parts.len(), 3);
        let total: f64 = parts.iter().map(|p| ring_area(p)).sum();
        assert_abs_diff_eq!(total, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_overlap_is_an_error() {
        let ring = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 2.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
        ];
        assert!(split_ring(&ring, 1e7).is_err());
    }
}
