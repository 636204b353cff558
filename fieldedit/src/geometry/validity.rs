use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::Area;
use geo_types::{Coord, Line, LineString, Polygon};

/// Ring coordinates without the closing coordinate and without consecutive duplicates.
pub(super) fn open_ring(ring: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for c in ring {
        if coords.last() != Some(c) {
            coords.push(*c);
        }
    }

    while coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }

    coords
}

pub(super) fn segment(ring: &[Coord<f64>], index: usize) -> Line<f64> {
    Line::new(ring[index], ring[(index + 1) % ring.len()])
}

/// Finds the first pair of ring segments `(i, j)`, `i < j`, that intersect other than at their
/// shared vertex.
pub(super) fn first_crossing(ring: &[Coord<f64>]) -> Option<(usize, usize, LineIntersection<f64>)> {
    let n = ring.len();
    if n < 3 {
        return None;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            let Some(intersection) = line_intersection(segment(ring, i), segment(ring, j)) else {
                continue;
            };

            match intersection {
                LineIntersection::SinglePoint { .. } if adjacent => {}
                intersection => return Some((i, j, intersection)),
            }
        }
    }

    None
}

pub(super) fn ring_area(ring: &[Coord<f64>]) -> f64 {
    Polygon::new(LineString::from(ring.to_vec()), vec![]).unsigned_area()
}

pub(super) fn is_valid_ring(ring: &LineString<f64>) -> bool {
    let open = open_ring(&ring.0);
    open.len() >= 3 && ring_area(&open) > 0.0 && first_crossing(&open).is_none()
}

pub(super) fn is_valid_polygon(polygon: &Polygon<f64>) -> bool {
    is_valid_ring(polygon.exterior()) && polygon.interiors().iter().all(is_valid_ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, polygon};

    #[test]
    fn square_is_valid() {
        let p = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        assert!(is_valid_polygon(&p));
    }

    #[test]
    fn bowtie_is_invalid() {
        let p = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 2.0), (x: 2.0, y: 0.0), (x: 0.0, y: 2.0)];
        assert!(!is_valid_polygon(&p));

        let ring = open_ring(&p.exterior().0);
        let (i, j, _) = first_crossing(&ring).expect("crossing");
        assert_eq!((i, j), (0, 2));
    }

    #[test]
    fn spike_is_invalid() {
        let p = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert!(!is_valid_polygon(&p));
    }

    #[test]
    fn collinear_ring_has_no_area() {
        let p = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        assert!(!is_valid_polygon(&p));
    }

    #[test]
    fn open_ring_drops_duplicates() {
        let ring = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 0.0 },
        ];
        assert_eq!(open_ring(&ring).len(), 3);
    }
}
