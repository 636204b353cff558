//! See [`Envelope`].

use geo_types::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Axis-aligned bounding box in map coordinates, used for spatial range queries.
///
/// The constructor normalizes the corners, so `west <= east` and `south <= north` always hold.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl Envelope {
    /// Creates a new envelope. Corners are swapped if given in the wrong order.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west: west.min(east),
            south: south.min(north),
            east: west.max(east),
            north: south.max(north),
        }
    }

    /// Creates the envelope spanned by two opposite corners.
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Creates the smallest envelope containing all the given coordinates.
    ///
    /// Returns `None` if the iterator is empty.
    pub fn from_coords<'a>(mut coords: impl Iterator<Item = &'a Coordinate>) -> Option<Self> {
        let first = coords.next()?;
        let mut envelope = Self::new(first.x, first.y, first.x, first.y);
        for c in coords {
            envelope = envelope.include(*c);
        }

        Some(envelope)
    }

    /// Western (minimum x) boundary.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Southern (minimum y) boundary.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Eastern (maximum x) boundary.
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Northern (maximum y) boundary.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Extent along the x axis.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Extent along the y axis.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Returns true if the envelope has zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Expands every zero-length axis by `amount`, moving the southern or the western boundary.
    ///
    /// Axes with non-zero length are left untouched.
    ///
    /// ```
    /// use fieldedit_types::Envelope;
    ///
    /// let envelope = Envelope::new(1.0, 5.0, 3.0, 5.0).expand_degenerate(1.0);
    /// assert_eq!(envelope, Envelope::new(1.0, 4.0, 3.0, 5.0));
    /// ```
    pub fn expand_degenerate(&self, amount: f64) -> Self {
        let mut expanded = *self;
        if self.height() == 0.0 {
            expanded.south = self.north - amount;
        }
        if self.width() == 0.0 {
            expanded.west = self.east - amount;
        }

        expanded
    }

    /// Returns a copy of the envelope grown to include the coordinate.
    pub fn include(&self, c: Coordinate) -> Self {
        Self {
            west: self.west.min(c.x),
            south: self.south.min(c.y),
            east: self.east.max(c.x),
            north: self.north.max(c.y),
        }
    }

    /// Smallest envelope containing both envelopes.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Returns true if the coordinate is inside the envelope or on its boundary.
    pub fn contains(&self, c: Coordinate) -> bool {
        self.west <= c.x && c.x <= self.east && self.south <= c.y && c.y <= self.north
    }

    /// Returns true if the envelopes share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    /// Corners in counterclockwise order starting from the south-west one.
    pub fn corners(&self) -> [Coordinate; 4] {
        [
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.south },
            coord! { x: self.east, y: self.north },
            coord! { x: self.west, y: self.north },
        ]
    }

    /// Converts the envelope into a `geo_types` rectangle.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }
}

impl From<Rect<f64>> for Envelope {
    fn from(rect: Rect<f64>) -> Self {
        Self::from_corners(rect.min(), rect.max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_corners() {
        let envelope = Envelope::new(10.0, 5.0, -10.0, -5.0);
        assert_eq!(envelope.west(), -10.0);
        assert_eq!(envelope.south(), -5.0);
        assert_eq!(envelope.east(), 10.0);
        assert_eq!(envelope.north(), 5.0);
    }

    #[test]
    fn expand_degenerate_moves_south_and_west() {
        let point = Envelope::from_corners(coord! { x: 2.0, y: 3.0 }, coord! { x: 2.0, y: 3.0 });
        assert!(point.is_degenerate());

        let expanded = point.expand_degenerate(1.0);
        assert_eq!(expanded, Envelope::new(1.0, 2.0, 2.0, 3.0));
        assert!(!expanded.is_degenerate());
    }

    #[test]
    fn expand_degenerate_keeps_non_degenerate_axes() {
        let envelope = Envelope::new(0.0, 0.0, 4.0, 0.0);
        assert_eq!(envelope.expand_degenerate(1.0), Envelope::new(0.0, -1.0, 4.0, 0.0));
    }

    #[test]
    fn intersects_touching_boundaries() {
        let a = Envelope::new(0.0, 0.0, 1.0, 1.0);
        let b = Envelope::new(1.0, 1.0, 2.0, 2.0);
        let c = Envelope::new(1.1, 0.0, 2.0, 1.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn from_coords() {
        let coords = [
            coord! { x: 1.0, y: -1.0 },
            coord! { x: -3.0, y: 2.0 },
            coord! { x: 0.0, y: 0.5 },
        ];
        let envelope = Envelope::from_coords(coords.iter()).expect("not empty");
        assert_eq!(envelope, Envelope::new(-3.0, -1.0, 1.0, 2.0));
        assert!(Envelope::from_coords([].iter()).is_none());
    }
}
