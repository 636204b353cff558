//! Geometry operations used by the editing tools.
//!
//! Tools never manipulate geometries directly. Everything goes through a [`GeometryEngine`],
//! so that the host can plug in the geometry library its storage uses. [`GeoEngine`] is the
//! default implementation based on the `geo` crate.

use fieldedit_types::{Coordinate, GeometryKind, Srid};
use geo::MapCoords;
use geo_types::{Geometry, MultiLineString, MultiPoint, MultiPolygon, Polygon};
use maybe_sync::{MaybeSend, MaybeSync};

use crate::error::EditError;

mod geo_engine;
mod split;
mod validity;

pub use geo_engine::GeoEngine;

/// Polygon construction, validation and boolean operations.
pub trait GeometryEngine: MaybeSend + MaybeSync {
    /// Builds a polygon from an open vertex sequence. The ring is closed automatically.
    fn create_polygon(&self, coords: &[Coordinate]) -> Result<Polygon<f64>, EditError>;
    /// Checks the geometry for topological validity (no self-intersecting rings, non-zero area).
    fn is_valid(&self, geometry: &Geometry<f64>) -> bool;
    /// Union of two polygonal geometries.
    fn union(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>, EditError>;
    /// Part of `a` not covered by `b`.
    fn difference(&self, a: &Geometry<f64>, b: &Geometry<f64>)
        -> Result<Geometry<f64>, EditError>;
    /// Splits a polygon with self-intersecting rings into simple polygons.
    fn split_invalid(&self, geometry: &Geometry<f64>) -> Result<Vec<Geometry<f64>>, EditError>;
    /// Buffers the geometry by `distance`. A zero distance is used to clean up invalid polygons.
    fn buffer(&self, geometry: &Geometry<f64>, distance: f64) -> Result<Geometry<f64>, EditError>;
    /// Returns true if the point lies inside or on the boundary of the geometry.
    fn intersects(&self, geometry: &Geometry<f64>, point: Coordinate) -> bool;
}

/// Number of simple geometries the geometry consists of.
pub fn part_count(geometry: &Geometry<f64>) -> usize {
    match geometry {
        Geometry::Point(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::Polygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => 1,
        Geometry::MultiPoint(g) => g.0.len(),
        Geometry::MultiLineString(g) => g.0.len(),
        Geometry::MultiPolygon(g) => g.0.len(),
        Geometry::GeometryCollection(g) => g.0.len(),
    }
}

/// Transforms all coordinates of the geometry between reference systems.
pub fn reproject(
    geometry: &Geometry<f64>,
    from: Srid,
    to: Srid,
) -> Result<Geometry<f64>, EditError> {
    if from == to {
        return Ok(geometry.clone());
    }

    Ok(geometry.try_map_coords(move |c| from.transform(c, to))?)
}

/// Converts a polygonal geometry into a multipolygon.
pub(crate) fn to_multi_polygon(geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>, EditError> {
    match geometry {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        Geometry::Rect(r) => Ok(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Ok(MultiPolygon::new(vec![t.to_polygon()])),
        other => Err(EditError::Geometry(format!(
            "expected a polygonal geometry, got {}",
            GeometryKind::of(other)
        ))),
    }
}

/// Wraps a single geometry into a collection of one part if `kind` is a collection kind.
/// Other geometries are returned unchanged.
pub(crate) fn cast_to_kind(geometry: Geometry<f64>, kind: GeometryKind) -> Geometry<f64> {
    match (geometry, kind) {
        (Geometry::Point(p), GeometryKind::MultiPoint) => {
            Geometry::MultiPoint(MultiPoint::new(vec![p]))
        }
        (Geometry::LineString(l), GeometryKind::MultiLineString) => {
            Geometry::MultiLineString(MultiLineString::new(vec![l]))
        }
        (Geometry::Polygon(p), GeometryKind::MultiPolygon) => {
            Geometry::MultiPolygon(MultiPolygon::new(vec![p]))
        }
        (geometry, _) => geometry,
    }
}

/// Collapses a multipolygon of one part into a polygon.
pub(crate) fn simplify_collection(mp: MultiPolygon<f64>) -> Result<Geometry<f64>, EditError> {
    let mut parts = mp.0;
    match parts.len() {
        0 => Err(EditError::Geometry(
            "operation produced an empty geometry".into(),
        )),
        1 => Ok(Geometry::Polygon(parts.remove(0))),
        _ => Ok(Geometry::MultiPolygon(MultiPolygon::new(parts))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, point, polygon};

    #[test]
    fn part_counts() {
        let p = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(part_count(&Geometry::Polygon(p.clone())), 1);
        assert_eq!(
            part_count(&Geometry::MultiPolygon(MultiPolygon::new(vec![p.clone(), p]))),
            2
        );
        assert_eq!(
            part_count(&Geometry::MultiPoint(MultiPoint::new(vec![
                point!(x: 0.0, y: 0.0),
                point!(x: 1.0, y: 0.0),
                point!(x: 2.0, y: 0.0),
            ]))),
            3
        );
    }

    #[test]
    fn reproject_identity_is_exact() {
        let g = Geometry::Point(point!(x: 12.345678901, y: 1.0));
        assert_eq!(reproject(&g, Srid(2056), Srid(2056)), Ok(g));
    }

    #[test]
    fn reproject_out_of_domain() {
        let g = Geometry::Point(point!(x: 0.0, y: 90.0));
        assert!(reproject(&g, Srid::WGS84, Srid::WEB_MERCATOR).is_err());
    }

    #[test]
    fn single_geometries_are_cast_to_multi_layer_kind() {
        let p = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        let cast = cast_to_kind(Geometry::Polygon(p.clone()), GeometryKind::MultiPolygon);
        assert_eq!(cast, Geometry::MultiPolygon(MultiPolygon::new(vec![p.clone()])));
        assert_eq!(
            cast_to_kind(Geometry::Polygon(p.clone()), GeometryKind::Polygon),
            Geometry::Polygon(p)
        );

        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(
            GeometryKind::of(&cast_to_kind(
                Geometry::LineString(line),
                GeometryKind::MultiLineString
            )),
            GeometryKind::MultiLineString
        );

        let mp = MultiPolygon::new(vec![]);
        assert_eq!(
            cast_to_kind(Geometry::MultiPolygon(mp.clone()), GeometryKind::Polygon),
            Geometry::MultiPolygon(mp)
        );
    }
}
