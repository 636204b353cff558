use fieldedit_types::Coordinate;
use geo::{BooleanOps, Contains, Intersects};
use geo_types::{Geometry, LineString, MultiPolygon, Polygon};

use crate::error::EditError;
use crate::geometry::split::split_ring;
use crate::geometry::validity::is_valid_polygon;
use crate::geometry::{simplify_collection, to_multi_polygon, GeometryEngine};

const DEFAULT_SPLIT_PRECISION: f64 = 1e7;

/// [`GeometryEngine`] implemented with the `geo` crate.
#[derive(Debug, Copy, Clone)]
pub struct GeoEngine {
    split_precision: f64,
}

impl Default for GeoEngine {
    fn default() -> Self {
        Self {
            split_precision: DEFAULT_SPLIT_PRECISION,
        }
    }
}

impl GeoEngine {
    /// Creates an engine that snaps split coordinates to a grid of `1 / split_precision`.
    pub fn new(split_precision: f64) -> Self {
        Self { split_precision }
    }
}

impl GeometryEngine for GeoEngine {
    fn create_polygon(&self, coords: &[Coordinate]) -> Result<Polygon<f64>, EditError> {
        if coords.len() < 3 {
            return Err(EditError::Geometry(format!(
                "polygon requires at least 3 vertices, got {}",
                coords.len()
            )));
        }

        Ok(Polygon::new(LineString::from(coords.to_vec()), vec![]))
    }

    fn is_valid(&self, geometry: &Geometry<f64>) -> bool {
        match geometry {
            Geometry::Polygon(p) => is_valid_polygon(p),
            Geometry::MultiPolygon(mp) => mp.iter().all(is_valid_polygon),
            Geometry::Rect(r) => r.width() > 0.0 && r.height() > 0.0,
            Geometry::Triangle(t) => is_valid_polygon(&t.to_polygon()),
            Geometry::Point(p) => p.x().is_finite() && p.y().is_finite(),
            Geometry::LineString(ls) => ls.0.windows(2).any(|w| w[0] != w[1]),
            _ => true,
        }
    }

    fn union(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>, EditError> {
        let a = to_multi_polygon(a)?;
        let b = to_multi_polygon(b)?;
        simplify_collection(BooleanOps::union(&a, &b))
    }

    fn difference(
        &self,
        a: &Geometry<f64>,
        b: &Geometry<f64>,
    ) -> Result<Geometry<f64>, EditError> {
        let a = to_multi_polygon(a)?;
        let b = to_multi_polygon(b)?;
        simplify_collection(BooleanOps::difference(&a, &b))
    }

    fn split_invalid(&self, geometry: &Geometry<f64>) -> Result<Vec<Geometry<f64>>, EditError> {
        let mut parts = vec![];
        for polygon in to_multi_polygon(geometry)? {
            let mut split: Vec<Polygon<f64>> =
                split_ring(&polygon.exterior().0, self.split_precision)?
                    .into_iter()
                    .map(|ring| Polygon::new(LineString::from(ring), vec![]))
                    .collect();

            for hole in polygon.interiors() {
                let Some(first) = hole.0.first() else {
                    continue;
                };
                match split.iter_mut().find(|p| p.contains(first)) {
                    Some(part) => part.interiors_push(hole.clone()),
                    None => log::debug!("Dropping a hole outside of the split polygon parts"),
                }
            }

            parts.extend(split.into_iter().map(Geometry::Polygon));
        }

        if parts.is_empty() {
            return Err(EditError::Geometry(
                "split produced no polygons".into(),
            ));
        }

        Ok(parts)
    }

    fn buffer(&self, geometry: &Geometry<f64>, distance: f64) -> Result<Geometry<f64>, EditError> {
        if distance != 0.0 {
            return Err(EditError::Geometry(format!(
                "buffer by {distance} is not supported"
            )));
        }

        match to_multi_polygon(geometry) {
            Ok(mp) => simplify_collection(BooleanOps::union(&mp, &MultiPolygon::new(vec![]))),
            Err(_) => Ok(geometry.clone()),
        }
    }

    fn intersects(&self, geometry: &Geometry<f64>, point: Coordinate) -> bool {
        match geometry {
            Geometry::Point(p) => p.0 == point,
            Geometry::MultiPoint(mp) => mp.iter().any(|p| p.0 == point),
            Geometry::Line(l) => l.intersects(&point),
            Geometry::LineString(ls) => ls.lines().any(|l| l.intersects(&point)),
            Geometry::MultiLineString(mls) => mls
                .iter()
                .any(|ls| ls.lines().any(|l| l.intersects(&point))),
            Geometry::GeometryCollection(gc) => gc.iter().any(|g| self.intersects(g, point)),
            polygonal => to_multi_polygon(polygonal)
                .map(|mp| mp.iter().any(|p| p.intersects(&point)))
                .unwrap_or(false),
        }
    }
}
