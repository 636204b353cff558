//! See [`GeometryKind`].

use std::fmt::{Display, Formatter};

use geo_types::Geometry;
use serde::{Deserialize, Serialize};

/// Type of geometries stored in a layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Single point.
    Point,
    /// Set of points.
    MultiPoint,
    /// Single line.
    LineString,
    /// Set of lines.
    MultiLineString,
    /// Single polygon.
    Polygon,
    /// Set of polygons.
    MultiPolygon,
    /// Heterogeneous collection.
    GeometryCollection,
}

impl GeometryKind {
    /// Kind of the given geometry.
    ///
    /// Single lines, rectangles and triangles are reported as their general counterparts.
    pub fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) => Self::Point,
            Geometry::MultiPoint(_) => Self::MultiPoint,
            Geometry::Line(_) | Geometry::LineString(_) => Self::LineString,
            Geometry::MultiLineString(_) => Self::MultiLineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => Self::Polygon,
            Geometry::MultiPolygon(_) => Self::MultiPolygon,
            Geometry::GeometryCollection(_) => Self::GeometryCollection,
        }
    }

    /// Returns true if a geometry of the `other` kind can be stored in a layer of this kind.
    ///
    /// Kinds must match exactly: a polygon layer does not accept multipolygons.
    pub fn is_compatible(&self, other: GeometryKind) -> bool {
        *self == other
    }

    /// Point or multipoint.
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point | Self::MultiPoint)
    }

    /// Line or multiline.
    pub fn is_line(&self) -> bool {
        matches!(self, Self::LineString | Self::MultiLineString)
    }

    /// Polygon or multipolygon.
    pub fn is_polygon(&self) -> bool {
        matches!(self, Self::Polygon | Self::MultiPolygon)
    }
}

impl Display for GeometryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Point => "POINT",
            Self::MultiPoint => "MULTIPOINT",
            Self::LineString => "LINESTRING",
            Self::MultiLineString => "MULTILINESTRING",
            Self::Polygon => "POLYGON",
            Self::MultiPolygon => "MULTIPOLYGON",
            Self::GeometryCollection => "GEOMETRYCOLLECTION",
        };
        f.write_str(name)
    }
}
