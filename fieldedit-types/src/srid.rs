//! See [`Srid`].

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::FieldEditTypesError;
use crate::projection::{Projection, WebMercator};
use crate::{Coordinate, Envelope};

/// Numeric identifier of a spatial reference system (EPSG code).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Srid(pub u32);

impl Srid {
    /// Geographic WGS84 coordinates, longitude and latitude in degrees.
    pub const WGS84: Srid = Srid(4326);
    /// Spherical mercator projection in meters.
    pub const WEB_MERCATOR: Srid = Srid(3857);

    /// EPSG code of the system.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Transforms a coordinate from this system into `target`.
    ///
    /// Only identity and transformations between [`Srid::WGS84`] and [`Srid::WEB_MERCATOR`]
    /// are supported.
    pub fn transform(
        &self,
        coord: Coordinate,
        target: Srid,
    ) -> Result<Coordinate, FieldEditTypesError> {
        let projection = WebMercator::default();
        let result = match (*self, target) {
            (from, to) if from == to => Some(coord),
            (Srid::WGS84, Srid::WEB_MERCATOR) => projection.project(coord),
            (Srid::WEB_MERCATOR, Srid::WGS84) => projection.unproject(coord),
            (from, to) => return Err(FieldEditTypesError::UnsupportedTransform { from, to }),
        };

        result.ok_or(FieldEditTypesError::OutOfDomain {
            x: coord.x,
            y: coord.y,
        })
    }

    /// Transforms an envelope from this system into `target`.
    ///
    /// The result is the bounding box of the transformed corners.
    pub fn transform_envelope(
        &self,
        envelope: &Envelope,
        target: Srid,
    ) -> Result<Envelope, FieldEditTypesError> {
        if *self == target {
            return Ok(*envelope);
        }

        let corners = envelope
            .corners()
            .into_iter()
            .map(|c| self.transform(c, target))
            .collect::<Result<Vec<_>, _>>()?;

        Envelope::from_coords(corners.iter()).ok_or(FieldEditTypesError::OutOfDomain {
            x: envelope.west(),
            y: envelope.south(),
        })
    }
}

impl Display for Srid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}
