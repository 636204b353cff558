use fieldedit_types::{Coordinate, Envelope, Srid};
use maybe_sync::{MaybeSend, MaybeSync};

use crate::error::EditError;

/// Coordinate transformations provided by the spatial storage engine.
pub trait SpatialEngine: MaybeSend + MaybeSync {
    /// Transforms a query envelope between reference systems.
    fn reproject(&self, envelope: &Envelope, from: Srid, to: Srid) -> Result<Envelope, EditError>;

    /// Transforms a single coordinate between reference systems.
    fn reproject_coordinate(
        &self,
        coord: Coordinate,
        from: Srid,
        to: Srid,
    ) -> Result<Coordinate, EditError>;
}

/// Engine supporting transformations between WGS84 and web mercator.
#[derive(Debug, Default, Copy, Clone)]
pub struct ProjectionEngine;

impl SpatialEngine for ProjectionEngine {
    fn reproject(&self, envelope: &Envelope, from: Srid, to: Srid) -> Result<Envelope, EditError> {
        Ok(from.transform_envelope(envelope, to)?)
    }

    fn reproject_coordinate(
        &self,
        coord: Coordinate,
        from: Srid,
        to: Srid,
    ) -> Result<Coordinate, EditError> {
        Ok(from.transform(coord, to)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn unsupported_pair_is_an_error() {
        let engine = ProjectionEngine;
        let result = engine.reproject(&Envelope::new(0.0, 0.0, 1.0, 1.0), Srid::WGS84, Srid(2056));
        assert_matches!(result, Err(EditError::Types(_)));
    }

    #[test]
    fn same_srid_is_identity() {
        let engine = ProjectionEngine;
        let envelope = Envelope::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            engine.reproject(&envelope, Srid(2056), Srid(2056)),
            Ok(envelope)
        );
    }
}
