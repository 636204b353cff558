//! Error type used by the crate.

use thiserror::Error;

use crate::srid::Srid;

/// Error enum.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldEditTypesError {
    /// There is no known transformation between the two reference systems.
    #[error("no transformation from {from} to {to}")]
    UnsupportedTransform {
        /// Source reference system.
        from: Srid,
        /// Target reference system.
        to: Srid,
    },
    /// Coordinate is outside of the domain of the projection.
    #[error("coordinate ({x}, {y}) cannot be projected")]
    OutOfDomain {
        /// X (or longitude) of the coordinate.
        x: f64,
        /// Y (or latitude) of the coordinate.
        y: f64,
    },
}
