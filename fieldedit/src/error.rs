//! Error types used by the crate.

use fieldedit_types::error::FieldEditTypesError;
use fieldedit_types::GeometryKind;
use thiserror::Error;

/// Editing error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    /// Range query against a layer failed.
    #[error("query failed: {0}")]
    Query(String),
    /// Layer failed to store the change.
    #[error("storage error: {0}")]
    Storage(String),
    /// Layer refused to store a geometry because an equal one already exists.
    #[error("unique constraint violated: {0}")]
    UniqueConstraint(String),
    /// Geometry kind does not match the kind declared by the layer.
    #[error("{actual} geometry cannot be stored in a {expected} layer")]
    IncompatibleGeometry {
        /// Kind declared by the layer.
        expected: GeometryKind,
        /// Kind of the geometry being stored.
        actual: GeometryKind,
    },
    /// Geometry operation failed.
    #[error("geometry error: {0}")]
    Geometry(String),
    /// Cut/extend gesture did not start and end on two different features.
    #[error("no feature found at the start or the end of the gesture")]
    MissingFeatures,
    /// Operation requires an editable layer, but none is set.
    #[error("no editable layer")]
    NoEditLayer,
    /// Operation requires a GPS fix, but none was received yet.
    #[error("no GPS coordinate acquired yet")]
    NoGpsFix,
    /// Operation was cancelled by the user.
    #[error("cancelled")]
    Cancelled,
    /// Background operation stopped without producing a result.
    #[error("operation failed: {0}")]
    TaskFailed(String),
    /// Another background operation is in progress.
    #[error("another operation is in progress")]
    Busy,
    /// Coordinate transformation error.
    #[error(transparent)]
    Types(#[from] FieldEditTypesError),
}
