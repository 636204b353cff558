//! Vector layers the editing tools query and modify.
//!
//! Storage and indexing are not implemented by this crate. The host application provides
//! [`VectorLayer`] implementations for everything it displays and an [`EditableLayer`] for the
//! layer that is being edited. [`MemoryLayer`] is a simple in-memory implementation.

use async_trait::async_trait;
use fieldedit_types::{Envelope, GeometryKind, Srid};
use geo_types::Geometry;
use maybe_sync::{MaybeSend, MaybeSync};

use crate::error::EditError;
use crate::feature::{Feature, FeatureId};

pub mod memory;
pub mod spatial_engine;

pub use memory::MemoryLayer;
pub use spatial_engine::{ProjectionEngine, SpatialEngine};

/// Backing storage of a layer. Decides how query envelopes are prepared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerFormat {
    /// Spatial database table. Query envelopes are reprojected into the native reference system
    /// of the table before the query.
    SpatialDatabase,
    /// GeoPackage table. The layer accepts query envelopes in the display reference system.
    GeoPackage,
}

/// Layer that can be queried for features.
#[async_trait]
pub trait VectorLayer: MaybeSend + MaybeSync {
    /// Name of the layer (table name).
    fn name(&self) -> &str;
    /// Backing storage format.
    fn format(&self) -> LayerFormat;
    /// Whether the layer is visible. Tools only query enabled layers.
    fn is_enabled(&self) -> bool;
    /// Geometry kind declared by the layer.
    fn geometry_kind(&self) -> GeometryKind;
    /// Native reference system of the stored geometries.
    fn srid(&self) -> Srid;
    /// Returns all features intersecting the envelope.
    ///
    /// For [`LayerFormat::SpatialDatabase`] layers the envelope is in [`VectorLayer::srid`],
    /// otherwise it is in the display reference system.
    async fn features(&self, envelope: &Envelope) -> Result<Vec<Feature>, EditError>;
}

/// Layer that accepts changes from editing tools.
#[async_trait]
pub trait EditableLayer: VectorLayer {
    /// Stores a new feature. `srid` is the reference system of the given geometry.
    ///
    /// Storage that enforces unique geometries returns [`EditError::UniqueConstraint`] for
    /// duplicates.
    async fn add_feature(&self, geometry: Geometry<f64>, srid: Srid)
        -> Result<FeatureId, EditError>;
    /// Replaces the geometry of an existing feature.
    async fn update_feature_geometry(
        &self,
        feature: &Feature,
        geometry: Geometry<f64>,
        srid: Srid,
    ) -> Result<(), EditError>;
    /// Removes the features.
    async fn delete_features(&self, features: &[Feature]) -> Result<(), EditError>;
    /// Reloads the layer data after modification.
    async fn reload_data(&self) -> Result<(), EditError>;
}
