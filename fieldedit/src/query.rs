//! Spatial query gateway: collects features intersecting an envelope from a set of layers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fieldedit_types::{Envelope, Srid};

use crate::error::EditError;
use crate::feature::Feature;
use crate::layer::{LayerFormat, SpatialEngine, VectorLayer};

/// Cancellation flag shared between the interaction thread and a background query.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a new, not cancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Result of a spatial query.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    /// Features in layer order, then in the order each layer returned them.
    pub features: Vec<Feature>,
    /// Number of layers that were queried successfully.
    pub layers_queried: usize,
    /// Names of the layers whose query failed.
    pub layers_failed: Vec<String>,
}

/// Executes range queries over enabled layers.
///
/// The query envelope is given in the display reference system. A failure of a single layer is
/// logged and the layer is skipped. The cancellation flag is checked before every layer.
#[derive(Clone)]
pub struct SpatialQuery {
    engine: Arc<dyn SpatialEngine>,
    display_srid: Srid,
    cancel: CancelFlag,
}

impl SpatialQuery {
    /// Creates a new query.
    pub fn new(engine: Arc<dyn SpatialEngine>, display_srid: Srid, cancel: CancelFlag) -> Self {
        Self {
            engine,
            display_srid,
            cancel,
        }
    }

    /// Cancellation flag of the query.
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Queries all enabled layers.
    ///
    /// Returns [`EditError::Cancelled`] if cancellation was requested before all layers were
    /// processed.
    pub async fn run<L: VectorLayer + ?Sized>(
        &self,
        layers: &[Arc<L>],
        envelope: Envelope,
    ) -> Result<QueryOutcome, EditError> {
        let mut outcome = QueryOutcome::default();
        for layer in layers.iter().filter(|l| l.is_enabled()) {
            if self.cancel.is_cancelled() {
                log::debug!("Query cancelled before layer {}", layer.name());
                return Err(EditError::Cancelled);
            }

            match self.query_layer(layer.as_ref(), &envelope).await {
                Ok(features) => {
                    log::trace!("Layer {} returned {} features", layer.name(), features.len());
                    outcome.features.extend(features);
                    outcome.layers_queried += 1;
                }
                Err(err) => {
                    log::warn!("Query of layer {} failed: {err}", layer.name());
                    outcome.layers_failed.push(layer.name().to_string());
                }
            }
        }

        Ok(outcome)
    }

    async fn query_layer<L: VectorLayer + ?Sized>(
        &self,
        layer: &L,
        envelope: &Envelope,
    ) -> Result<Vec<Feature>, EditError> {
        let envelope = match layer.format() {
            LayerFormat::SpatialDatabase => {
                self.engine
                    .reproject(envelope, self.display_srid, layer.srid())?
            }
            LayerFormat::GeoPackage => *envelope,
        };

        layer.features(&envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{MemoryLayer, ProjectionEngine};
    use crate::tests::{square, FailingLayer};
    use assert_matches::assert_matches;
    use fieldedit_types::GeometryKind;

    fn query() -> SpatialQuery {
        SpatialQuery::new(Arc::new(ProjectionEngine), Srid::WGS84, CancelFlag::new())
    }

    #[tokio::test]
    async fn failing_layer_is_skipped() {
        let layers: Vec<Arc<dyn VectorLayer>> = vec![
            Arc::new(MemoryLayer::new("a", GeometryKind::Polygon, Srid::WGS84)
                .with_geometries([square(0.0, 0.0, 1.0)])),
            Arc::new(FailingLayer::new("broken")),
            Arc::new(MemoryLayer::new("b", GeometryKind::Polygon, Srid::WGS84)
                .with_geometries([square(0.5, 0.5, 1.0), square(9.0, 9.0, 1.0)])),
        ];

        let outcome = query()
            .run(&layers, Envelope::new(0.0, 0.0, 1.0, 1.0))
            .await
            .expect("query");
        assert_eq!(outcome.features.len(), 2);
        assert_eq!(outcome.layers_queried, 2);
        assert_eq!(outcome.layers_failed, vec!["broken".to_string()]);
    }

    #[tokio::test]
    async fn disabled_layers_are_not_queried() {
        let hidden = MemoryLayer::new("hidden", GeometryKind::Polygon, Srid::WGS84)
            .with_geometries([square(0.0, 0.0, 1.0)]);
        hidden.set_enabled(false);
        let layers = vec![Arc::new(hidden)];

        let outcome = query()
            .run(&layers, Envelope::new(0.0, 0.0, 1.0, 1.0))
            .await
            .expect("query");
        assert!(outcome.features.is_empty());
        assert_eq!(outcome.layers_queried, 0);
    }

    #[tokio::test]
    async fn cancelled_query() {
        let query = query();
        query.cancel_flag().cancel();
        let layers = vec![Arc::new(MemoryLayer::new("a", GeometryKind::Polygon, Srid::WGS84))];

        let result = query.run(&layers, Envelope::new(0.0, 0.0, 1.0, 1.0)).await;
        assert_matches!(result, Err(EditError::Cancelled));
    }

    #[tokio::test]
    async fn envelope_is_reprojected_for_database_layers() {
        let mercator = MemoryLayer::new("mercator", GeometryKind::Polygon, Srid::WEB_MERCATOR)
            .with_geometries([square(100_000.0, 100_000.0, 10_000.0)]);
        let layers = vec![Arc::new(mercator)];

        // Roughly 0.9..1.0 degrees covers 100..110 km from the origin.
        let outcome = query()
            .run(&layers, Envelope::new(0.9, 0.9, 1.0, 1.0))
            .await
            .expect("query");
        assert_eq!(outcome.features.len(), 1);
    }

    #[tokio::test]
    async fn geopackage_layers_receive_display_envelope() {
        let layer = MemoryLayer::new("gpkg", GeometryKind::Polygon, Srid::WEB_MERCATOR)
            .with_format(LayerFormat::GeoPackage)
            .with_geometries([square(0.5, 0.5, 0.1)]);
        let layers = vec![Arc::new(layer)];

        let outcome = query()
            .run(&layers, Envelope::new(0.0, 0.0, 1.0, 1.0))
            .await
            .expect("query");
        assert_eq!(outcome.features.len(), 1);
    }
}
