//! See [`MemoryLayer`].

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use fieldedit_types::{Envelope, GeometryKind, Srid};
use geo::BoundingRect;
use geo_types::Geometry;
use parking_lot::RwLock;

use crate::error::EditError;
use crate::feature::{Feature, FeatureId};
use crate::geometry::reproject;
use crate::layer::{EditableLayer, LayerFormat, VectorLayer};

/// Editable layer that keeps its features in memory.
///
/// Features are returned in insertion order. Geometries added or updated with a reference
/// system other than the layer's are reprojected.
pub struct MemoryLayer {
    name: String,
    format: LayerFormat,
    kind: GeometryKind,
    srid: Srid,
    unique_geometries: bool,
    enabled: AtomicBool,
    next_id: AtomicU64,
    reload_count: AtomicUsize,
    features: RwLock<Vec<Feature>>,
}

impl MemoryLayer {
    /// Creates an empty, enabled spatial database layer.
    pub fn new(name: impl Into<String>, kind: GeometryKind, srid: Srid) -> Self {
        Self {
            name: name.into(),
            format: LayerFormat::SpatialDatabase,
            kind,
            srid,
            unique_geometries: false,
            enabled: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            reload_count: AtomicUsize::new(0),
            features: RwLock::new(Vec::new()),
        }
    }

    /// Sets the storage format reported by the layer.
    pub fn with_format(mut self, format: LayerFormat) -> Self {
        self.format = format;
        self
    }

    /// Makes the layer reject geometries equal to an already stored one.
    pub fn with_unique_geometries(mut self) -> Self {
        self.unique_geometries = true;
        self
    }

    /// Adds features with the given geometries (in the layer reference system).
    pub fn with_geometries(self, geometries: impl IntoIterator<Item = Geometry<f64>>) -> Self {
        {
            let mut features = self.features.write();
            for geometry in geometries {
                let id = self.next_id();
                features.push(Feature::new(id, self.name.clone(), geometry));
            }
        }

        self
    }

    /// Shows or hides the layer.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Copy of all stored features.
    pub fn all_features(&self) -> Vec<Feature> {
        self.features.read().clone()
    }

    /// Stored feature with the given id.
    pub fn feature(&self, id: FeatureId) -> Option<Feature> {
        self.features.read().iter().find(|f| f.id() == id).cloned()
    }

    /// Number of stored features.
    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    /// Returns true if the layer has no features.
    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }

    /// How many times [`EditableLayer::reload_data`] was called.
    pub fn reload_count(&self) -> usize {
        self.reload_count.load(Ordering::Relaxed)
    }

    fn next_id(&self) -> FeatureId {
        FeatureId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn prepare_geometry(
        &self,
        geometry: Geometry<f64>,
        srid: Srid,
    ) -> Result<Geometry<f64>, EditError> {
        let actual = GeometryKind::of(&geometry);
        if !self.kind.is_compatible(actual) {
            return Err(EditError::IncompatibleGeometry {
                expected: self.kind,
                actual,
            });
        }

        reproject(&geometry, srid, self.srid)
    }
}

#[async_trait]
impl VectorLayer for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> LayerFormat {
        self.format
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn geometry_kind(&self) -> GeometryKind {
        self.kind
    }

    fn srid(&self) -> Srid {
        self.srid
    }

    async fn features(&self, envelope: &Envelope) -> Result<Vec<Feature>, EditError> {
        Ok(self
            .features
            .read()
            .iter()
            .filter(|f| {
                f.geometry()
                    .bounding_rect()
                    .is_some_and(|rect| Envelope::from(rect).intersects(envelope))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EditableLayer for MemoryLayer {
    async fn add_feature(
        &self,
        geometry: Geometry<f64>,
        srid: Srid,
    ) -> Result<FeatureId, EditError> {
        let geometry = self.prepare_geometry(geometry, srid)?;

        let mut features = self.features.write();
        if self.unique_geometries && features.iter().any(|f| *f.geometry() == geometry) {
            return Err(EditError::UniqueConstraint(format!(
                "geometry already exists in {}",
                self.name
            )));
        }

        let id = self.next_id();
        features.push(Feature::new(id, self.name.clone(), geometry));
        log::debug!("Added feature {id} to layer {}", self.name);

        Ok(id)
    }

    async fn update_feature_geometry(
        &self,
        feature: &Feature,
        geometry: Geometry<f64>,
        srid: Srid,
    ) -> Result<(), EditError> {
        let geometry = self.prepare_geometry(geometry, srid)?;

        let mut features = self.features.write();
        let Some(stored) = features.iter_mut().find(|f| f.id() == feature.id()) else {
            return Err(EditError::Storage(format!(
                "feature {} not found in {}",
                feature.id(),
                self.name
            )));
        };

        *stored = stored.with_geometry(geometry);
        Ok(())
    }

    async fn delete_features(&self, features: &[Feature]) -> Result<(), EditError> {
        self.features
            .write()
            .retain(|stored| !features.iter().any(|f| f.id() == stored.id()));
        Ok(())
    }

    async fn reload_data(&self) -> Result<(), EditError> {
        self.reload_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use geo_types::{point, polygon, MultiPolygon};

    fn square(x: f64, y: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ])
    }

    #[test]
    fn range_query_keeps_insertion_order() {
        let layer = MemoryLayer::new("parcels", GeometryKind::Polygon, Srid::WGS84)
            .with_geometries([square(5.0, 5.0), square(0.0, 0.0), square(0.5, 0.5)]);

        let found = tokio_test::block_on(layer.features(&Envelope::new(0.0, 0.0, 1.0, 1.0)))
            .expect("query");
        let ids: Vec<_> = found.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![FeatureId(2), FeatureId(3)]);
    }

    #[tokio::test]
    async fn unique_constraint() {
        let layer = MemoryLayer::new("parcels", GeometryKind::Polygon, Srid::WGS84)
            .with_unique_geometries()
            .with_geometries([square(0.0, 0.0)]);

        let result = layer.add_feature(square(0.0, 0.0), Srid::WGS84).await;
        assert_matches!(result, Err(EditError::UniqueConstraint(_)));
        assert_eq!(layer.len(), 1);

        let result = layer.add_feature(square(2.0, 0.0), Srid::WGS84).await;
        assert_matches!(result, Ok(FeatureId(2)));
    }

    #[tokio::test]
    async fn rejects_incompatible_kind() {
        let layer = MemoryLayer::new("parcels", GeometryKind::Polygon, Srid::WGS84);
        let Geometry::Polygon(p) = square(0.0, 0.0) else {
            unreachable!()
        };
        let multi = Geometry::MultiPolygon(MultiPolygon::new(vec![p]));

        assert_matches!(
            layer.add_feature(multi, Srid::WGS84).await,
            Err(EditError::IncompatibleGeometry {
                expected: GeometryKind::Polygon,
                actual: GeometryKind::MultiPolygon
            })
        );
        assert_matches!(
            layer
                .add_feature(Geometry::Point(point!(x: 0.0, y: 0.0)), Srid::WGS84)
                .await,
            Err(EditError::IncompatibleGeometry { .. })
        );
    }

    #[tokio::test]
    async fn reprojects_added_geometry() {
        let layer = MemoryLayer::new("wells", GeometryKind::Point, Srid::WEB_MERCATOR);
        let id = layer
            .add_feature(Geometry::Point(point!(x: 180.0, y: 0.0)), Srid::WGS84)
            .await
            .expect("stored");

        let stored = layer.feature(id).expect("exists");
        let Geometry::Point(p) = stored.geometry() else {
            panic!("expected a point");
        };
        approx::assert_relative_eq!(p.x(), 20037508.342789244, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn update_delete_reload() {
        let layer = MemoryLayer::new("parcels", GeometryKind::Polygon, Srid::WGS84)
            .with_geometries([square(0.0, 0.0), square(1.0, 0.0)]);
        let features = layer.all_features();

        layer
            .update_feature_geometry(&features[0], square(3.0, 3.0), Srid::WGS84)
            .await
            .expect("updated");
        layer
            .delete_features(&features[1..])
            .await
            .expect("deleted");
        layer.reload_data().await.expect("reloaded");

        assert_eq!(layer.len(), 1);
        assert_eq!(
            layer.feature(FeatureId(1)).map(|f| f.geometry().clone()),
            Some(square(3.0, 3.0))
        );
        assert_eq!(layer.reload_count(), 1);

        let missing = layer
            .update_feature_geometry(&features[1], square(0.0, 0.0), Srid::WGS84)
            .await;
        assert_matches!(missing, Err(EditError::Storage(_)));
    }
}
