use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use fieldedit_types::{Coordinate, Envelope, GeometryKind, Size, Srid};
use geo_types::{coord, Geometry, Polygon, Rect};
use parking_lot::Mutex;

use crate::config::EditingConfig;
use crate::error::EditError;
use crate::feature::Feature;
use crate::geometry::{GeoEngine, GeometryEngine};
use crate::group::GroupContext;
use crate::layer::{EditableLayer, LayerFormat, MemoryLayer, VectorLayer};
use crate::messenger::{Messenger, Notice};
use crate::view::MapView;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<f64> {
    Geometry::Polygon(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon())
}

pub fn square(x: f64, y: f64, size: f64) -> Geometry<f64> {
    rect(x, y, x + size, y + size)
}

/// 800x600 px view at zoom 8 around (1.5, 1) in WGS84.
pub fn test_view() -> MapView {
    MapView::new(coord! { x: 1.5, y: 1.0 }, 8.0, Srid::WGS84).with_size(Size::new(800.0, 600.0))
}

pub struct FailingLayer {
    name: String,
}

impl FailingLayer {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl VectorLayer for FailingLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> LayerFormat {
        LayerFormat::SpatialDatabase
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::Polygon
    }

    fn srid(&self) -> Srid {
        Srid::WGS84
    }

    async fn features(&self, _envelope: &Envelope) -> Result<Vec<Feature>, EditError> {
        Err(EditError::Query(format!("table {} is locked", self.name)))
    }
}

#[derive(Default)]
pub struct CountingEngine {
    inner: GeoEngine,
    failing_split: AtomicBool,
    panicking_union: AtomicBool,
    split_calls: AtomicUsize,
    buffer_calls: AtomicUsize,
}

impl CountingEngine {
    pub fn with_failing_split(self) -> Self {
        self.failing_split.store(true, Ordering::Relaxed);
        self
    }

    pub fn with_panicking_union(self) -> Self {
        self.panicking_union.store(true, Ordering::Relaxed);
        self
    }

    pub fn split_calls(&self) -> usize {
        self.split_calls.load(Ordering::Relaxed)
    }

    pub fn buffer_calls(&self) -> usize {
        self.buffer_calls.load(Ordering::Relaxed)
    }
}

impl GeometryEngine for CountingEngine {
    fn create_polygon(&self, coords: &[Coordinate]) -> Result<Polygon<f64>, EditError> {
        self.inner.create_polygon(coords)
    }

    fn is_valid(&self, geometry: &Geometry<f64>) -> bool {
        self.inner.is_valid(geometry)
    }

    fn union(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>, EditError> {
        if self.panicking_union.load(Ordering::Relaxed) {
            panic!("sweep line failed");
        }

        self.inner.union(a, b)
    }

    fn difference(
        &self,
        a: &Geometry<f64>,
        b: &Geometry<f64>,
    ) -> Result<Geometry<f64>, EditError> {
        self.inner.difference(a, b)
    }

    fn split_invalid(&self, geometry: &Geometry<f64>) -> Result<Vec<Geometry<f64>>, EditError> {
        self.split_calls.fetch_add(1, Ordering::Relaxed);
        if self.failing_split.load(Ordering::Relaxed) {
            return Err(EditError::Geometry("split failed".into()));
        }

        self.inner.split_invalid(geometry)
    }

    fn buffer(&self, geometry: &Geometry<f64>, _distance: f64) -> Result<Geometry<f64>, EditError> {
        self.buffer_calls.fetch_add(1, Ordering::Relaxed);
        Ok(geometry.clone())
    }

    fn intersects(&self, geometry: &Geometry<f64>, point: Coordinate) -> bool {
        self.inner.intersects(geometry, point)
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    notices: Mutex<Vec<Notice>>,
    redraws: AtomicUsize,
}

impl RecordingMessenger {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::Relaxed)
    }
}

impl Messenger for RecordingMessenger {
    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::Relaxed);
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Session state for testing tool groups without a session.
pub struct TestContext {
    pub view: MapView,
    pub config: EditingConfig,
    pub edit_layer: Option<Arc<dyn EditableLayer>>,
    pub layers: Vec<Arc<dyn VectorLayer>>,
    pub geometry: GeoEngine,
    pub gps_fix: Option<Coordinate>,
}

impl TestContext {
    pub fn polygon_layer() -> Self {
        Self::with_layer_kind(GeometryKind::Polygon)
    }

    pub fn with_layer_kind(kind: GeometryKind) -> Self {
        let layer = Arc::new(MemoryLayer::new("parcels", kind, Srid::WGS84));

        Self {
            view: test_view(),
            config: EditingConfig::default(),
            edit_layer: Some(layer.clone()),
            layers: vec![layer],
            geometry: GeoEngine::default(),
            gps_fix: None,
        }
    }

    pub fn group_context(&self) -> GroupContext<'_> {
        GroupContext {
            view: &self.view,
            config: &self.config,
            edit_layer: self.edit_layer.as_ref(),
            layers: &self.layers,
            geometry: &self.geometry,
            gps_fix: self.gps_fix,
        }
    }
}
