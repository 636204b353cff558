//! See [`Feature`].

use std::fmt::{Display, Formatter};

use fieldedit_types::GeometryKind;
use geo_types::Geometry;
use serde_json::{Map, Value};

/// Identifier of a feature, unique within its layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u64);

impl Display for FeatureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Record of a vector layer: identifier, geometry and attribute set.
///
/// Editing tools only ever read or replace the geometry. Attributes are carried along for the
/// host to display.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: FeatureId,
    layer: String,
    geometry: Geometry<f64>,
    attributes: Map<String, Value>,
}

impl Feature {
    /// Creates a feature without attributes.
    pub fn new(id: FeatureId, layer: impl Into<String>, geometry: Geometry<f64>) -> Self {
        Self {
            id,
            layer: layer.into(),
            geometry,
            attributes: Map::new(),
        }
    }

    /// Sets the attribute set.
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns a copy of the feature with a replaced geometry.
    pub fn with_geometry(&self, geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            ..self.clone()
        }
    }

    /// Identifier.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Name of the layer the feature belongs to.
    pub fn layer_name(&self) -> &str {
        &self.layer
    }

    /// Geometry in the reference system of the layer.
    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    /// Attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Kind of the geometry.
    pub fn kind(&self) -> GeometryKind {
        GeometryKind::of(&self.geometry)
    }

    /// Number of simple geometries the feature geometry consists of.
    pub fn part_count(&self) -> usize {
        crate::geometry::part_count(&self.geometry)
    }
}
