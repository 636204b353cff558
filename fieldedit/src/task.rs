//! Background operations started by tools and tool groups.
//!
//! A [`Task`] is executed on the async runtime. Its [`Outcome`] is sent back to the session,
//! which applies it on the interaction thread. Errors never cross that boundary as panics: every
//! failure is a value inside the outcome.

use std::sync::Arc;

use fieldedit_types::{Coordinate, Envelope, GeometryKind, Srid};
use geo_types::{Geometry, LineString};

use crate::error::EditError;
use crate::feature::{Feature, FeatureId};
use crate::geometry::{cast_to_kind, GeometryEngine};
use crate::layer::{EditableLayer, SpatialEngine, VectorLayer};
use crate::query::{QueryOutcome, SpatialQuery};

/// Result of a cut or extend gesture waiting for commit or undo.
#[derive(Debug, Clone, PartialEq)]
pub struct CutExtendPair {
    processed: Feature,
    remove: Feature,
    srid: Srid,
}

impl CutExtendPair {
    /// Start feature with the combined geometry.
    pub fn processed(&self) -> &Feature {
        &self.processed
    }

    /// End feature, which is deleted on commit.
    pub fn remove(&self) -> &Feature {
        &self.remove
    }

    /// Reference system of both geometries.
    pub fn srid(&self) -> Srid {
        self.srid
    }

    /// The uncommitted combined geometry.
    pub fn preview(&self) -> &Geometry<f64> {
        self.processed.geometry()
    }
}

/// Description of the running background operation for a progress indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Short title.
    pub title: String,
    /// What is being done.
    pub message: String,
    /// Whether [`EditingSession::cancel_progress`](crate::EditingSession::cancel_progress) has
    /// any effect.
    pub cancellable: bool,
}

impl Progress {
    fn new(title: &str, message: &str, cancellable: bool) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            cancellable,
        }
    }
}

pub(crate) enum Task {
    Info {
        layers: Vec<Arc<dyn VectorLayer>>,
        envelope: Envelope,
    },
    Select {
        layer: Arc<dyn EditableLayer>,
        envelope: Envelope,
    },
    CutExtend {
        layer: Arc<dyn EditableLayer>,
        envelope: Envelope,
        start: Coordinate,
        end: Coordinate,
        cut: bool,
    },
    CommitNewFeatures {
        layer: Arc<dyn EditableLayer>,
        kind: GeometryKind,
        vertices: Vec<Coordinate>,
        srid: Srid,
    },
    CommitCutExtend {
        layer: Arc<dyn EditableLayer>,
        pair: CutExtendPair,
    },
    DeleteFeatures {
        layer: Arc<dyn EditableLayer>,
        features: Vec<Feature>,
    },
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Info(Result<QueryOutcome, EditError>),
    Selected(Result<Vec<Feature>, EditError>),
    CutExtend(Result<CutExtendPair, EditError>),
    FeaturesAdded(Result<Vec<FeatureId>, EditError>),
    CutExtendCommitted(Result<(), EditError>),
    FeaturesDeleted(Result<usize, EditError>),
}

#[derive(Debug)]
pub(crate) struct Completion {
    pub generation: u64,
    pub outcome: Outcome,
}

pub(crate) struct TaskContext {
    pub query: SpatialQuery,
    pub geometry: Arc<dyn GeometryEngine>,
    pub spatial: Arc<dyn SpatialEngine>,
    pub display_srid: Srid,
}

impl Task {
    pub fn progress(&self) -> Progress {
        match self {
            Task::Info { .. } => Progress::new("INFO", "Extracting information...", true),
            Task::Select { .. } => Progress::new("SELECT", "Selecting features...", true),
            Task::CutExtend { cut: true, .. } => {
                Progress::new("CUT", "Looking for the features to cut...", true)
            }
            Task::CutExtend { cut: false, .. } => {
                Progress::new("EXTEND", "Looking for the features to merge...", true)
            }
            Task::CommitNewFeatures { .. } | Task::CommitCutExtend { .. } => {
                Progress::new("COMMIT", "Saving features...", false)
            }
            Task::DeleteFeatures { .. } => Progress::new("DELETE", "Deleting features...", false),
        }
    }

    /// Builds the outcome reporting that the task failed before producing a result.
    pub fn failure(&self) -> fn(EditError) -> Outcome {
        match self {
            Task::Info { .. } => |err| Outcome::Info(Err(err)),
            Task::Select { .. } => |err| Outcome::Selected(Err(err)),
            Task::CutExtend { .. } => |err| Outcome::CutExtend(Err(err)),
            Task::CommitNewFeatures { .. } => |err| Outcome::FeaturesAdded(Err(err)),
            Task::CommitCutExtend { .. } => |err| Outcome::CutExtendCommitted(Err(err)),
            Task::DeleteFeatures { .. } => |err| Outcome::FeaturesDeleted(Err(err)),
        }
    }

    pub async fn run(self, ctx: TaskContext) -> Outcome {
        match self {
            Task::Info { layers, envelope } => {
                Outcome::Info(ctx.query.run(&layers, envelope).await)
            }
            Task::Select { layer, envelope } => Outcome::Selected(
                ctx.query
                    .run(std::slice::from_ref(&layer), envelope)
                    .await
                    .map(|outcome| outcome.features),
            ),
            Task::CutExtend {
                layer,
                envelope,
                start,
                end,
                cut,
            } => Outcome::CutExtend(cut_extend(&ctx, layer, envelope, start, end, cut).await),
            Task::CommitNewFeatures {
                layer,
                kind,
                vertices,
                srid,
            } => Outcome::FeaturesAdded(
                commit_new_features(ctx.geometry.as_ref(), layer, kind, &vertices, srid).await,
            ),
            Task::CommitCutExtend { layer, pair } => {
                Outcome::CutExtendCommitted(commit_cut_extend(layer, pair).await)
            }
            Task::DeleteFeatures { layer, features } => {
                Outcome::FeaturesDeleted(delete_features(layer, features).await)
            }
        }
    }
}

async fn cut_extend(
    ctx: &TaskContext,
    layer: Arc<dyn EditableLayer>,
    envelope: Envelope,
    start: Coordinate,
    end: Coordinate,
    cut: bool,
) -> Result<CutExtendPair, EditError> {
    let features = ctx
        .query
        .run(std::slice::from_ref(&layer), envelope)
        .await?
        .features;

    let srid = layer.srid();
    let start = ctx
        .spatial
        .reproject_coordinate(start, ctx.display_srid, srid)?;
    let end = ctx.spatial.reproject_coordinate(end, ctx.display_srid, srid)?;

    let mut start_feature = None;
    let mut end_feature = None;
    for feature in features {
        if start_feature.is_none() && ctx.geometry.intersects(feature.geometry(), start) {
            start_feature = Some(feature);
        } else if end_feature.is_none() && ctx.geometry.intersects(feature.geometry(), end) {
            end_feature = Some(feature);
        }

        if start_feature.is_some() && end_feature.is_some() {
            break;
        }
    }

    let (Some(start_feature), Some(end_feature)) = (start_feature, end_feature) else {
        return Err(EditError::MissingFeatures);
    };

    let geometry = if cut {
        ctx.geometry
            .difference(start_feature.geometry(), end_feature.geometry())?
    } else {
        ctx.geometry
            .union(start_feature.geometry(), end_feature.geometry())?
    };

    Ok(CutExtendPair {
        processed: start_feature.with_geometry(geometry),
        remove: end_feature,
        srid,
    })
}

/// Builds the polygons to store from the pending vertices.
///
/// A valid polygon is stored as is. An invalid one is split into simple polygons. If the split
/// fails, the polygon is cleaned up with a zero buffer.
pub(crate) fn prepare_polygons(
    engine: &dyn GeometryEngine,
    vertices: &[Coordinate],
) -> Result<Vec<Geometry<f64>>, EditError> {
    let polygon = Geometry::Polygon(engine.create_polygon(vertices)?);
    if engine.is_valid(&polygon) {
        return Ok(vec![polygon]);
    }

    match engine.split_invalid(&polygon) {
        Ok(parts) if !parts.is_empty() => Ok(parts),
        Ok(_) => {
            log::warn!("Split of an invalid polygon returned nothing, buffering instead");
            Ok(vec![engine.buffer(&polygon, 0.0)?])
        }
        Err(err) => {
            log::error!("Failed to split invalid polygon: {err}");
            Ok(vec![engine.buffer(&polygon, 0.0)?])
        }
    }
}

async fn commit_new_features(
    engine: &dyn GeometryEngine,
    layer: Arc<dyn EditableLayer>,
    kind: GeometryKind,
    vertices: &[Coordinate],
    srid: Srid,
) -> Result<Vec<FeatureId>, EditError> {
    let geometries = if kind.is_line() {
        vec![Geometry::LineString(LineString::from(vertices.to_vec()))]
    } else {
        prepare_polygons(engine, vertices)?
    };

    let mut ids = Vec::with_capacity(geometries.len());
    for geometry in geometries {
        let geometry = fit_to_layer(layer.as_ref(), geometry)?;
        ids.push(layer.add_feature(geometry, srid).await?);
    }

    Ok(ids)
}

/// Converts the geometry to the kind the layer stores.
///
/// Single geometries are wrapped into collections for multi layers. Anything else must match
/// the layer kind exactly.
pub(crate) fn fit_to_layer(
    layer: &dyn EditableLayer,
    geometry: Geometry<f64>,
) -> Result<Geometry<f64>, EditError> {
    let expected = layer.geometry_kind();
    let geometry = cast_to_kind(geometry, expected);
    let actual = GeometryKind::of(&geometry);
    if expected.is_compatible(actual) {
        Ok(geometry)
    } else {
        Err(EditError::IncompatibleGeometry { expected, actual })
    }
}

async fn commit_cut_extend(
    layer: Arc<dyn EditableLayer>,
    pair: CutExtendPair,
) -> Result<(), EditError> {
    let geometry = fit_to_layer(layer.as_ref(), pair.preview().clone())?;
    layer
        .update_feature_geometry(&pair.processed, geometry, pair.srid)
        .await?;
    layer.delete_features(std::slice::from_ref(&pair.remove)).await?;
    layer.reload_data().await
}

async fn delete_features(
    layer: Arc<dyn EditableLayer>,
    features: Vec<Feature>,
) -> Result<usize, EditError> {
    layer.delete_features(&features).await?;
    layer.reload_data().await?;
    Ok(features.len())
}
