use fieldedit_types::{Coordinate, GeometryKind};
use geo_types::{Geometry, LineString};

use crate::control::{EventPropagation, PointerEvent};
use crate::error::EditError;
use crate::group::{
    unexpected, GroupContext, GroupKind, GroupResponse, PaletteButton, PaletteEntry, ToolGroup,
};
use crate::messenger::Notice;
use crate::overlay::{OverlayShape, OverlayStyle};
use crate::task::{Outcome, Task};
use crate::view::MapView;

const SELF_INTERSECTION: &str =
    "The polygon intersects itself. It will be split into valid polygons on commit.";
const UNIQUE_VIOLATION: &str = "A feature with this geometry already exists.";

/// How new vertices are added besides the add-vertex button. Only one mode is on at a time.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum VertexInputMode {
    /// Vertices are only added with buttons.
    #[default]
    Manual,
    /// Every GPS fix is added as a vertex.
    GpsStream,
    /// Tapping the map adds a vertex.
    Tap,
}

/// Polygon or line creation.
///
/// Vertices are collected in order until the feature is committed. Committing needs at least
/// three vertices for a polygon and two for a line. Undo removes the last vertex, and with no
/// vertices left returns to the main palette.
#[derive(Debug, Clone)]
pub struct CreateFeatureGroup {
    kind: GeometryKind,
    vertices: Vec<Coordinate>,
    shape: Option<Geometry<f64>>,
    mode: VertexInputMode,
    invalid_reported: bool,
}

impl CreateFeatureGroup {
    /// Creates an empty group for a layer of the given kind. Line kinds create lines, every
    /// other kind creates polygons.
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            vertices: vec![],
            shape: None,
            mode: VertexInputMode::default(),
            invalid_reported: false,
        }
    }

    /// Kind of the layer the features are created in.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Vertices added so far, in display coordinates.
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Current vertex input mode.
    pub fn input_mode(&self) -> VertexInputMode {
        self.mode
    }

    /// Geometry built from the current vertices, once there are enough of them.
    pub fn preview(&self) -> Option<&Geometry<f64>> {
        self.shape.as_ref()
    }

    fn min_vertices(&self) -> usize {
        if self.kind.is_line() {
            2
        } else {
            3
        }
    }

    fn can_commit(&self) -> bool {
        self.vertices.len() >= self.min_vertices()
    }

    pub(super) fn palette(&self) -> Vec<PaletteEntry> {
        let mut palette = vec![
            PaletteEntry::new(PaletteButton::AddVertex, false),
            PaletteEntry::new(
                PaletteButton::GpsStream,
                self.mode == VertexInputMode::GpsStream,
            ),
            PaletteEntry::new(
                PaletteButton::AddVertexByTap,
                self.mode == VertexInputMode::Tap,
            ),
            PaletteEntry::new(PaletteButton::Undo, false),
        ];

        if self.can_commit() {
            palette.push(PaletteEntry::new(PaletteButton::Commit, false));
        }

        palette
    }

    pub(super) fn press(&mut self, button: PaletteButton, ctx: &GroupContext) -> GroupResponse {
        match button {
            PaletteButton::AddVertex => {
                self.mode = VertexInputMode::Manual;
                self.add_vertex(ctx.view.center(), ctx)
            }
            PaletteButton::GpsStream => {
                if self.mode == VertexInputMode::Tap {
                    self.mode = VertexInputMode::Manual;
                }
                self.add_gps_fix(ctx)
            }
            PaletteButton::AddVertexByTap => {
                self.mode = match self.mode {
                    VertexInputMode::Tap => VertexInputMode::Manual,
                    _ => VertexInputMode::Tap,
                };
                GroupResponse::redraw()
            }
            PaletteButton::Undo => {
                if self.vertices.pop().is_none() {
                    return GroupResponse::switch(ToolGroup::for_edit_layer(ctx.edit_layer));
                }

                self.rebuild_shape(ctx)
            }
            PaletteButton::Commit => self.commit(ctx),
            other => {
                log::debug!("{other:?} is not available while creating a feature");
                GroupResponse::none()
            }
        }
    }

    pub(super) fn long_press(
        &mut self,
        button: PaletteButton,
        ctx: &GroupContext,
    ) -> GroupResponse {
        match button {
            PaletteButton::GpsStream => {
                self.mode = match self.mode {
                    VertexInputMode::GpsStream => VertexInputMode::Manual,
                    _ => VertexInputMode::GpsStream,
                };
                log::debug!("Vertex input mode: {:?}", self.mode);
                GroupResponse::redraw()
            }
            other => self.press(other, ctx),
        }
    }

    pub(super) fn gps_update(&mut self, fix: Coordinate, ctx: &GroupContext) -> GroupResponse {
        if self.mode == VertexInputMode::GpsStream {
            self.add_vertex(fix, ctx)
        } else {
            GroupResponse::none()
        }
    }

    pub(super) fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        ctx: &GroupContext,
    ) -> (EventPropagation, GroupResponse) {
        if self.mode != VertexInputMode::Tap {
            return (EventPropagation::Propagate, GroupResponse::none());
        }

        let PointerEvent::Down(position) = event else {
            return (EventPropagation::Consume, GroupResponse::none());
        };

        let response = match ctx.view.screen_to_map(*position) {
            Some(coord) => self.add_vertex(coord, ctx),
            None => {
                log::warn!("Tap at {position:?} is outside of the map");
                GroupResponse::none()
            }
        };

        (EventPropagation::Consume, response)
    }

    fn add_gps_fix(&mut self, ctx: &GroupContext) -> GroupResponse {
        match ctx.gps_fix {
            Some(fix) => self.add_vertex(fix, ctx),
            None => GroupResponse::notice(Notice::Warning(EditError::NoGpsFix.to_string())),
        }
    }

    fn add_vertex(&mut self, coord: Coordinate, ctx: &GroupContext) -> GroupResponse {
        self.vertices.push(coord);
        self.rebuild_shape(ctx)
    }

    fn rebuild_shape(&mut self, ctx: &GroupContext) -> GroupResponse {
        self.shape = None;
        if !self.can_commit() {
            return GroupResponse::redraw();
        }

        if self.kind.is_line() {
            self.shape = Some(Geometry::LineString(LineString::from(self.vertices.clone())));
            return GroupResponse::redraw();
        }

        let polygon = match ctx.geometry.create_polygon(&self.vertices) {
            Ok(polygon) => polygon,
            Err(err) => {
                log::error!("Failed to build polygon: {err}");
                return GroupResponse::redraw();
            }
        };

        let polygon = Geometry::Polygon(polygon);
        let mut response = GroupResponse::redraw();
        if !self.invalid_reported && !ctx.geometry.is_valid(&polygon) {
            self.invalid_reported = true;
            response = response.with_notice(Notice::Warning(SELF_INTERSECTION.into()));
        }

        self.shape = Some(polygon);
        response
    }

    fn commit(&mut self, ctx: &GroupContext) -> GroupResponse {
        if !self.can_commit() {
            return GroupResponse::none();
        }
        let Some(layer) = ctx.edit_layer else {
            return GroupResponse::notice(Notice::Error(EditError::NoEditLayer.to_string()));
        };

        GroupResponse::task(Task::CommitNewFeatures {
            layer: layer.clone(),
            kind: self.kind,
            vertices: self.vertices.clone(),
            srid: ctx.config.display_srid(),
        })
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.shape = None;
        self.invalid_reported = false;
    }

    pub(super) fn on_outcome(&mut self, outcome: Outcome) -> GroupResponse {
        match outcome {
            Outcome::FeaturesAdded(Ok(ids)) => {
                log::info!("Stored {} new features", ids.len());
                self.clear();
                GroupResponse::notice(Notice::Toast("Geometry saved".into()))
            }
            Outcome::FeaturesAdded(Err(EditError::UniqueConstraint(reason))) => {
                log::debug!("Unique constraint violated: {reason}");
                self.clear();
                GroupResponse::notice(Notice::Warning(UNIQUE_VIOLATION.into()))
            }
            Outcome::FeaturesAdded(Err(err @ EditError::TaskFailed(_))) => {
                GroupResponse::notice(Notice::Error(err.to_string()))
            }
            Outcome::FeaturesAdded(Err(err)) => {
                log::error!("Failed to store new features: {err}");
                GroupResponse::none()
            }
            other => unexpected(GroupKind::CreateFeature, other),
        }
    }

    pub(super) fn overlay(&self, view: &MapView) -> Vec<OverlayShape> {
        let mut shapes = vec![];
        if let Some(shape) = &self.shape {
            shapes.extend(OverlayShape::geometry(
                shape,
                view.srid(),
                view,
                OverlayStyle::Created,
            ));
        }

        let points: Vec<_> = self
            .vertices
            .iter()
            .filter_map(|c| view.map_to_screen(*c))
            .collect();

        if let (None, [a, b]) = (&self.shape, points.as_slice()) {
            shapes.push(OverlayShape::Segment(*a, *b));
        }

        shapes.extend(points.into_iter().map(OverlayShape::Vertex));
        shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestContext;
    use assert_matches::assert_matches;

    #[test]
    fn input_modes_are_exclusive() {
        let test = TestContext::polygon_layer();
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::Polygon);

        group.long_press(PaletteButton::GpsStream, &ctx);
        assert_eq!(group.input_mode(), VertexInputMode::GpsStream);

        group.press(PaletteButton::AddVertexByTap, &ctx);
        assert_eq!(group.input_mode(), VertexInputMode::Tap);

        group.long_press(PaletteButton::GpsStream, &ctx);
        assert_eq!(group.input_mode(), VertexInputMode::GpsStream);

        group.press(PaletteButton::AddVertex, &ctx);
        assert_eq!(group.input_mode(), VertexInputMode::Manual);

        let active: Vec<_> = group.palette().into_iter().filter(|e| e.active).collect();
        assert!(active.is_empty());
    }

    #[test]
    fn gps_press_without_fix_warns() {
        let test = TestContext::polygon_layer();
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::Polygon);

        let response = group.press(PaletteButton::GpsStream, &ctx);
        assert_eq!(
            response.notices,
            vec![Notice::Warning("no GPS coordinate acquired yet".into())]
        );
        assert!(group.vertices().is_empty());
    }

    #[test]
    fn commit_requires_three_vertices() {
        let test = TestContext::polygon_layer();
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::Polygon);

        group.press(PaletteButton::AddVertex, &ctx);
        group.press(PaletteButton::AddVertex, &ctx);
        assert!(!group.palette().iter().any(|e| e.button == PaletteButton::Commit));
        assert!(group.press(PaletteButton::Commit, &ctx).task.is_none());

        group.press(PaletteButton::AddVertex, &ctx);
        assert!(group.palette().iter().any(|e| e.button == PaletteButton::Commit));
        let Some(Task::CommitNewFeatures { vertices, .. }) =
            group.press(PaletteButton::Commit, &ctx).task
        else {
            panic!("expected a commit task");
        };
        assert_eq!(vertices.len(), 3);
    }

    #[test]
    fn undo_on_empty_list_leaves_create_mode() {
        let test = TestContext::polygon_layer();
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::Polygon);

        group.press(PaletteButton::AddVertex, &ctx);
        let response = group.press(PaletteButton::Undo, &ctx);
        assert!(response.switch_to.is_none());
        assert!(group.vertices().is_empty());

        let response = group.press(PaletteButton::Undo, &ctx);
        assert_matches!(response.switch_to, Some(ToolGroup::MainEditing(_)));
    }

    #[test]
    fn self_intersection_is_reported_once() {
        let test = TestContext::polygon_layer();
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::Polygon);

        group.mode = VertexInputMode::GpsStream;

        let mut warnings = 0;
        for (x, y) in [(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (1.0, 3.0), (0.5, -1.0)] {
            let response = group.gps_update(Coordinate { x, y }, &ctx);
            warnings += response.notices.len();
        }

        assert_eq!(group.vertices().len(), 6);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn failed_commit_keeps_vertices() {
        let test = TestContext::polygon_layer();
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::Polygon);
        for _ in 0..3 {
            group.press(PaletteButton::AddVertex, &ctx);
        }

        let response =
            group.on_outcome(Outcome::FeaturesAdded(Err(EditError::Storage("disk full".into()))));
        assert!(response.notices.is_empty());
        assert_eq!(group.vertices().len(), 3);

        let response = group.on_outcome(Outcome::FeaturesAdded(Err(
            EditError::UniqueConstraint("duplicate".into()),
        )));
        assert_eq!(response.notices.len(), 1);
        assert!(group.vertices().is_empty());
    }

    #[test]
    fn self_intersection_is_reported_again_after_commit() {
        let test = TestContext::polygon_layer();
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::Polygon);
        group.mode = VertexInputMode::GpsStream;

        let bowtie = [(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)];
        let warnings = |group: &mut CreateFeatureGroup| {
            bowtie
                .iter()
                .map(|&(x, y)| group.gps_update(Coordinate { x, y }, &ctx).notices.len())
                .sum::<usize>()
        };

        assert_eq!(warnings(&mut group), 1);
        group.on_outcome(Outcome::FeaturesAdded(Ok(vec![])));
        assert!(group.vertices().is_empty());
        assert_eq!(warnings(&mut group), 1);
    }

    #[test]
    fn line_needs_two_vertices() {
        let test = TestContext::with_layer_kind(GeometryKind::LineString);
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::LineString);

        group.press(PaletteButton::AddVertex, &ctx);
        assert!(group.preview().is_none());
        assert!(group.press(PaletteButton::Commit, &ctx).task.is_none());

        group.mode = VertexInputMode::GpsStream;
        group.gps_update(Coordinate { x: 2.0, y: 1.0 }, &ctx);
        assert_matches!(group.preview(), Some(Geometry::LineString(line)) if line.0.len() == 2);

        let shapes = group.overlay(ctx.view);
        assert!(!shapes.iter().any(|s| matches!(s, OverlayShape::Segment(..))));
        assert_eq!(
            shapes.iter().filter(|s| matches!(s, OverlayShape::Vertex(_))).count(),
            2
        );

        let Some(Task::CommitNewFeatures { kind, vertices, .. }) =
            group.press(PaletteButton::Commit, &ctx).task
        else {
            panic!("expected a commit task");
        };
        assert_eq!(kind, GeometryKind::LineString);
        assert_eq!(vertices.len(), 2);
    }

    #[test]
    fn crossing_line_is_not_reported() {
        let test = TestContext::with_layer_kind(GeometryKind::LineString);
        let ctx = test.group_context();
        let mut group = CreateFeatureGroup::new(GeometryKind::LineString);
        group.mode = VertexInputMode::GpsStream;

        let mut warnings = 0;
        for (x, y) in [(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)] {
            warnings += group.gps_update(Coordinate { x, y }, &ctx).notices.len();
        }

        assert_eq!(warnings, 0);
        assert_eq!(group.vertices().len(), 4);
    }
}
