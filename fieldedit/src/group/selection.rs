use std::sync::Arc;

use fieldedit_types::{GeometryKind, Srid};

use crate::error::EditError;
use crate::feature::Feature;
use crate::group::{
    unexpected, GroupContext, GroupKind, GroupResponse, PaletteButton, PaletteEntry, ToolGroup,
};
use crate::layer::{EditableLayer, VectorLayer};
use crate::messenger::Notice;
use crate::overlay::{OverlayShape, OverlayStyle};
use crate::task::{Outcome, Task};
use crate::view::MapView;

/// Operations on features selected with the selection tool.
///
/// The delete button enters the delete preview, commit then removes the selected features. Undo
/// leaves the delete preview, or drops the selection and returns to the main palette.
#[derive(Debug, Clone)]
pub struct SelectionGroup {
    kind: GeometryKind,
    features: Vec<Feature>,
    srid: Srid,
    delete_preview: bool,
}

impl SelectionGroup {
    /// Creates a group for features of the given kind. Multi geometries are grouped with their
    /// single counterparts.
    ///
    /// Returns `None` for geometry collections.
    pub fn new(
        kind: GeometryKind,
        features: Vec<Feature>,
        edit_layer: Option<&Arc<dyn EditableLayer>>,
    ) -> Option<Self> {
        let kind = if kind.is_point() {
            GeometryKind::Point
        } else if kind.is_line() {
            GeometryKind::LineString
        } else if kind.is_polygon() {
            GeometryKind::Polygon
        } else {
            return None;
        };

        Some(Self {
            kind,
            features,
            srid: edit_layer.map(|l| l.srid()).unwrap_or(Srid::WGS84),
            delete_preview: false,
        })
    }

    /// Point, line string or polygon.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Selected features.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Replaces the selection.
    pub fn set_selected_features(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    /// Total number of simple geometries of the selected features.
    pub fn part_count(&self) -> usize {
        self.features.iter().map(Feature::part_count).sum()
    }

    /// Returns true if the selected features are marked for deletion.
    pub fn is_delete_preview(&self) -> bool {
        self.delete_preview
    }

    pub(super) fn palette(&self) -> Vec<PaletteEntry> {
        let mut palette = vec![
            PaletteEntry::new(PaletteButton::Delete, self.delete_preview),
            PaletteEntry::new(PaletteButton::Undo, false),
        ];

        if self.delete_preview {
            palette.push(PaletteEntry::new(PaletteButton::Commit, false));
        }

        palette
    }

    pub(super) fn press(&mut self, button: PaletteButton, ctx: &GroupContext) -> GroupResponse {
        match button {
            PaletteButton::Delete if !self.features.is_empty() => {
                self.delete_preview = true;
                GroupResponse::redraw()
            }
            PaletteButton::Undo if self.delete_preview => {
                self.delete_preview = false;
                GroupResponse::redraw()
            }
            PaletteButton::Undo => {
                self.features.clear();
                GroupResponse::switch(ToolGroup::for_edit_layer(ctx.edit_layer))
            }
            PaletteButton::Commit if self.delete_preview => {
                let Some(layer) = ctx.edit_layer else {
                    return GroupResponse::notice(Notice::Error(EditError::NoEditLayer.to_string()));
                };

                GroupResponse::task(Task::DeleteFeatures {
                    layer: layer.clone(),
                    features: self.features.clone(),
                })
            }
            other => {
                log::debug!("{other:?} is not available in the selection");
                GroupResponse::none()
            }
        }
    }

    pub(super) fn on_outcome(&mut self, outcome: Outcome, ctx: &GroupContext) -> GroupResponse {
        match outcome {
            Outcome::FeaturesDeleted(Ok(count)) => {
                self.features.clear();
                self.delete_preview = false;
                GroupResponse::switch(ToolGroup::for_edit_layer(ctx.edit_layer))
                    .with_notice(Notice::Toast(format!("Deleted {count} features")))
            }
            Outcome::FeaturesDeleted(Err(err)) => {
                log::error!("Failed to delete features: {err}");
                GroupResponse::notice(Notice::Error(err.to_string()))
            }
            other => unexpected(GroupKind::Selection(self.kind), other),
        }
    }

    pub(super) fn overlay(&self, view: &MapView) -> Vec<OverlayShape> {
        let style = if self.delete_preview {
            OverlayStyle::DeletePreview
        } else {
            OverlayStyle::Selected
        };

        self.features
            .iter()
            .filter_map(|f| OverlayShape::geometry(f.geometry(), self.srid, view, style))
            .collect()
    }
}
