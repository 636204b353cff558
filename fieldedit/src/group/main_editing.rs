use fieldedit_types::GeometryKind;

use crate::error::EditError;
use crate::feature::Feature;
use crate::group::{
    finish_info, toggle_info_tool, toggle_tool, unexpected, CreateFeatureGroup, GroupContext,
    GroupKind, GroupResponse, PaletteButton, PaletteEntry, SelectionGroup, ToolGroup,
};
use crate::messenger::Notice;
use crate::overlay::{OverlayShape, OverlayStyle};
use crate::task::{fit_to_layer, CutExtendPair, Outcome, Task};
use crate::tool::{Tool, ToolKind};
use crate::view::MapView;

const PREVIEW_MODE: &str = "Preview mode: commit to save the result or undo to discard it.";

/// Main palette of the editable layer.
///
/// Selection and info are always available. Cut and extend are only offered for polygon layers,
/// feature creation for polygon and line layers. A finished cut/extend gesture leaves a
/// [`CutExtendPair`] that is stored on commit or discarded on undo.
#[derive(Debug, Clone)]
pub struct MainEditingGroup {
    layer_kind: GeometryKind,
    pub(super) tool: Option<Tool>,
    pair: Option<CutExtendPair>,
}

impl MainEditingGroup {
    /// Creates the group for a layer of the given kind.
    pub fn new(layer_kind: GeometryKind) -> Self {
        Self {
            layer_kind,
            tool: None,
            pair: None,
        }
    }

    /// Pending result of the last cut/extend gesture.
    pub fn pair(&self) -> Option<&CutExtendPair> {
        self.pair.as_ref()
    }

    fn active(&self, kind: ToolKind) -> bool {
        self.tool.as_ref().map(Tool::kind) == Some(kind)
    }

    fn can_create(&self) -> bool {
        self.layer_kind.is_polygon() || self.layer_kind.is_line()
    }

    pub(super) fn palette(&self) -> Vec<PaletteEntry> {
        let mut palette = vec![];
        if self.layer_kind.is_polygon() {
            palette.push(PaletteEntry::new(PaletteButton::Cut, self.active(ToolKind::Cut)));
            palette.push(PaletteEntry::new(
                PaletteButton::Extend,
                self.active(ToolKind::Extend),
            ));
        }
        if self.can_create() {
            palette.push(PaletteEntry::new(PaletteButton::CreateFeature, false));
        }

        palette.push(PaletteEntry::new(
            PaletteButton::SelectEditable,
            self.active(ToolKind::Selection),
        ));
        palette.push(PaletteEntry::new(
            PaletteButton::SelectAll,
            self.active(ToolKind::Info),
        ));

        if self.pair.is_some() {
            palette.push(PaletteEntry::new(PaletteButton::Undo, false));
            palette.push(PaletteEntry::new(PaletteButton::Commit, false));
        }

        palette
    }

    pub(super) fn press(&mut self, button: PaletteButton, ctx: &GroupContext) -> GroupResponse {
        match button {
            PaletteButton::SelectAll => toggle_info_tool(&mut self.tool, ctx),
            PaletteButton::SelectEditable => {
                toggle_tool(&mut self.tool, ToolKind::Selection);
                GroupResponse::redraw()
            }
            PaletteButton::Cut if self.layer_kind.is_polygon() => {
                toggle_tool(&mut self.tool, ToolKind::Cut);
                GroupResponse::redraw()
            }
            PaletteButton::Extend if self.layer_kind.is_polygon() => {
                toggle_tool(&mut self.tool, ToolKind::Extend);
                GroupResponse::redraw()
            }
            PaletteButton::CreateFeature if self.can_create() => GroupResponse::switch(
                ToolGroup::CreateFeature(CreateFeatureGroup::new(self.layer_kind)),
            ),
            PaletteButton::Commit => self.commit(ctx),
            PaletteButton::Undo => {
                if self.pair.take().is_some() {
                    self.tool = None;
                    GroupResponse::redraw()
                } else {
                    GroupResponse::none()
                }
            }
            other => {
                log::debug!("{other:?} is not available for a {} layer", self.layer_kind);
                GroupResponse::none()
            }
        }
    }

    fn commit(&mut self, ctx: &GroupContext) -> GroupResponse {
        let Some(pair) = &self.pair else {
            return GroupResponse::none();
        };
        let Some(layer) = ctx.edit_layer else {
            return GroupResponse::notice(Notice::Error(EditError::NoEditLayer.to_string()));
        };

        if let Err(err) = fit_to_layer(layer.as_ref(), pair.preview().clone()) {
            log::debug!("Cut/extend result rejected: {err}");
            return GroupResponse::notice(Notice::Warning(err.to_string()));
        }

        GroupResponse::task(Task::CommitCutExtend {
            layer: layer.clone(),
            pair: pair.clone(),
        })
    }

    pub(super) fn on_outcome(&mut self, outcome: Outcome, ctx: &GroupContext) -> GroupResponse {
        match outcome {
            Outcome::Info(result) => finish_info(&mut self.tool, result),
            Outcome::Selected(result) => {
                if let Some(tool) = &mut self.tool {
                    tool.finish();
                }

                match result {
                    Ok(features) => self.selected(features, ctx),
                    Err(EditError::Cancelled) => GroupResponse::redraw(),
                    Err(err) => GroupResponse::notice(Notice::Error(err.to_string())),
                }
            }
            Outcome::CutExtend(result) => {
                if let Some(tool) = &mut self.tool {
                    tool.finish();
                }

                match result {
                    Ok(pair) => {
                        self.pair = Some(pair);
                        GroupResponse::notice(Notice::Toast(PREVIEW_MODE.into()))
                    }
                    Err(EditError::Cancelled) => GroupResponse::redraw(),
                    Err(err @ EditError::MissingFeatures) => {
                        self.tool = None;
                        GroupResponse::notice(Notice::Error(err.to_string()))
                    }
                    Err(err) => GroupResponse::notice(Notice::Error(err.to_string())),
                }
            }
            Outcome::CutExtendCommitted(result) => match result {
                Ok(()) => {
                    self.pair = None;
                    self.tool = None;
                    GroupResponse::redraw()
                }
                Err(err) => {
                    log::error!("Failed to store cut/extend result: {err}");
                    GroupResponse::notice(Notice::Error(err.to_string()))
                }
            },
            other => unexpected(GroupKind::MainEditing, other),
        }
    }

    fn selected(&mut self, features: Vec<Feature>, ctx: &GroupContext) -> GroupResponse {
        let Some(first) = features.first() else {
            return GroupResponse::redraw();
        };

        let kind = first.kind();
        let Some(group) = SelectionGroup::new(kind, features, ctx.edit_layer) else {
            log::warn!("Selection of {kind} features is not supported");
            return GroupResponse::redraw();
        };

        let notice = Notice::Toast(format!(
            "Selected {} features ({} geometries)",
            group.features().len(),
            group.part_count()
        ));
        GroupResponse::switch(ToolGroup::Selection(group)).with_notice(notice)
    }

    pub(super) fn overlay(&self, view: &MapView) -> Vec<OverlayShape> {
        self.pair
            .as_ref()
            .and_then(|pair| {
                OverlayShape::geometry(pair.preview(), pair.srid(), view, OverlayStyle::Preview)
            })
            .into_iter()
            .collect()
    }
}
