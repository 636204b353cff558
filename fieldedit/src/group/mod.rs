//! Tool groups: editing modes with their own button palette.
//!
//! Exactly one [`ToolGroup`] is active in a session. The group decides which buttons are
//! offered, owns zero or one active [`Tool`], turns finished gestures into background
//! [`Task`]s and applies their outcomes.

use std::sync::Arc;

use fieldedit_types::{Coordinate, GeometryKind};

use crate::config::EditingConfig;
use crate::control::{EventPropagation, PointerEvent};
use crate::error::EditError;
use crate::feature::Feature;
use crate::geometry::GeometryEngine;
use crate::layer::{EditableLayer, VectorLayer};
use crate::messenger::Notice;
use crate::overlay::OverlayShape;
use crate::query::QueryOutcome;
use crate::task::{Outcome, Task};
use crate::tool::{Tool, ToolKind, ToolRequest};
use crate::view::MapView;

mod create;
mod main_editing;
mod no_edit;
mod selection;

pub use create::{CreateFeatureGroup, VertexInputMode};
pub use main_editing::MainEditingGroup;
pub use no_edit::NoEditableLayerGroup;
pub use selection::SelectionGroup;

pub(crate) const NO_QUERIABLE_LAYER: &str = "no queriable layer is visible";

/// Button of a tool group palette.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PaletteButton {
    /// Activates the cutting tool.
    Cut,
    /// Activates the extending tool.
    Extend,
    /// Switches to the feature creation mode.
    CreateFeature,
    /// Activates rectangle selection in the editable layer.
    SelectEditable,
    /// Activates the info query over all visible layers.
    SelectAll,
    /// Reverts the last step.
    Undo,
    /// Stores the pending result.
    Commit,
    /// Adds a vertex at the map center.
    AddVertex,
    /// Adds a vertex at the last GPS fix. A long press toggles adding every new fix.
    GpsStream,
    /// Toggles adding vertices by tapping the map.
    AddVertexByTap,
    /// Marks the selected features for deletion.
    Delete,
}

/// Button shown in the palette.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// The button.
    pub button: PaletteButton,
    /// Whether the mode behind the button is on.
    pub active: bool,
}

impl PaletteEntry {
    pub(crate) fn new(button: PaletteButton, active: bool) -> Self {
        Self { button, active }
    }
}

/// Kind of a tool group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// No layer can be edited, only info queries are possible.
    NoEditableLayer,
    /// Main palette of the editable layer.
    MainEditing,
    /// Polygon or line creation.
    CreateFeature,
    /// Operations on selected features of the given kind (point, line or polygon).
    Selection(GeometryKind),
}

/// Session state a group may read while handling input.
pub(crate) struct GroupContext<'a> {
    pub view: &'a MapView,
    pub config: &'a EditingConfig,
    pub edit_layer: Option<&'a Arc<dyn EditableLayer>>,
    pub layers: &'a [Arc<dyn VectorLayer>],
    pub geometry: &'a dyn GeometryEngine,
    pub gps_fix: Option<Coordinate>,
}

/// What the session must do after a group handled input.
#[derive(Default)]
pub(crate) struct GroupResponse {
    pub redraw: bool,
    pub switch_to: Option<ToolGroup>,
    pub task: Option<Task>,
    pub notices: Vec<Notice>,
    pub info: Option<Vec<Feature>>,
}

impl GroupResponse {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Default::default()
        }
    }

    pub fn switch(group: ToolGroup) -> Self {
        Self {
            redraw: true,
            switch_to: Some(group),
            ..Default::default()
        }
    }

    pub fn task(task: Task) -> Self {
        Self {
            redraw: true,
            task: Some(task),
            ..Default::default()
        }
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            redraw: true,
            notices: vec![notice],
            ..Default::default()
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }
}

/// Active editing mode.
#[derive(Debug, Clone)]
pub enum ToolGroup {
    /// See [`NoEditableLayerGroup`].
    NoEditableLayer(NoEditableLayerGroup),
    /// See [`MainEditingGroup`].
    MainEditing(MainEditingGroup),
    /// See [`CreateFeatureGroup`].
    CreateFeature(CreateFeatureGroup),
    /// See [`SelectionGroup`].
    Selection(SelectionGroup),
}

impl ToolGroup {
    /// Group to start with for the given editable layer.
    pub fn for_edit_layer(edit_layer: Option<&Arc<dyn EditableLayer>>) -> Self {
        match edit_layer {
            Some(layer) => ToolGroup::MainEditing(MainEditingGroup::new(layer.geometry_kind())),
            None => ToolGroup::NoEditableLayer(NoEditableLayerGroup::default()),
        }
    }

    /// Kind of the group.
    pub fn kind(&self) -> GroupKind {
        match self {
            ToolGroup::NoEditableLayer(_) => GroupKind::NoEditableLayer,
            ToolGroup::MainEditing(_) => GroupKind::MainEditing,
            ToolGroup::CreateFeature(_) => GroupKind::CreateFeature,
            ToolGroup::Selection(group) => GroupKind::Selection(group.kind()),
        }
    }

    /// Buttons the group offers in its current state.
    pub fn palette(&self) -> Vec<PaletteEntry> {
        match self {
            ToolGroup::NoEditableLayer(group) => group.palette(),
            ToolGroup::MainEditing(group) => group.palette(),
            ToolGroup::CreateFeature(group) => group.palette(),
            ToolGroup::Selection(group) => group.palette(),
        }
    }

    /// Currently active tool.
    pub fn active_tool(&self) -> Option<&Tool> {
        match self {
            ToolGroup::NoEditableLayer(group) => group.tool.as_ref(),
            ToolGroup::MainEditing(group) => group.tool.as_ref(),
            ToolGroup::CreateFeature(_) | ToolGroup::Selection(_) => None,
        }
    }

    fn tool_mut(&mut self) -> Option<&mut Tool> {
        match self {
            ToolGroup::NoEditableLayer(group) => group.tool.as_mut(),
            ToolGroup::MainEditing(group) => group.tool.as_mut(),
            ToolGroup::CreateFeature(_) | ToolGroup::Selection(_) => None,
        }
    }

    /// Returns false while the group intercepts map gestures.
    pub fn map_interaction_enabled(&self) -> bool {
        match self {
            ToolGroup::CreateFeature(group) => group.input_mode() != VertexInputMode::Tap,
            _ => self.active_tool().is_none(),
        }
    }

    /// Shapes to draw over the map.
    pub fn overlay(&self, view: &MapView) -> Vec<OverlayShape> {
        let mut shapes = match self {
            ToolGroup::NoEditableLayer(_) => vec![],
            ToolGroup::MainEditing(group) => group.overlay(view),
            ToolGroup::CreateFeature(group) => group.overlay(view),
            ToolGroup::Selection(group) => group.overlay(view),
        };

        if let Some(tool) = self.active_tool() {
            shapes.extend(tool.overlay(view));
        }

        shapes
    }

    pub(crate) fn press(&mut self, button: PaletteButton, ctx: &GroupContext) -> GroupResponse {
        match self {
            ToolGroup::NoEditableLayer(group) => group.press(button, ctx),
            ToolGroup::MainEditing(group) => group.press(button, ctx),
            ToolGroup::CreateFeature(group) => group.press(button, ctx),
            ToolGroup::Selection(group) => group.press(button, ctx),
        }
    }

    pub(crate) fn long_press(
        &mut self,
        button: PaletteButton,
        ctx: &GroupContext,
    ) -> GroupResponse {
        match self {
            ToolGroup::CreateFeature(group) => group.long_press(button, ctx),
            _ => self.press(button, ctx),
        }
    }

    pub(crate) fn gps_update(&mut self, fix: Coordinate, ctx: &GroupContext) -> GroupResponse {
        match self {
            ToolGroup::CreateFeature(group) => group.gps_update(fix, ctx),
            _ => GroupResponse::none(),
        }
    }

    pub(crate) fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        ctx: &GroupContext,
    ) -> (EventPropagation, GroupResponse) {
        if let ToolGroup::CreateFeature(group) = self {
            return group.handle_pointer(event, ctx);
        }

        let Some(tool) = self.tool_mut() else {
            return (EventPropagation::Propagate, GroupResponse::none());
        };

        let response = tool.handle_event(event, ctx.view, ctx.config);
        let mut group_response = GroupResponse {
            redraw: response.redraw,
            ..Default::default()
        };

        if let Some(request) = response.request {
            match request_task(request, ctx) {
                Ok(task) => group_response.task = Some(task),
                Err(err) => {
                    tool.finish();
                    group_response = GroupResponse::notice(Notice::Error(err.to_string()));
                }
            }
        }

        (response.propagation, group_response)
    }

    pub(crate) fn on_outcome(&mut self, outcome: Outcome, ctx: &GroupContext) -> GroupResponse {
        match self {
            ToolGroup::NoEditableLayer(group) => group.on_outcome(outcome),
            ToolGroup::MainEditing(group) => group.on_outcome(outcome, ctx),
            ToolGroup::CreateFeature(group) => group.on_outcome(outcome),
            ToolGroup::Selection(group) => group.on_outcome(outcome, ctx),
        }
    }
}

fn request_task(request: ToolRequest, ctx: &GroupContext) -> Result<Task, EditError> {
    Ok(match request {
        ToolRequest::Info(envelope) => Task::Info {
            layers: ctx.layers.to_vec(),
            envelope,
        },
        ToolRequest::Select(envelope) => Task::Select {
            layer: ctx.edit_layer.ok_or(EditError::NoEditLayer)?.clone(),
            envelope,
        },
        ToolRequest::CutExtend {
            envelope,
            start,
            end,
            cut,
        } => Task::CutExtend {
            layer: ctx.edit_layer.ok_or(EditError::NoEditLayer)?.clone(),
            envelope,
            start,
            end,
            cut,
        },
    })
}

/// Activates the tool of the given kind, or deactivates it if it is already active.
pub(crate) fn toggle_tool(slot: &mut Option<Tool>, kind: ToolKind) {
    if slot.as_ref().map(Tool::kind) == Some(kind) {
        log::debug!("{kind:?} tool deactivated");
        *slot = None;
    } else {
        log::debug!("{kind:?} tool activated");
        *slot = Some(Tool::new(kind));
    }
}

/// Toggles the info tool after checking that there is something to query.
pub(crate) fn toggle_info_tool(slot: &mut Option<Tool>, ctx: &GroupContext) -> GroupResponse {
    let is_active = slot.as_ref().map(Tool::kind) == Some(ToolKind::Info);
    if !is_active && !ctx.layers.iter().any(|l| l.is_enabled()) {
        return GroupResponse::notice(Notice::Warning(NO_QUERIABLE_LAYER.into()));
    }

    toggle_tool(slot, ToolKind::Info);
    GroupResponse::redraw()
}

/// Applies the result of an info query.
pub(crate) fn finish_info(
    slot: &mut Option<Tool>,
    result: Result<QueryOutcome, EditError>,
) -> GroupResponse {
    if let Some(tool) = slot {
        tool.finish();
    }

    match result {
        Ok(outcome) => {
            log::debug!(
                "Info query found {} features in {} layers",
                outcome.features.len(),
                outcome.layers_queried
            );
            GroupResponse {
                redraw: true,
                info: Some(outcome.features),
                ..Default::default()
            }
        }
        Err(EditError::Cancelled) => GroupResponse::redraw(),
        Err(err) => GroupResponse::notice(Notice::Error(err.to_string())),
    }
}

/// Logs an outcome that the group does not expect.
pub(crate) fn unexpected(group: GroupKind, outcome: Outcome) -> GroupResponse {
    log::error!("{group:?} group received an unexpected outcome: {outcome:?}");
    GroupResponse::none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_returns_to_disabled_state() {
        let mut slot = None;
        toggle_tool(&mut slot, ToolKind::Selection);
        assert_eq!(slot.as_ref().map(Tool::kind), Some(ToolKind::Selection));
        toggle_tool(&mut slot, ToolKind::Selection);
        assert!(slot.is_none());
    }

    #[test]
    fn different_kind_replaces_tool() {
        let mut slot = None;
        toggle_tool(&mut slot, ToolKind::Cut);
        toggle_tool(&mut slot, ToolKind::Extend);
        assert_eq!(slot.as_ref().map(Tool::kind), Some(ToolKind::Extend));
        toggle_tool(&mut slot, ToolKind::Info);
        assert_eq!(slot.as_ref().map(Tool::kind), Some(ToolKind::Info));
    }
}
