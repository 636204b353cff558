use crate::group::{
    finish_info, toggle_info_tool, unexpected, GroupContext, GroupKind, GroupResponse,
    PaletteButton, PaletteEntry,
};
use crate::task::Outcome;
use crate::tool::{Tool, ToolKind};

/// Group used when no layer can be edited. Only offers the info query.
#[derive(Debug, Clone, Default)]
pub struct NoEditableLayerGroup {
    pub(super) tool: Option<Tool>,
}

impl NoEditableLayerGroup {
    pub(super) fn palette(&self) -> Vec<PaletteEntry> {
        let info_active = self.tool.as_ref().map(Tool::kind) == Some(ToolKind::Info);
        vec![PaletteEntry::new(PaletteButton::SelectAll, info_active)]
    }

    pub(super) fn press(&mut self, button: PaletteButton, ctx: &GroupContext) -> GroupResponse {
        match button {
            PaletteButton::SelectAll => toggle_info_tool(&mut self.tool, ctx),
            other => {
                log::debug!("{other:?} is not available without an editable layer");
                GroupResponse::none()
            }
        }
    }

    pub(super) fn on_outcome(&mut self, outcome: Outcome) -> GroupResponse {
        match outcome {
            Outcome::Info(result) => finish_info(&mut self.tool, result),
            other => unexpected(GroupKind::NoEditableLayer, other),
        }
    }
}
