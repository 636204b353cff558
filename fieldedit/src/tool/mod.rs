//! Single-gesture tools.
//!
//! A [`Tool`] owns the interpretation of pointer events for one interaction mode. When a gesture
//! is complete the tool produces a [`ToolRequest`] describing the background operation it needs.
//! The tool then stays busy until [`Tool::finish`] is called with the result.

use fieldedit_types::{Coordinate, Envelope};

use crate::config::EditingConfig;
use crate::control::{EventPropagation, PointerEvent};
use crate::overlay::OverlayShape;
use crate::view::MapView;

mod cut_extend;
mod rectangle;

pub use cut_extend::CutExtendTool;
pub use rectangle::RectangleTool;

/// Kind of a tool, matching the palette button that activates it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Rectangle query over all visible layers.
    Info,
    /// Rectangle selection in the editable layer.
    Selection,
    /// Cut the start feature with the end feature.
    Cut,
    /// Extend the start feature with the end feature.
    Extend,
}

/// Background operation requested by a finished gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    /// Query all enabled layers.
    Info(Envelope),
    /// Select features of the editable layer.
    Select(Envelope),
    /// Find features under the start and end points and combine them.
    CutExtend {
        /// Envelope containing both points.
        envelope: Envelope,
        /// Start point of the gesture in display coordinates.
        start: Coordinate,
        /// End point of the gesture in display coordinates.
        end: Coordinate,
        /// `true` to cut, `false` to extend.
        cut: bool,
    },
}

/// Result of handling a pointer event by a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    /// Whether the map may handle the event too.
    pub propagation: EventPropagation,
    /// Whether the overlay changed.
    pub redraw: bool,
    /// Background operation to start.
    pub request: Option<ToolRequest>,
}

impl ToolResponse {
    pub(crate) fn consumed(redraw: bool) -> Self {
        Self {
            propagation: EventPropagation::Consume,
            redraw,
            request: None,
        }
    }

    pub(crate) fn request(request: ToolRequest) -> Self {
        Self {
            propagation: EventPropagation::Consume,
            redraw: true,
            request: Some(request),
        }
    }
}

/// Active tool.
#[derive(Debug, Clone)]
pub enum Tool {
    /// Info rectangle.
    Info(RectangleTool),
    /// Selection rectangle.
    Selection(RectangleTool),
    /// Cut or extend path.
    CutExtend(CutExtendTool),
}

impl Tool {
    /// Creates an idle tool of the given kind.
    pub fn new(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Info => Tool::Info(RectangleTool::default()),
            ToolKind::Selection => Tool::Selection(RectangleTool::default()),
            ToolKind::Cut => Tool::CutExtend(CutExtendTool::new(true)),
            ToolKind::Extend => Tool::CutExtend(CutExtendTool::new(false)),
        }
    }

    /// Kind of the tool.
    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Info(_) => ToolKind::Info,
            Tool::Selection(_) => ToolKind::Selection,
            Tool::CutExtend(tool) if tool.is_cut() => ToolKind::Cut,
            Tool::CutExtend(_) => ToolKind::Extend,
        }
    }

    /// Handles a pointer event.
    pub fn handle_event(
        &mut self,
        event: &PointerEvent,
        view: &MapView,
        config: &EditingConfig,
    ) -> ToolResponse {
        match self {
            Tool::Info(tool) => tool.handle_event(event, view, config, ToolRequest::Info),
            Tool::Selection(tool) => tool.handle_event(event, view, config, ToolRequest::Select),
            Tool::CutExtend(tool) => tool.handle_event(event, view, config),
        }
    }

    /// Returns true if the tool waits for its background operation.
    pub fn is_busy(&self) -> bool {
        match self {
            Tool::Info(tool) | Tool::Selection(tool) => tool.is_busy(),
            Tool::CutExtend(tool) => tool.is_busy(),
        }
    }

    /// Returns the tool to the idle state after its background operation completed.
    pub fn finish(&mut self) {
        match self {
            Tool::Info(tool) | Tool::Selection(tool) => tool.finish(),
            Tool::CutExtend(tool) => tool.finish(),
        }
    }

    /// Gesture feedback shapes.
    pub fn overlay(&self, view: &MapView) -> Vec<OverlayShape> {
        match self {
            Tool::Info(tool) | Tool::Selection(tool) => tool.overlay(),
            Tool::CutExtend(tool) => tool.overlay(view),
        }
    }
}
