use fieldedit_types::{Coordinate, Envelope, ScreenPoint};

use crate::config::EditingConfig;
use crate::control::{GestureState, GestureTransition, PointerEvent};
use crate::overlay::OverlayShape;
use crate::tool::{ToolRequest, ToolResponse};
use crate::view::MapView;

/// Tool that draws a freehand path from one polygon to another and cuts the first polygon with
/// the second one, or extends the first polygon by the second one.
#[derive(Debug, Clone)]
pub struct CutExtendTool {
    cut: bool,
    gesture: GestureState,
    path: Vec<ScreenPoint>,
    start: Option<Coordinate>,
    end: Option<Coordinate>,
}

impl CutExtendTool {
    /// Creates a cutting (`cut == true`) or extending tool.
    pub fn new(cut: bool) -> Self {
        Self {
            cut,
            gesture: GestureState::Idle,
            path: vec![],
            start: None,
            end: None,
        }
    }

    /// Returns true for the cutting tool.
    pub fn is_cut(&self) -> bool {
        self.cut
    }

    /// Start point of the current gesture in display coordinates.
    pub fn start(&self) -> Option<Coordinate> {
        self.start
    }

    /// End point of the current gesture in display coordinates.
    pub fn end(&self) -> Option<Coordinate> {
        self.end
    }

    pub(crate) fn handle_event(
        &mut self,
        event: &PointerEvent,
        view: &MapView,
        config: &EditingConfig,
    ) -> ToolResponse {
        match self.gesture.apply(event, config.move_threshold()) {
            GestureTransition::Started(position) => {
                self.path = vec![position];
                self.start = view.screen_to_map(position);
                self.end = None;
                ToolResponse::consumed(true)
            }
            GestureTransition::Moved(drag) => {
                self.path.push(drag.current);
                self.end = view.screen_to_map(drag.current);
                ToolResponse::consumed(true)
            }
            GestureTransition::Skipped | GestureTransition::Ignored => {
                ToolResponse::consumed(false)
            }
            GestureTransition::Rejected => {
                log::debug!("Cut/extend tool is busy, pointer event rejected");
                ToolResponse::consumed(false)
            }
            GestureTransition::Finished(drag) => {
                if self.path.last() != Some(&drag.current) {
                    self.path.push(drag.current);
                }
                self.end = view.screen_to_map(drag.current);

                let (Some(start), Some(end)) = (self.start, self.end) else {
                    log::warn!("Cut/extend gesture is outside of the map");
                    self.finish();
                    return ToolResponse::consumed(true);
                };

                self.gesture.set_busy();
                ToolResponse::request(ToolRequest::CutExtend {
                    envelope: Envelope::from_corners(start, end)
                        .expand_degenerate(config.degenerate_expand()),
                    start,
                    end,
                    cut: self.cut,
                })
            }
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.gesture.is_busy()
    }

    pub(crate) fn finish(&mut self) {
        self.gesture.reset();
        self.path.clear();
        self.start = None;
        self.end = None;
    }

    pub(crate) fn overlay(&self, view: &MapView) -> Vec<OverlayShape> {
        let mut shapes = vec![];
        if self.path.len() > 1 {
            shapes.push(OverlayShape::Path(self.path.clone()));
        }

        for coord in [self.start, self.end].into_iter().flatten() {
            if let Some(point) = view.map_to_screen(coord) {
                shapes.push(OverlayShape::Marker(point));
            }
        }

        shapes
    }
}
