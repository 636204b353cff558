use fieldedit_types::{Envelope, ScreenRect};

use crate::config::EditingConfig;
use crate::control::{GestureState, GestureTransition, PointerEvent};
use crate::overlay::OverlayShape;
use crate::tool::{ToolRequest, ToolResponse};
use crate::view::MapView;

/// Tool that lets the user drag a rectangle and queries the features under it.
///
/// Rectangles not larger than the touch box threshold in both directions are treated as
/// accidental taps and do not issue a query.
#[derive(Debug, Clone, Default)]
pub struct RectangleTool {
    gesture: GestureState,
    rect: Option<ScreenRect>,
}

impl RectangleTool {
    /// Current selection rectangle.
    pub fn rect(&self) -> Option<ScreenRect> {
        self.rect
    }

    pub(crate) fn handle_event(
        &mut self,
        event: &PointerEvent,
        view: &MapView,
        config: &EditingConfig,
        make_request: fn(Envelope) -> ToolRequest,
    ) -> ToolResponse {
        match self.gesture.apply(event, config.move_threshold()) {
            GestureTransition::Started(position) => {
                self.rect = Some(ScreenRect::from_corners(position, position));
                ToolResponse::consumed(true)
            }
            GestureTransition::Moved(drag) => {
                self.rect = Some(ScreenRect::from_corners(drag.start, drag.current));
                ToolResponse::consumed(true)
            }
            GestureTransition::Skipped | GestureTransition::Ignored => {
                ToolResponse::consumed(false)
            }
            GestureTransition::Rejected => {
                log::debug!("Rectangle tool is busy, pointer event rejected");
                ToolResponse::consumed(false)
            }
            GestureTransition::Finished(drag) => {
                let rect = ScreenRect::from_corners(drag.start, drag.current);
                if !rect.exceeds(config.touch_box_threshold()) {
                    log::debug!(
                        "Rectangle {}x{} is too small, treated as a tap",
                        rect.width(),
                        rect.height()
                    );
                    self.rect = None;
                    return ToolResponse::consumed(true);
                }

                let Some(envelope) = view.envelope_from_screen(&rect) else {
                    log::warn!("Cannot convert rectangle {rect:?} to map coordinates");
                    self.rect = None;
                    return ToolResponse::consumed(true);
                };

                self.rect = Some(rect);
                self.gesture.set_busy();
                ToolResponse::request(make_request(
                    envelope.expand_degenerate(config.degenerate_expand()),
                ))
            }
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.gesture.is_busy()
    }

    pub(crate) fn finish(&mut self) {
        self.gesture.reset();
        self.rect = None;
    }

    pub(crate) fn overlay(&self) -> Vec<OverlayShape> {
        self.rect.map(OverlayShape::Rectangle).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_view;
    use crate::tool::Tool;
    use crate::tool::ToolKind;
    use assert_matches::assert_matches;
    use fieldedit_types::ScreenPoint;

    fn drag(tool: &mut Tool, from: (f64, f64), to: (f64, f64)) -> ToolResponse {
        let view = test_view();
        let config = EditingConfig::default();
        tool.handle_event(&PointerEvent::Down(ScreenPoint::new(from.0, from.1)), &view, &config);
        tool.handle_event(&PointerEvent::Move(ScreenPoint::new(to.0, to.1)), &view, &config);
        tool.handle_event(&PointerEvent::Up(ScreenPoint::new(to.0, to.1)), &view, &config)
    }

    #[test]
    fn small_rectangles_issue_no_query() {
        for (w, h) in [(0.0, 0.0), (10.0, 10.0), (50.0, 10.0), (10.0, 50.0), (3.0, 200.0)] {
            let mut tool = Tool::new(ToolKind::Selection);
            let response = drag(&mut tool, (100.0, 100.0), (100.0 + w, 100.0 + h));
            assert_eq!(response.request, None, "{w}x{h} must be suppressed");
            assert!(!tool.is_busy());
            assert!(tool.overlay(&test_view()).is_empty());
        }
    }

    #[test]
    fn large_rectangle_issues_query() {
        let mut tool = Tool::new(ToolKind::Info);
        let response = drag(&mut tool, (100.0, 100.0), (111.0, 111.0));
        assert_matches!(
            response.request,
            Some(ToolRequest::Info(envelope)) if !envelope.is_degenerate()
        );
        assert!(tool.is_busy());
        assert_eq!(tool.overlay(&test_view()).len(), 1);
    }

    #[test]
    fn busy_tool_rejects_new_gesture() {
        let mut tool = Tool::new(ToolKind::Selection);
        drag(&mut tool, (100.0, 100.0), (200.0, 200.0));
        assert!(tool.is_busy());

        let response = drag(&mut tool, (300.0, 300.0), (400.0, 400.0));
        assert_eq!(response.request, None);

        tool.finish();
        let response = drag(&mut tool, (300.0, 300.0), (400.0, 400.0));
        assert_matches!(response.request, Some(ToolRequest::Select(_)));
    }

    #[test]
    fn rectangle_envelope_matches_view() {
        let view = test_view();
        let mut tool = Tool::new(ToolKind::Selection);
        let response = drag(&mut tool, (0.0, 0.0), (800.0, 600.0));
        let Some(ToolRequest::Select(envelope)) = response.request else {
            panic!("expected selection request");
        };
        assert_eq!(Some(envelope), view.get_bbox());
    }
}
