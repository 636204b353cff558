use fieldedit_types::ScreenPoint;

use crate::control::PointerEvent;

/// Positions of an ongoing drag gesture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drag {
    /// Position of the pointer-down event.
    pub start: ScreenPoint,
    /// Position of the last pointer event, including skipped moves.
    pub last: ScreenPoint,
    /// Position the gesture feedback was last updated for.
    pub current: ScreenPoint,
}

impl Drag {
    fn new(position: ScreenPoint) -> Self {
        Self {
            start: position,
            last: position,
            current: position,
        }
    }
}

/// State of a single-gesture tool.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum GestureState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// Pointer is pressed.
    Dragging(Drag),
    /// Gesture is finished and its background operation has not completed yet. All input is
    /// rejected.
    Busy,
}

/// What happened to the gesture after an event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GestureTransition {
    /// A new gesture started at the position.
    Started(ScreenPoint),
    /// The pointer moved far enough to update the feedback.
    Moved(Drag),
    /// The pointer moved less than the move threshold since the last event.
    Skipped,
    /// The pointer was released.
    Finished(Drag),
    /// The tool is busy and the event was rejected.
    Rejected,
    /// The event does not belong to a gesture (e.g. a move without a pointer-down).
    Ignored,
}

impl GestureState {
    /// Applies the event and returns the transition that happened.
    ///
    /// Moves shorter than `move_threshold` pixels along both axes since the previous event are
    /// skipped.
    pub fn apply(&mut self, event: &PointerEvent, move_threshold: f64) -> GestureTransition {
        match (*self, *event) {
            (GestureState::Busy, _) => GestureTransition::Rejected,
            (_, PointerEvent::Down(position)) => {
                *self = GestureState::Dragging(Drag::new(position));
                GestureTransition::Started(position)
            }
            (GestureState::Dragging(mut drag), PointerEvent::Move(position)) => {
                let dx = (position.x - drag.last.x).abs();
                let dy = (position.y - drag.last.y).abs();
                drag.last = position;

                let transition = if dx < move_threshold && dy < move_threshold {
                    GestureTransition::Skipped
                } else {
                    drag.current = position;
                    GestureTransition::Moved(drag)
                };

                *self = GestureState::Dragging(drag);
                transition
            }
            (GestureState::Dragging(mut drag), PointerEvent::Up(position)) => {
                drag.last = position;
                drag.current = position;
                *self = GestureState::Idle;
                GestureTransition::Finished(drag)
            }
            (GestureState::Idle, _) => GestureTransition::Ignored,
        }
    }

    /// Marks the gesture as waiting for its background operation.
    pub fn set_busy(&mut self) {
        *self = GestureState::Busy;
    }

    /// Returns the state to idle.
    pub fn reset(&mut self) {
        *self = GestureState::Idle;
    }

    /// Returns true if the gesture waits for a background operation.
    pub fn is_busy(&self) -> bool {
        matches!(self, GestureState::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn p(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    #[test]
    fn full_gesture() {
        let mut state = GestureState::default();
        assert_eq!(
            state.apply(&PointerEvent::Down(p(10.0, 10.0)), 1.0),
            GestureTransition::Started(p(10.0, 10.0))
        );
        assert_matches!(
            state.apply(&PointerEvent::Move(p(20.0, 15.0)), 1.0),
            GestureTransition::Moved(Drag { current, .. }) if current == p(20.0, 15.0)
        );
        assert_matches!(
            state.apply(&PointerEvent::Up(p(30.0, 40.0)), 1.0),
            GestureTransition::Finished(Drag { start, current, .. })
                if start == p(10.0, 10.0) && current == p(30.0, 40.0)
        );
        assert_eq!(state, GestureState::Idle);
    }

    #[test]
    fn small_moves_are_skipped() {
        let mut state = GestureState::default();
        state.apply(&PointerEvent::Down(p(10.0, 10.0)), 1.0);
        assert_eq!(
            state.apply(&PointerEvent::Move(p(10.5, 10.5)), 1.0),
            GestureTransition::Skipped
        );
        assert_eq!(
            state.apply(&PointerEvent::Move(p(10.9, 10.9)), 1.0),
            GestureTransition::Skipped
        );

        let GestureState::Dragging(drag) = state else {
            panic!("expected dragging state");
        };
        assert_eq!(drag.last, p(10.9, 10.9));
        assert_eq!(drag.current, p(10.0, 10.0));
    }

    #[test]
    fn events_without_down_are_ignored() {
        let mut state = GestureState::default();
        assert_eq!(
            state.apply(&PointerEvent::Move(p(1.0, 1.0)), 1.0),
            GestureTransition::Ignored
        );
        assert_eq!(
            state.apply(&PointerEvent::Up(p(1.0, 1.0)), 1.0),
            GestureTransition::Ignored
        );
    }

    #[test]
    fn busy_rejects_everything() {
        let mut state = GestureState::default();
        state.set_busy();
        for event in [
            PointerEvent::Down(p(0.0, 0.0)),
            PointerEvent::Move(p(5.0, 5.0)),
            PointerEvent::Up(p(5.0, 5.0)),
        ] {
            assert_eq!(state.apply(&event, 1.0), GestureTransition::Rejected);
        }
        assert!(state.is_busy());

        state.reset();
        assert_matches!(
            state.apply(&PointerEvent::Down(p(0.0, 0.0)), 1.0),
            GestureTransition::Started(_)
        );
    }
}
