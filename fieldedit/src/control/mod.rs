//! Pointer input consumed by the editing tools.
//!
//! The host converts its touch or mouse events into [`PointerEvent`]s and gives them to
//! [`EditingSession::handle_pointer`](crate::EditingSession::handle_pointer). The returned
//! [`EventPropagation`] tells whether the map itself may still handle the event (e.g. to pan).

use fieldedit_types::ScreenPoint;

mod gesture;

pub use gesture::{Drag, GestureState, GestureTransition};

/// Single-pointer input event. Positions are in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    /// Pointer was pressed.
    Down(ScreenPoint),
    /// Pressed pointer moved.
    Move(ScreenPoint),
    /// Pointer was released.
    Up(ScreenPoint),
}

impl PointerEvent {
    /// Screen position of the event.
    pub fn position(&self) -> ScreenPoint {
        match self {
            PointerEvent::Down(p) | PointerEvent::Move(p) | PointerEvent::Up(p) => *p,
        }
    }
}

/// Result of handling an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// The event was not used by the editing tools and should be handled by the map.
    Propagate,
    /// The event was used by the editing tools.
    Consume,
}
