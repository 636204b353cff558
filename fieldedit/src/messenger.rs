//! Delivery of redraw requests and user notices to the host application.

use std::fmt::{Display, Formatter};

use maybe_sync::{MaybeSend, MaybeSync};

/// Message for the user that the host application shows as a toast or a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Short informational message that disappears by itself.
    Toast(String),
    /// Something went wrong, but the user can fix it and retry.
    Warning(String),
    /// Operation failed.
    Error(String),
}

impl Notice {
    /// Text of the notice.
    pub fn text(&self) -> &str {
        match self {
            Notice::Toast(text) | Notice::Warning(text) | Notice::Error(text) => text,
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Toast(text) => write!(f, "{text}"),
            Notice::Warning(text) => write!(f, "warning: {text}"),
            Notice::Error(text) => write!(f, "error: {text}"),
        }
    }
}

/// Channel from the editing session back to the host user interface.
pub trait Messenger: MaybeSend + MaybeSync {
    /// The editing overlay changed and must be drawn again.
    fn request_redraw(&self);

    /// Shows a notice to the user. The default implementation only writes it to the log.
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Toast(_) => log::info!("{notice}"),
            Notice::Warning(_) => log::warn!("{notice}"),
            Notice::Error(_) => log::error!("{notice}"),
        }
    }
}

/// Messenger that ignores redraw requests and logs notices.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn request_redraw(&self) {}
}
