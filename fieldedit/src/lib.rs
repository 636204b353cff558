//! Fieldedit is the editing core of a mobile field-survey map. It lets a user query, select, cut,
//! extend, create and delete vector features with touch gestures and a small button palette.
//!
//! The crate does not draw anything and does not store data. The host application
//!
//! * provides the layers as [`VectorLayer`](layer::VectorLayer) and
//!   [`EditableLayer`](layer::EditableLayer) implementations,
//! * converts touch input into [`PointerEvent`](control::PointerEvent)s and button presses into
//!   [`PaletteButton`](group::PaletteButton)s,
//! * draws the [`OverlayShape`](overlay::OverlayShape)s and the palette the session describes,
//! * shows the [`Notice`]s delivered through its [`Messenger`].
//!
//! # Main components
//!
//! * [`EditingSession`] is the context object of one map. It owns the active
//!   [`ToolGroup`](group::ToolGroup), the [`MapView`] and the layers, and runs queries and commits
//!   in the background.
//! * [`tool groups`](group) are the editing modes: no editable layer, main palette, polygon
//!   creation and selection. Each group decides which buttons are offered.
//! * [`tools`](tool) interpret single gestures: the info and selection rectangles and the
//!   cut/extend path.
//! * the [`spatial query gateway`](query) collects features under a rectangle from all enabled
//!   layers, skipping layers that fail.
//! * the [`geometry engine`](geometry) validates, splits and combines polygons.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fieldedit::fieldedit_types::{Coordinate, GeometryKind, Size, Srid};
//! use fieldedit::group::PaletteButton;
//! use fieldedit::layer::MemoryLayer;
//! use fieldedit::{EditingConfig, EditingSession, MapView};
//!
//! # tokio_test::block_on(async {
//! let layer = Arc::new(MemoryLayer::new("parcels", GeometryKind::Polygon, Srid::WGS84));
//! let view = MapView::new(Coordinate { x: 11.0, y: 46.0 }, 16.0, Srid::WGS84)
//!     .with_size(Size::new(1080.0, 1920.0));
//!
//! let mut session = EditingSession::new(EditingConfig::default(), view)
//!     .with_layers(vec![layer.clone()])
//!     .with_edit_layer(layer);
//!
//! session.press(PaletteButton::CreateFeature).unwrap();
//! session.press(PaletteButton::AddVertex).unwrap();
//! # });
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
pub mod config;
pub mod control;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod group;
pub mod layer;
pub mod messenger;
pub mod overlay;
pub mod query;
mod session;
pub mod task;
pub mod tool;
mod view;

pub use config::EditingConfig;
pub use error::EditError;
pub use messenger::{LogMessenger, Messenger, Notice};
pub use session::EditingSession;
pub use view::MapView;

pub use fieldedit_types;

#[cfg(test)]
pub(crate) mod tests;
