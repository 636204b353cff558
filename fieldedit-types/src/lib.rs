//! Value types shared by the `fieldedit` crates.
//!
//! Everything here is a plain, synchronous value: geographic [`Envelope`]s used for range
//! queries, screen-space primitives ([`ScreenPoint`], [`ScreenRect`], [`Size`]), the
//! [`GeometryKind`] a layer declares, and [`Srid`] reference system identifiers together with
//! the transformations between the supported systems.
//!
//! Geometries themselves are [`geo_types`] values, re-exported from this crate so that
//! dependants use the same version.

pub mod envelope;
pub mod error;
pub mod geometry_kind;
pub mod projection;
pub mod screen;
pub mod srid;

pub use envelope::Envelope;
pub use geometry_kind::GeometryKind;
pub use screen::{ScreenPoint, ScreenRect, Size};
pub use srid::Srid;

pub use geo_types;

/// A coordinate in a geographic or projected reference system.
pub type Coordinate = geo_types::Coord<f64>;
