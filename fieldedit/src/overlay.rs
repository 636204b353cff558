//! Shapes the host draws on top of the map to show editing state.

use fieldedit_types::{Coordinate, ScreenPoint, ScreenRect, Srid};
use geo::MapCoords;
use geo_types::Geometry;

use crate::geometry::reproject;
use crate::view::MapView;

/// How a geometry in the overlay should be styled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OverlayStyle {
    /// Uncommitted result of a cut or extend operation.
    Preview,
    /// Polygon being created.
    Created,
    /// Selected feature.
    Selected,
    /// Selected feature that will be deleted on commit.
    DeletePreview,
}

/// Shape in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// Selection or info rectangle.
    Rectangle(ScreenRect),
    /// Freehand path of a cut/extend gesture.
    Path(Vec<ScreenPoint>),
    /// Start or end marker of a cut/extend gesture.
    Marker(ScreenPoint),
    /// Vertex of the polygon being created.
    Vertex(ScreenPoint),
    /// Line between the two first vertices of the polygon being created.
    Segment(ScreenPoint, ScreenPoint),
    /// Geometry with coordinates converted to screen pixels.
    Geometry {
        /// Geometry in screen coordinates.
        geometry: Geometry<f64>,
        /// Style to draw it with.
        style: OverlayStyle,
    },
}

impl OverlayShape {
    /// Converts a geometry in `srid` into a screen-space overlay geometry.
    ///
    /// Returns `None` if the geometry cannot be projected to the screen.
    pub fn geometry(
        geometry: &Geometry<f64>,
        srid: Srid,
        view: &MapView,
        style: OverlayStyle,
    ) -> Option<Self> {
        let display = reproject(geometry, srid, view.srid()).ok()?;
        let screen = display
            .try_map_coords(|c| {
                view.map_to_screen(c)
                    .map(|p| Coordinate { x: p.x, y: p.y })
                    .ok_or(())
            })
            .ok()?;

        Some(Self::Geometry {
            geometry: screen,
            style,
        })
    }
}
