//! See [`MapView`].

use fieldedit_types::{Coordinate, Envelope, ScreenPoint, ScreenRect, Size, Srid};
use nalgebra::{Matrix3, Point2, Scale2, Translation2};

/// Resolution (meters per pixel) of the web mercator zoom level 0.
pub const ZOOM_0_RESOLUTION: f64 = 156543.03392800014;

/// Current pan and zoom of the map.
///
/// The center is given in the display reference system (`srid`). Zoom levels follow the usual
/// web map convention: at level `z` one pixel spans `ZOOM_0_RESOLUTION / 2^z` web mercator
/// meters. Screen coordinates have the origin in the top-left corner with `y` pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    center: Coordinate,
    zoom: f64,
    size: Size,
    srid: Srid,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Coordinate { x: 0.0, y: 0.0 },
            zoom: 0.0,
            size: Size::new(0.0, 0.0),
            srid: Srid::WGS84,
        }
    }
}

impl MapView {
    /// Creates a view centered at `center` (in `srid`) with the given zoom level and zero size.
    pub fn new(center: Coordinate, zoom: f64, srid: Srid) -> Self {
        Self {
            center,
            zoom,
            srid,
            ..Default::default()
        }
    }

    /// Center of the view in the display reference system.
    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// Returns a copy of the view with the new center.
    pub fn with_center(&self, center: Coordinate) -> Self {
        Self { center, ..*self }
    }

    /// Zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Returns a copy of the view with the new zoom level.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        Self { zoom, ..*self }
    }

    /// Size of the viewport in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the new viewport size.
    pub fn with_size(&self, size: Size) -> Self {
        Self { size, ..*self }
    }

    /// Display reference system.
    pub fn srid(&self) -> Srid {
        self.srid
    }

    /// Web mercator meters per pixel at the current zoom.
    pub fn resolution(&self) -> f64 {
        ZOOM_0_RESOLUTION / 2f64.powf(self.zoom)
    }

    /// Converts a display coordinate into a screen point.
    ///
    /// Returns `None` if the viewport has zero size or the coordinate cannot be projected.
    pub fn map_to_screen(&self, coord: Coordinate) -> Option<ScreenPoint> {
        let projected = self.srid.transform(coord, Srid::WEB_MERCATOR).ok()?;
        let transform = self.map_to_screen_transform()?;
        let p = transform.transform_point(&Point2::new(projected.x, projected.y));
        Some(ScreenPoint::new(p.x, p.y))
    }

    /// Converts a screen point into a display coordinate.
    ///
    /// Returns `None` if the viewport has zero size or the point is outside the projection
    /// domain.
    pub fn screen_to_map(&self, point: ScreenPoint) -> Option<Coordinate> {
        let transform = self.map_to_screen_transform()?.try_inverse()?;
        let p = transform.transform_point(&Point2::new(point.x, point.y));
        Srid::WEB_MERCATOR
            .transform(Coordinate { x: p.x, y: p.y }, self.srid)
            .ok()
    }

    /// Display envelope covered by the screen rectangle.
    pub fn envelope_from_screen(&self, rect: &ScreenRect) -> Option<Envelope> {
        let a = self.screen_to_map(rect.top_left())?;
        let b = self.screen_to_map(rect.bottom_right())?;
        Some(Envelope::from_corners(a, b))
    }

    /// Display envelope of the whole viewport.
    pub fn get_bbox(&self) -> Option<Envelope> {
        self.envelope_from_screen(&ScreenRect::from_corners(
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(self.size.width(), self.size.height()),
        ))
    }

    fn map_to_screen_transform(&self) -> Option<Matrix3<f64>> {
        if self.size.is_zero() {
            return None;
        }

        let center = self.srid.transform(self.center, Srid::WEB_MERCATOR).ok()?;
        let resolution = self.resolution();

        let to_center = Translation2::new(-center.x, -center.y).to_homogeneous();
        let scale = Scale2::new(1.0 / resolution, -1.0 / resolution).to_homogeneous();
        let half = self.size.half();
        let to_corner = Translation2::new(half.width(), half.height()).to_homogeneous();

        Some(to_corner * scale * to_center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn view() -> MapView {
        MapView::new(Coordinate { x: 1.5, y: 1.0 }, 8.0, Srid::WGS84)
            .with_size(Size::new(800.0, 600.0))
    }

    #[test]
    fn center_maps_to_screen_center() {
        let view = view();
        let center = view.map_to_screen(view.center()).expect("projectable");
        assert_relative_eq!(center.x, 400.0, epsilon = 1e-6);
        assert_relative_eq!(center.y, 300.0, epsilon = 1e-6);
    }

    #[test]
    fn north_is_up() {
        let view = view();
        let north = view
            .map_to_screen(Coordinate { x: 1.5, y: 1.5 })
            .expect("projectable");
        assert!(north.y < 300.0);
        let east = view
            .map_to_screen(Coordinate { x: 2.0, y: 1.0 })
            .expect("projectable");
        assert!(east.x > 400.0);
    }

    #[test]
    fn round_trip_within_viewport() {
        let view = view();
        let bbox = view.get_bbox().expect("has size");
        for i in 0..=10 {
            for j in 0..=10 {
                let c = Coordinate {
                    x: bbox.west() + bbox.width() * i as f64 / 10.0,
                    y: bbox.south() + bbox.height() * j as f64 / 10.0,
                };
                let screen = view.map_to_screen(c).expect("projectable");
                let back = view.screen_to_map(screen).expect("projectable");
                assert_relative_eq!(back.x, c.x, epsilon = 1e-9);
                assert_relative_eq!(back.y, c.y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn web_mercator_display() {
        let view = MapView::new(Coordinate { x: 1000.0, y: 2000.0 }, 0.0, Srid::WEB_MERCATOR)
            .with_size(Size::new(100.0, 100.0));
        let p = view
            .map_to_screen(Coordinate {
                x: 1000.0 + ZOOM_0_RESOLUTION * 10.0,
                y: 2000.0,
            })
            .expect("projectable");
        assert_relative_eq!(p.x, 60.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 50.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_size_has_no_projection() {
        let view = MapView::default();
        assert!(view.map_to_screen(Coordinate { x: 0.0, y: 0.0 }).is_none());
        assert!(view.screen_to_map(ScreenPoint::new(0.0, 0.0)).is_none());
    }
}
