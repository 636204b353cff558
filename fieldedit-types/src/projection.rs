//! Map projections between geographic and projected coordinates.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::Coordinate;

/// Transformation of coordinates from a geographic system into a projected one and back.
pub trait Projection {
    /// Projects geographic coordinates (longitude as `x`, latitude as `y`, degrees).
    ///
    /// Returns `None` if the coordinate is outside of the projection domain.
    fn project(&self, input: Coordinate) -> Option<Coordinate>;
    /// Inverse of [`Projection::project`].
    fn unproject(&self, input: Coordinate) -> Option<Coordinate>;
}

/// Parameters of the reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// World Geodetic System 1984.
    pub const WGS84: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// Semimajor axis of the ellipsoid in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening of the ellipsoid.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}

/// Spherical mercator projection (EPSG:3857).
#[derive(Debug, Copy, Clone, Default)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a projection over the given datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }
}

impl Projection for WebMercator {
    fn project(&self, input: Coordinate) -> Option<Coordinate> {
        if input.y.abs() >= 90.0 {
            return None;
        }

        let r = self.datum.semimajor();
        let x = r * input.x.to_radians();
        let y = r * (FRAC_PI_4 + input.y.to_radians() / 2.0).tan().ln();

        if x.is_finite() && y.is_finite() {
            Some(Coordinate { x, y })
        } else {
            None
        }
    }

    fn unproject(&self, input: Coordinate) -> Option<Coordinate> {
        let r = self.datum.semimajor();
        let lat = 2.0 * (input.y / r).exp().atan() - FRAC_PI_2;
        let lon = input.x / r;

        if lat.is_finite() && lon.is_finite() {
            Some(Coordinate {
                x: lon.to_degrees(),
                y: lat.to_degrees(),
            })
        } else {
            None
        }
    }
}
