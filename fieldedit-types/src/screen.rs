//! Screen-space primitives. Screen coordinates are in pixels with the origin in the top-left
//! corner and the `y` axis pointing down.

use serde::{Deserialize, Serialize};

/// Point on the screen in pixels.
pub type ScreenPoint = nalgebra::Point2<f64>;

/// Size of a screen area in pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Half of the size, i.e. the offset of the center from the top-left corner.
    pub fn half(&self) -> Self {
        Self {
            width: self.width / 2.0,
            height: self.height / 2.0,
        }
    }

    /// Returns true if either dimension is zero.
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Rectangle on the screen.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl ScreenRect {
    /// Creates the rectangle spanned by two opposite corners in any order.
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Left edge.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.right
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Top-left corner.
    pub fn top_left(&self) -> ScreenPoint {
        ScreenPoint::new(self.left, self.top)
    }

    /// Bottom-right corner.
    pub fn bottom_right(&self) -> ScreenPoint {
        ScreenPoint::new(self.right, self.bottom)
    }

    /// Returns true if both dimensions are strictly larger than `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.width() > threshold && self.height() > threshold
    }
}
