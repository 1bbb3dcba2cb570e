#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to `other`; compared against squared thresholds to skip the root.
    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    /// Linear interpolation toward `to`; `t >= 1` lands exactly on `to`.
    #[must_use]
    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(lerp(self.x, to.x, t), lerp(self.y, to.y, t))
    }
}

/// Width and height in either screen or world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Camera state for the board.
///
/// `x` / `y` are the world-space point aligned with the viewport's top-left
/// corner. `zoom` is a uniform scale factor (1.0 = one world unit per pixel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// The camera that shows `world` under `screen` at the given zoom.
    #[must_use]
    pub fn anchored(world: Point, screen: Point, zoom: f64) -> Self {
        Self { x: world.x - screen.x / zoom, y: world.y - screen.y / zoom, zoom }
    }

    /// Convert a screen-space point (viewport pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point { x: self.x + screen.x / self.zoom, y: self.y + screen.y / self.zoom }
    }

    /// Convert a world-space point to screen coordinates (viewport pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point { x: (world.x - self.x) * self.zoom, y: (world.y - self.y) * self.zoom }
    }

    /// Scroll-container offsets that correspond to this camera.
    #[must_use]
    pub fn scroll_offset(&self) -> Point {
        Point::new(self.x * self.zoom, self.y * self.zoom)
    }

    /// World-space extent visible through a viewport of the given size.
    #[must_use]
    pub fn visible_size(&self, viewport: Size) -> Size {
        Size::new(viewport.width / self.zoom, viewport.height / self.zoom)
    }
}

/// Linear interpolation; `t >= 1` returns `to` exactly.
#[must_use]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    if t >= 1.0 { to } else { from + (to - from) * t }
}
