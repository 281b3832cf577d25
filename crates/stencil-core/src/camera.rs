//! Camera module for the viewport zoom transform.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level that corresponds to "100%" in the UI.
pub const BASE_ZOOM: f64 = 1.0;

/// Smallest zoom level the toolbar can reach.
pub const MIN_ZOOM: f64 = 0.5;

/// Largest zoom level the toolbar can reach.
pub const MAX_ZOOM: f64 = 2.0;

/// Zoom change per toolbar click.
pub const ZOOM_STEP: f64 = 0.1;

/// Compute the next zoom level for a toolbar intent.
///
/// The sum is quantised to hundredths before clamping so that repeated
/// `ZOOM_STEP` increments land exactly on tenths.
pub fn zoom_level(current: f64, delta: f64, min: f64, max: f64) -> f64 {
    let next = ((current + delta) * 100.0).round() / 100.0;
    next.clamp(min, max)
}

/// Render a zoom level as an integer percentage.
pub fn zoom_percent(level: f64) -> u32 {
    (level * 100.0).round().max(0.0) as u32
}

/// Camera manages the view transform for the canvas.
///
/// It converts between screen coordinates (relative to the canvas surface)
/// and world coordinates (the scene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset.
    pub offset: Vec2,
    /// Current zoom level (BASE_ZOOM = 100% in UI).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: BASE_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom limits.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom: BASE_ZOOM.clamp(min_zoom, max_zoom),
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Set an absolute zoom level, keeping the given screen point fixed.
    pub fn zoom_to_point(&mut self, screen_point: Point, zoom: f64) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        // Convert screen point to world before zoom
        let world_point = self.screen_to_world(screen_point);

        self.zoom = new_zoom;

        // Adjust offset so world_point stays at screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset += Vec2::new(screen_point.x - new_screen.x, screen_point.y - new_screen.y);
    }

    /// Apply a toolbar zoom intent anchored at the viewport's geometric center.
    ///
    /// Returns the new zoom level.
    pub fn zoom_by(&mut self, delta: f64, viewport: Size) -> f64 {
        let level = zoom_level(self.zoom, delta, self.min_zoom, self.max_zoom);
        let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.zoom_to_point(center, level);
        // Keep the quantised level even when the point transform was a no-op.
        self.zoom = level;
        level
    }

    /// Current zoom as a percentage.
    pub fn percent(&self) -> u32 {
        zoom_percent(self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
        assert_eq!(camera.percent(), 100);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_level_clamp_sequence() {
        let mut level = 1.0;
        for _ in 0..9 {
            level = zoom_level(level, ZOOM_STEP, MIN_ZOOM, MAX_ZOOM);
        }
        assert_eq!(level, 1.9);
        level = zoom_level(level, ZOOM_STEP, MIN_ZOOM, MAX_ZOOM);
        assert_eq!(level, 2.0);
        level = zoom_level(level, ZOOM_STEP, MIN_ZOOM, MAX_ZOOM);
        assert_eq!(level, 2.0);
    }

    #[test]
    fn test_zoom_level_lower_clamp() {
        let mut level = 1.0;
        for _ in 0..20 {
            level = zoom_level(level, -ZOOM_STEP, MIN_ZOOM, MAX_ZOOM);
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&level));
        }
        assert_eq!(level, 0.5);
    }

    #[test]
    fn test_zoom_keeps_viewport_center_fixed() {
        let mut camera = Camera::new();
        let viewport = Size::new(800.0, 600.0);
        let center = Point::new(400.0, 300.0);
        let world_before = camera.screen_to_world(center);

        let level = camera.zoom_by(ZOOM_STEP, viewport);
        assert_eq!(level, 1.1);
        assert_eq!(camera.percent(), 110);

        let world_after = camera.screen_to_world(center);
        assert!((world_before.x - world_after.x).abs() < 1e-9);
        assert!((world_before.y - world_after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_percent_rounds() {
        assert_eq!(zoom_percent(0.5), 50);
        assert_eq!(zoom_percent(1.9000000000000004), 190);
        assert_eq!(zoom_percent(1.234), 123);
    }
}
