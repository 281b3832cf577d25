//! Ellipse shape (oval and circle primitives).

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::palette::PrimitiveKind;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned ellipse, positioned by the top-left of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    /// Palette primitive (oval or circle).
    pub kind: PrimitiveKind,
    /// Top-left corner of the bounding box.
    pub position: Point,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(kind: PrimitiveKind, position: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            radius_x,
            radius_y,
            style: ShapeStyle::default(),
        }
    }

    /// Create a circle.
    pub fn circle(position: Point, radius: f64) -> Self {
        Self::new(PrimitiveKind::Circle, position, radius, radius)
    }

    /// Set the style.
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Center of the ellipse.
    pub fn center(&self) -> Point {
        Point::new(self.position.x + self.radius_x, self.position.y + self.radius_y)
    }

    /// Whether both radii are equal.
    pub fn is_circle(&self) -> bool {
        (self.radius_x - self.radius_y).abs() < f64::EPSILON
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn position(&self) -> Point {
        self.position
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + 2.0 * self.radius_x,
            self.position.y + 2.0 * self.radius_y,
        )
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_creation() {
        let ellipse = Ellipse::new(PrimitiveKind::Oval, Point::new(50.0, 50.0), 30.0, 20.0);
        assert!((ellipse.position.x - 50.0).abs() < f64::EPSILON);
        assert!((ellipse.radius_x - 30.0).abs() < f64::EPSILON);
        assert!((ellipse.radius_y - 20.0).abs() < f64::EPSILON);
        assert!(!ellipse.is_circle());
    }

    #[test]
    fn test_circle() {
        let circle = Ellipse::circle(Point::new(0.0, 0.0), 10.0);
        assert!(circle.is_circle());
        assert_eq!(circle.kind, PrimitiveKind::Circle);
        assert_eq!(circle.center(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_bounds() {
        let ellipse = Ellipse::new(PrimitiveKind::Oval, Point::new(20.0, 30.0), 50.0, 30.0);
        let bounds = ellipse.bounds();
        assert!((bounds.x0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 30.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 120.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 90.0).abs() < f64::EPSILON);
    }
}
