//! Text shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::palette::PrimitiveKind;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Horizontal alignment of lines inside the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of text bounding box).
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Line alignment.
    #[serde(default)]
    pub align: TextAlign,
    /// Style properties (fill is the glyph color).
    pub style: ShapeStyle,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Average glyph advance relative to the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.6;

    /// Line height relative to the font size.
    const LINE_HEIGHT_FACTOR: f64 = 1.16;

    /// Narrowest box a text object occupies.
    const MIN_WIDTH: f64 = 20.0;

    /// Create a new text shape.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            align: TextAlign::default(),
            style: ShapeStyle::default(),
        }
    }

    /// Set the alignment.
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Approximate width of the widest line.
    fn approximate_width(&self) -> f64 {
        let widest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        (widest as f64 * self.font_size * Self::CHAR_WIDTH_FACTOR).max(Self::MIN_WIDTH)
    }

    /// Approximate height of all lines.
    fn approximate_height(&self) -> f64 {
        let lines = self.content.lines().count().max(1);
        lines as f64 * self.font_size * Self::LINE_HEIGHT_FACTOR
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Text
    }

    fn position(&self) -> Point {
        self.position
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.approximate_width(),
            self.position.y + self.approximate_height(),
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
    fn test_text_bounds_single_line() {
        let text = Text::new(Point::new(0.0, 0.0), "Drag me!");
        let bounds = text.bounds();
        assert!((bounds.width() - 96.0).abs() < 1e-9);
        assert!((bounds.height() - 23.2).abs() < 1e-9);
    }

    #[test]
    fn test_text_bounds_multiline() {
        let text = Text::new(Point::new(10.0, 10.0), "ab\nabcd");
        let bounds = text.bounds();
        assert!((bounds.width() - 4.0 * 20.0 * 0.6).abs() < 1e-9);
        assert!((bounds.height() - 2.0 * 20.0 * 1.16).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_has_min_width() {
        let text = Text::new(Point::ZERO, "");
        assert!((text.bounds().width() - 20.0).abs() < f64::EPSILON);
        assert!(text.bounds().height() > 0.0);
    }

    #[test]
    fn test_align_defaults_when_missing() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "position": {"x": 1.0, "y": 2.0},
            "content": "hi",
            "font_size": 12.0,
            "style": {"fill_color": null}
        }"#;
        let text: Text = serde_json::from_str(json).unwrap();
        assert_eq!(text.align, TextAlign::Left);
        assert!((text.style.opacity - 1.0).abs() < f64::EPSILON);
    }
}
