//! Scene objects placed on the canvas.

mod ellipse;
mod image;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use image::Image;
pub use rectangle::Rectangle;
pub use text::{Text, TextAlign};

use crate::palette::PrimitiveKind;
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn blue() -> Self {
        Self::rgb(0, 0, 255)
    }

    pub const fn green() -> Self {
        Self::rgb(0, 128, 0)
    }

    pub const fn purple() -> Self {
        Self::rgb(128, 0, 128)
    }

    pub const fn yellow() -> Self {
        Self::rgb(255, 255, 0)
    }

    /// Parse a `#rrggbb` or `#rrggbbaa` hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Format as `#rrggbb` (alpha is appended only when not opaque).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for scene objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// A solid fill.
    pub fn filled(color: SerializableColor) -> Self {
        Self {
            fill_color: Some(color),
            ..Self::default()
        }
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| {
            let alpha = (c.a as f64 * self.opacity.clamp(0.0, 1.0)) as u8;
            Color::from_rgba8(c.r, c.g, c.b, alpha)
        })
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Common trait for all scene objects.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// The palette primitive this object was created from.
    fn kind(&self) -> PrimitiveKind;

    /// Top-left corner of the bounding box.
    fn position(&self) -> Point;

    /// Get the axis-aligned bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Move the object by a delta.
    fn translate(&mut self, delta: Vec2);
}

/// Enum wrapper for all scene object types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Text(Text),
    Image(Image),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Ellipse(s) => s.id(),
            Shape::Text(s) => s.id(),
            Shape::Image(s) => s.id(),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Shape::Rectangle(s) => s.kind(),
            Shape::Ellipse(s) => s.kind(),
            Shape::Text(s) => s.kind(),
            Shape::Image(s) => s.kind(),
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Shape::Rectangle(s) => s.position(),
            Shape::Ellipse(s) => s.position(),
            Shape::Text(s) => s.position(),
            Shape::Image(s) => s.position(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Ellipse(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
            Shape::Image(s) => s.bounds(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style(),
            Shape::Ellipse(s) => s.style(),
            Shape::Text(s) => s.style(),
            Shape::Image(s) => s.style(),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Rectangle(s) => s.translate(delta),
            Shape::Ellipse(s) => s.translate(delta),
            Shape::Text(s) => s.translate(delta),
            Shape::Image(s) => s.translate(delta),
        }
    }

    /// Check that every coordinate and size is finite and non-negative where required.
    pub(crate) fn geometry_is_valid(&self) -> bool {
        let bounds = self.bounds();
        let finite = [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
            .iter()
            .all(|v| v.is_finite());
        finite && bounds.width() >= 0.0 && bounds.height() >= 0.0
    }

    /// Check that the primitive kind is one this variant can represent.
    pub(crate) fn kind_matches_variant(&self) -> bool {
        matches!(
            (self, self.kind()),
            (Shape::Rectangle(_), PrimitiveKind::Rectangle | PrimitiveKind::Button)
                | (Shape::Ellipse(_), PrimitiveKind::Oval | PrimitiveKind::Circle)
                | (Shape::Text(_), PrimitiveKind::Text)
                | (Shape::Image(_), PrimitiveKind::Image | PrimitiveKind::Icon)
        )
    }
}
