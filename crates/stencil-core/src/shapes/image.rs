//! Image shape for raster primitives (image and icon).

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::palette::PrimitiveKind;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raster image referenced by its static asset path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    /// Palette primitive (image or icon).
    pub kind: PrimitiveKind,
    /// Top-left corner position.
    pub position: Point,
    /// Asset path the pixels are loaded from.
    pub source: String,
    /// Decoded image width in pixels.
    pub source_width: u32,
    /// Decoded image height in pixels.
    pub source_height: u32,
    /// Display scale applied to both axes.
    pub scale: f64,
    /// Style properties (unused for fill, kept for opacity).
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Image {
    /// Create a new image shape at unit scale.
    pub fn new(
        kind: PrimitiveKind,
        position: Point,
        source: impl Into<String>,
        source_width: u32,
        source_height: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            source: source.into(),
            source_width,
            source_height,
            scale: 1.0,
            style: ShapeStyle::default(),
        }
    }

    /// Set the display scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Displayed width.
    pub fn width(&self) -> f64 {
        self.source_width as f64 * self.scale
    }

    /// Displayed height.
    pub fn height(&self) -> f64 {
        self.source_height as f64 * self.scale
    }
}

impl ShapeTrait for Image {
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
            self.position.x + self.width(),
            self.position.y + self.height(),
        )
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
