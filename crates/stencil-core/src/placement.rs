//! Drop placement: primitive construction and overlap avoidance.
//!
//! Vector primitives are built at the drop anchor with their default styling
//! and then shifted diagonally until their bounding box clears every object
//! already on the canvas. Raster primitives (image, icon) are only built once
//! their pixels are decoded and are committed where they land, without any
//! overlap check.

use crate::canvas::CanvasDocument;
use crate::palette::{PrimitiveKind, UnknownPrimitive};
use crate::shapes::{
    Ellipse, Image, Rectangle, SerializableColor, Shape, ShapeId, ShapeStyle, Text, TextAlign,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagonal offset applied per overlap shift.
pub const SHIFT_STEP: f64 = 50.0;

/// Shifts tried before a drop is rejected.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Display scale of raster primitives.
pub const RASTER_SCALE: f64 = 0.5;

/// Default content of a dropped text box.
pub const DEFAULT_TEXT: &str = "Drag me!";

/// Placement errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("Nothing is being dragged")]
    NoDragIntent,
    #[error(transparent)]
    UnknownPrimitive(#[from] UnknownPrimitive),
    #[error("No free space found after {attempts} shifts")]
    NoFreeSpace { attempts: usize },
    #[error("{0} must be decoded before it can be placed")]
    RequiresDecode(PrimitiveKind),
    #[error("The view closed before the {0} finished loading")]
    StaleView(PrimitiveKind),
}

/// Result type for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// How the nominal drop position is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    /// Use the drop point under the pointer.
    #[default]
    Pointer,
    /// Ignore the pointer and stack drops in a fixed column:
    /// `(origin.x, origin.y + objects * step)`.
    Stacked { origin: Point, step: f64 },
}

impl AnchorMode {
    /// The column layout of the first template builder release.
    pub fn classic_column() -> Self {
        AnchorMode::Stacked {
            origin: Point::new(400.0, 200.0),
            step: 50.0,
        }
    }

    /// Compute the nominal anchor for a drop.
    pub fn anchor(&self, pointer: Point, object_count: usize) -> Point {
        match *self {
            AnchorMode::Pointer => pointer,
            AnchorMode::Stacked { origin, step } => {
                Point::new(origin.x, origin.y + object_count as f64 * step)
            }
        }
    }
}

/// Whether two boxes overlap. Touching edges count as overlapping.
pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || a.x0 > b.x1 || a.y1 < b.y0 || a.y0 > b.y1)
}

/// Iterative overlap resolver with a bounded number of shifts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapResolver {
    /// Offset applied per shift.
    pub step: Vec2,
    /// Shifts tried before giving up.
    pub max_attempts: usize,
}

impl Default for OverlapResolver {
    fn default() -> Self {
        Self {
            step: Vec2::new(SHIFT_STEP, SHIFT_STEP),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl OverlapResolver {
    pub fn new(step: f64, max_attempts: usize) -> Self {
        Self {
            step: Vec2::new(step, step),
            max_attempts,
        }
    }

    /// Find the offset that moves `candidate` clear of every obstacle.
    ///
    /// Each shift re-tests the whole obstacle set, so the result is the first
    /// position of `p, p + step, p + 2·step, …` that overlaps nothing.
    pub fn resolve(&self, candidate: Rect, obstacles: &[Rect]) -> PlacementResult<Vec2> {
        let mut offset = Vec2::ZERO;
        for attempt in 0..=self.max_attempts {
            let shifted = candidate + offset;
            if !obstacles.iter().any(|&other| boxes_overlap(shifted, other)) {
                if attempt > 0 {
                    log::debug!("Cleared overlap after {} shifts", attempt);
                }
                return Ok(offset);
            }
            offset += self.step;
        }
        Err(PlacementError::NoFreeSpace {
            attempts: self.max_attempts,
        })
    }
}

/// Build a vector primitive with its default styling at `anchor`.
///
/// Returns `None` for raster primitives, which need decoded dimensions.
pub fn instantiate(kind: PrimitiveKind, anchor: Point) -> Option<Shape> {
    let shape = match kind {
        PrimitiveKind::Text => Shape::Text(
            Text::new(anchor, DEFAULT_TEXT)
                .with_align(TextAlign::Center)
                .with_style(ShapeStyle::filled(SerializableColor::black())),
        ),
        PrimitiveKind::Rectangle => Shape::Rectangle(
            Rectangle::new(kind, Point::new(anchor.x - 50.0, anchor.y), 100.0, 50.0)
                .with_style(ShapeStyle::filled(SerializableColor::blue())),
        ),
        PrimitiveKind::Button => Shape::Rectangle(
            Rectangle::new(kind, Point::new(anchor.x - 50.0, anchor.y), 100.0, 50.0)
                .with_corner_radius(10.0)
                .with_style(ShapeStyle::filled(SerializableColor::green())),
        ),
        PrimitiveKind::Oval => Shape::Ellipse(
            Ellipse::new(kind, anchor, 50.0, 30.0)
                .with_style(ShapeStyle::filled(SerializableColor::purple())),
        ),
        PrimitiveKind::Circle => Shape::Ellipse(
            Ellipse::circle(anchor, 40.0).with_style(ShapeStyle::filled(SerializableColor::yellow())),
        ),
        PrimitiveKind::Image | PrimitiveKind::Icon => return None,
    };
    Some(shape)
}

/// Build a raster primitive once its source dimensions are known.
///
/// Images are centered horizontally on the anchor; icons hang from it.
pub fn instantiate_raster(
    kind: PrimitiveKind,
    anchor: Point,
    source: &str,
    source_width: u32,
    source_height: u32,
) -> Image {
    let x = match kind {
        PrimitiveKind::Image => anchor.x - source_width as f64 * RASTER_SCALE / 2.0,
        _ => anchor.x,
    };
    Image::new(kind, Point::new(x, anchor.y), source, source_width, source_height)
        .with_scale(RASTER_SCALE)
}

/// Build a vector primitive, move it clear of existing objects and commit it.
pub fn place(
    kind: PrimitiveKind,
    anchor: Point,
    document: &mut CanvasDocument,
    resolver: &OverlapResolver,
) -> PlacementResult<ShapeId> {
    let mut shape = instantiate(kind, anchor).ok_or(PlacementError::RequiresDecode(kind))?;
    let obstacles: Vec<Rect> = document.shapes_ordered().map(Shape::bounds).collect();
    let offset = resolver.resolve(shape.bounds(), &obstacles)?;
    shape.translate(offset);

    let id = shape.id();
    log::debug!("Placed {} at {:?}", kind, shape.position());
    document.add_shape(shape);
    Ok(id)
}

/// Commit a decoded raster primitive as-is. No overlap resolution is applied.
pub fn place_raster(image: Image, document: &mut CanvasDocument) -> ShapeId {
    let id = image.id;
    log::debug!("Placed {} at {:?} without overlap check", image.kind, image.position);
    document.add_shape(Shape::Image(image));
    id
}
