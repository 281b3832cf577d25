//! Canvas document and scene state.

use crate::camera::Camera;
use crate::config::{DEFAULT_BACKGROUND, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, EditorConfig};
use crate::palette::DragIntent;
use crate::shapes::{SerializableColor, Shape, ShapeId};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canvas-level metadata stored alongside the objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasMeta {
    /// Surface width in world units.
    pub width: f64,
    /// Surface height in world units.
    pub height: f64,
    /// Surface background color.
    pub background: SerializableColor,
}

impl Default for CanvasMeta {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl CanvasMeta {
    /// The surface as a world-space rectangle anchored at the origin.
    pub fn surface(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// The scene: every placed object plus canvas metadata.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    /// Canvas metadata.
    pub meta: CanvasMeta,
    /// All shapes in the document, keyed by ID.
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    z_order: Vec<ShapeId>,
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with the given metadata.
    pub fn with_meta(meta: CanvasMeta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    /// Add a shape to the front of the document.
    pub fn add_shape(&mut self, shape: Shape) {
        let id = shape.id();
        if self.shapes.insert(id, shape).is_none() {
            self.z_order.push(id);
        }
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// IDs in z-order (back to front).
    pub fn z_order(&self) -> &[ShapeId] {
        &self.z_order
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The scene being edited.
    pub document: CanvasDocument,
    /// Camera for the viewport transform.
    pub camera: Camera,
    /// Viewport size in screen units.
    pub viewport_size: Size,
    /// Pending palette drag.
    pub drag: DragIntent,
    /// Set when the scene changed and the host should repaint.
    needs_redraw: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_document(CanvasDocument::new())
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: CanvasDocument) -> Self {
        let viewport_size = Size::new(document.meta.width, document.meta.height);
        Self {
            document,
            camera: Camera::new(),
            viewport_size,
            drag: DragIntent::new(),
            needs_redraw: true,
        }
    }

    /// Create a canvas configured from editor settings.
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut canvas = Self::with_document(CanvasDocument::with_meta(CanvasMeta {
            width: config.canvas_width,
            height: config.canvas_height,
            background: config.background,
        }));
        canvas.camera = Camera::with_limits(config.min_zoom, config.max_zoom);
        canvas
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    /// Swap in a new scene (e.g. after loading a document).
    pub fn replace_document(&mut self, document: CanvasDocument) {
        self.document = document;
        self.request_redraw();
    }

    /// Ask the host to repaint on its next frame.
    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Consume the pending repaint request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Apply a toolbar zoom intent at the viewport center. Returns the new level.
    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        let level = self.camera.zoom_by(delta, self.viewport_size);
        self.request_redraw();
        level
    }
}
