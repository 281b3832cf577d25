//! Placeable primitives and the drag intent that carries one to the canvas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of primitives offered in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Image,
    Button,
    Text,
    Icon,
    Oval,
    Rectangle,
    Circle,
}

impl PrimitiveKind {
    /// Name used in drag payloads and scene documents.
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Image => "image",
            PrimitiveKind::Button => "button",
            PrimitiveKind::Text => "text",
            PrimitiveKind::Icon => "icon",
            PrimitiveKind::Oval => "oval",
            PrimitiveKind::Rectangle => "rectangle",
            PrimitiveKind::Circle => "circle",
        }
    }

    /// Whether instances are backed by a decoded raster asset.
    ///
    /// Raster primitives are built asynchronously and skip overlap resolution.
    pub fn is_raster(&self) -> bool {
        matches!(self, PrimitiveKind::Image | PrimitiveKind::Icon)
    }

    /// Get all primitive kinds in palette order.
    pub fn all() -> &'static [PrimitiveKind] {
        &[
            PrimitiveKind::Image,
            PrimitiveKind::Button,
            PrimitiveKind::Text,
            PrimitiveKind::Icon,
            PrimitiveKind::Oval,
            PrimitiveKind::Rectangle,
            PrimitiveKind::Circle,
        ]
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A drag payload named no known primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown primitive: {0}")]
pub struct UnknownPrimitive(pub String);

impl FromStr for PrimitiveKind {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownPrimitive(s.to_string()))
    }
}

/// A palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveDescriptor {
    pub kind: PrimitiveKind,
    pub label: &'static str,
    /// Static asset path of the tile icon (also the source of raster primitives).
    pub icon_path: &'static str,
}

/// The palette table, in display order.
pub const PALETTE: [PrimitiveDescriptor; 7] = [
    PrimitiveDescriptor { kind: PrimitiveKind::Image, label: "Image", icon_path: "/image-icon.png" },
    PrimitiveDescriptor { kind: PrimitiveKind::Button, label: "Button", icon_path: "/button-icon.png" },
    PrimitiveDescriptor { kind: PrimitiveKind::Text, label: "Text", icon_path: "/text-icon.png" },
    PrimitiveDescriptor { kind: PrimitiveKind::Icon, label: "Icon", icon_path: "/icon-icon.png" },
    PrimitiveDescriptor { kind: PrimitiveKind::Oval, label: "Oval", icon_path: "/oval-icon.png" },
    PrimitiveDescriptor { kind: PrimitiveKind::Rectangle, label: "Rectangle", icon_path: "/rectangle-icon.png" },
    PrimitiveDescriptor { kind: PrimitiveKind::Circle, label: "Circle", icon_path: "/circle-icon.png" },
];

/// Look up the descriptor for a kind.
pub fn descriptor(kind: PrimitiveKind) -> &'static PrimitiveDescriptor {
    let row = match kind {
        PrimitiveKind::Image => 0,
        PrimitiveKind::Button => 1,
        PrimitiveKind::Text => 2,
        PrimitiveKind::Icon => 3,
        PrimitiveKind::Oval => 4,
        PrimitiveKind::Rectangle => 5,
        PrimitiveKind::Circle => 6,
    };
    &PALETTE[row]
}

/// Report a drag-start on the palette tile at `index` to the parent.
///
/// The palette keeps no state: it only relays the tile's kind.
/// Returns false if `index` is out of range.
pub fn relay_drag_start<E>(index: usize, event: E, on_drag_start: impl FnOnce(E, PrimitiveKind)) -> bool {
    match PALETTE.get(index) {
        Some(descriptor) => {
            on_drag_start(event, descriptor.kind);
            true
        }
        None => false,
    }
}

/// Which primitive is currently being dragged, between drag-start and drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragIntent {
    kind: Option<PrimitiveKind>,
}

impl DragIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a drag-start. Overwrites any stale intent.
    pub fn begin(&mut self, kind: PrimitiveKind) {
        self.kind = Some(kind);
    }

    /// The pending kind, if any.
    pub fn current(&self) -> Option<PrimitiveKind> {
        self.kind
    }

    /// Clear the intent after a successful drop.
    pub fn clear(&mut self) {
        self.kind = None;
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }
}
