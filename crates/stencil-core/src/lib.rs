//! Stencil Core Library
//!
//! Platform-agnostic scene model for the Stencil template builder: the
//! primitive palette, drop placement with overlap avoidance, the zoom
//! camera and JSON scene documents.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod lifecycle;
pub mod palette;
pub mod persistence;
pub mod placement;
pub mod session;
pub mod shapes;

pub use camera::Camera;
pub use canvas::{Canvas, CanvasDocument, CanvasMeta};
pub use config::{ConfigError, EditorConfig};
pub use lifecycle::{LifetimeToken, ViewLifetime};
pub use palette::{DragIntent, PALETTE, PrimitiveDescriptor, PrimitiveKind, UnknownPrimitive};
pub use persistence::{LoadError, LoadResult, SceneDocument};
pub use placement::{AnchorMode, OverlapResolver, PlacementError, PlacementResult};
pub use session::{DropOutcome, EditorSession, PendingImage, PendingLoad};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeStyle, ShapeTrait};
