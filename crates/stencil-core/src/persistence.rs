//! Scene document serialization.
//!
//! The on-disk format is a versioned JSON object:
//!
//! ```json
//! { "version": 1, "canvas": { "width": 800.0, ... }, "objects": [ { "type": "rectangle", ... } ] }
//! ```
//!
//! Objects are listed back to front. Documents without a `version` field are
//! read as version 1.

use crate::canvas::{Canvas, CanvasDocument, CanvasMeta};
use crate::shapes::Shape;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Current scene document version.
pub const SCENE_VERSION: u32 = 1;

/// File name offered for downloads.
pub const DOWNLOAD_FILE_NAME: &str = "canvas.json";

/// MIME type of saved documents.
pub const MIME_TYPE: &str = "application/json";

/// File extension accepted by the upload picker (without the dot).
pub const FILE_EXTENSION: &str = "json";

/// Errors raised while loading a scene document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Not a scene document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unsupported document version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Invalid document: {0}")]
    Invalid(String),
    #[error("Expected a .json file, got {0}")]
    WrongExtension(String),
    #[error("The view closed before the file finished loading")]
    StaleView,
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Serialized snapshot of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub canvas: CanvasMeta,
    #[serde(default)]
    pub objects: Vec<Shape>,
}

fn legacy_version() -> u32 {
    1
}

impl SceneDocument {
    /// Snapshot a live document.
    pub fn from_canvas(document: &CanvasDocument) -> Self {
        Self {
            version: SCENE_VERSION,
            canvas: document.meta.clone(),
            objects: document.shapes_ordered().cloned().collect(),
        }
    }

    /// Check version and geometry before the document reaches the scene.
    pub fn validate(&self) -> LoadResult<()> {
        if self.version > SCENE_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: self.version,
                supported: SCENE_VERSION,
            });
        }

        let canvas = &self.canvas;
        if !(canvas.width.is_finite() && canvas.width > 0.0)
            || !(canvas.height.is_finite() && canvas.height > 0.0)
        {
            return Err(LoadError::Invalid(format!(
                "canvas size {}x{} must be positive",
                canvas.width, canvas.height
            )));
        }

        let mut seen = HashSet::with_capacity(self.objects.len());
        for (index, shape) in self.objects.iter().enumerate() {
            if !seen.insert(shape.id()) {
                return Err(LoadError::Invalid(format!("duplicate object id {}", shape.id())));
            }
            if !shape.kind_matches_variant() {
                return Err(LoadError::Invalid(format!(
                    "object {} has kind {} which does not fit its type",
                    index,
                    shape.kind()
                )));
            }
            if !shape.geometry_is_valid() {
                return Err(LoadError::Invalid(format!(
                    "object {} ({}) has non-finite or negative geometry",
                    index,
                    shape.kind()
                )));
            }
        }
        Ok(())
    }

    /// Build a live document, validating first.
    pub fn into_canvas(self) -> LoadResult<CanvasDocument> {
        self.validate()?;
        let mut document = CanvasDocument::with_meta(self.canvas);
        for shape in self.objects {
            document.add_shape(shape);
        }
        Ok(document)
    }
}

/// Serialize a scene to pretty-printed JSON.
pub fn serialize(document: &CanvasDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SceneDocument::from_canvas(document))
}

/// Parse and validate a scene document.
pub fn deserialize(json: &str) -> LoadResult<CanvasDocument> {
    let scene: SceneDocument = serde_json::from_str(json)?;
    scene.into_canvas()
}

/// Parse a document and swap it into the live canvas.
///
/// The canvas is left untouched on failure. Returns the number of objects loaded.
pub fn load_into(canvas: &mut Canvas, json: &str) -> LoadResult<usize> {
    let document = deserialize(json)?;
    let count = document.len();
    canvas.replace_document(document);
    log::info!("Loaded scene with {} objects", count);
    Ok(count)
}

/// Reject uploads whose name does not end in `.json`.
pub fn check_extension(file_name: &str) -> LoadResult<()> {
    let accepted = std::path::Path::new(file_name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(FILE_EXTENSION))
        .unwrap_or(false);
    if accepted {
        Ok(())
    } else {
        Err(LoadError::WrongExtension(file_name.to_string()))
    }
}

/// Write a scene to disk.
#[cfg(not(target_arch = "wasm32"))]
pub fn save_to_path(document: &CanvasDocument, path: &std::path::Path) -> std::io::Result<()> {
    let json = serialize(document).map_err(std::io::Error::other)?;
    std::fs::write(path, json)?;
    log::info!("Saved scene to {}", path.display());
    Ok(())
}

/// Read and validate a scene from disk.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_from_path(path: &std::path::Path) -> LoadResult<CanvasDocument> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    deserialize(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PrimitiveKind;
    use crate::placement::{OverlapResolver, instantiate_raster, place, place_raster};
    use kurbo::Point;
    use tempfile::tempdir;

    fn sample_document() -> CanvasDocument {
        let mut doc = CanvasDocument::new();
        let resolver = OverlapResolver::default();
        for kind in [
            PrimitiveKind::Text,
            PrimitiveKind::Rectangle,
            PrimitiveKind::Button,
            PrimitiveKind::Oval,
            PrimitiveKind::Circle,
        ] {
            place(kind, Point::new(400.0, 200.0), &mut doc, &resolver).unwrap();
        }
        place_raster(
            instantiate_raster(PrimitiveKind::Icon, Point::new(10.0, 10.0), "/icon-icon.png", 32, 32),
            &mut doc,
        );
        doc
    }

    #[test]
    fn test_roundtrip_preserves_objects() {
        let doc = sample_document();
        let json = serialize(&doc).unwrap();
        let loaded = deserialize(&json).unwrap();

        assert_eq!(loaded.len(), doc.len());
        assert_eq!(loaded.meta, doc.meta);
        let original: Vec<_> = doc.shapes_ordered().collect();
        let restored: Vec<_> = loaded.shapes_ordered().collect();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_load_into_replaces_scene() {
        let json = serialize(&sample_document()).unwrap();
        let mut canvas = Canvas::new();
        canvas.take_redraw();

        let count = load_into(&mut canvas, &json).unwrap();
        assert_eq!(count, 6);
        assert_eq!(canvas.document.len(), 6);
        assert!(canvas.take_redraw());
    }

    #[test]
    fn test_malformed_json_leaves_scene_untouched() {
        let mut canvas = Canvas::new();
        canvas.document = sample_document();

        let result = load_into(&mut canvas, "{ not json");
        assert!(matches!(result, Err(LoadError::Parse(_))));
        assert_eq!(canvas.document.len(), 6);
    }

    #[test]
    fn test_unknown_object_type_is_parse_error() {
        let json = r#"{ "version": 1, "objects": [ { "type": "triangle" } ] }"#;
        assert!(matches!(deserialize(json), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_future_version_rejected() {
        let json = r#"{ "version": 7, "objects": [] }"#;
        assert!(matches!(
            deserialize(json),
            Err(LoadError::UnsupportedVersion { found: 7, supported: 1 })
        ));
    }

    #[test]
    fn test_missing_version_reads_as_legacy() {
        let doc = deserialize(r#"{ "objects": [] }"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.meta, CanvasMeta::default());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut scene = SceneDocument::from_canvas(&sample_document());
        let first = scene.objects[0].clone();
        scene.objects.push(first);
        assert!(matches!(scene.into_canvas(), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_kind_type_mismatch_rejected() {
        let mut value = serde_json::to_value(SceneDocument::from_canvas(&sample_document())).unwrap();
        let objects = value["objects"].as_array_mut().unwrap();
        let rect = objects.iter_mut().find(|o| o["type"] == "rectangle").unwrap();
        rect["kind"] = "circle".into();
        let image = objects.iter_mut().find(|o| o["type"] == "image").unwrap();
        image["kind"] = "rectangle".into();

        let json = value.to_string();
        assert!(matches!(deserialize(&json), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_bad_canvas_size_rejected() {
        let json = r#"{ "version": 1, "canvas": { "width": 0.0, "height": 10.0,
            "background": { "r": 0, "g": 0, "b": 0, "a": 255 } }, "objects": [] }"#;
        assert!(matches!(deserialize(json), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_check_extension() {
        assert!(check_extension("canvas.json").is_ok());
        assert!(check_extension("Canvas.JSON").is_ok());
        assert!(matches!(check_extension("canvas.png"), Err(LoadError::WrongExtension(_))));
        assert!(check_extension("json").is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DOWNLOAD_FILE_NAME);
        let doc = sample_document();

        save_to_path(&doc, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.len(), doc.len());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = load_from_path(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
