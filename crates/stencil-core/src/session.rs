//! Editor session: the scoped owner of one scene.
//!
//! A session is created when the editor view opens and dropped when it
//! closes. Dropping it disposes its [`ViewLifetime`], so image decodes and
//! file reads that complete afterwards are rejected instead of touching a
//! scene that no longer exists.

use crate::canvas::Canvas;
use crate::config::EditorConfig;
use crate::lifecycle::{LifetimeToken, ViewLifetime};
use crate::palette::{PrimitiveKind, descriptor};
use crate::persistence::{self, LoadError, LoadResult};
use crate::placement::{
    self, AnchorMode, OverlapResolver, PlacementError, PlacementResult, instantiate_raster,
};
use crate::shapes::ShapeId;
use kurbo::Point;

/// Result of dropping a primitive on the canvas.
#[derive(Debug, Clone)]
pub enum DropOutcome {
    /// A vector primitive was committed.
    Placed(ShapeId),
    /// A raster primitive is waiting for its asset to decode.
    Pending(PendingImage),
}

/// Ticket for a raster primitive whose pixels are still loading.
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub kind: PrimitiveKind,
    /// Asset path to decode.
    pub source: &'static str,
    /// World-space anchor of the drop.
    pub anchor: Point,
    token: LifetimeToken,
}

impl PendingImage {
    pub fn token(&self) -> &LifetimeToken {
        &self.token
    }
}

/// Ticket for an upload whose contents are still being read.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    token: LifetimeToken,
}

impl PendingLoad {
    pub fn token(&self) -> &LifetimeToken {
        &self.token
    }
}

/// The live editor: scene, viewport, drag intent and placement policy.
#[derive(Debug)]
pub struct EditorSession {
    canvas: Canvas,
    resolver: OverlapResolver,
    anchor: AnchorMode,
    zoom_step: f64,
    lifetime: ViewLifetime,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::open(&EditorConfig::default())
    }
}

impl EditorSession {
    /// Open a session with a fresh, empty scene.
    pub fn open(config: &EditorConfig) -> Self {
        let lifetime = ViewLifetime::new();
        log::debug!("Opening editor view {}", lifetime.id());
        Self {
            canvas: Canvas::from_config(config),
            resolver: OverlapResolver::new(config.shift_step, config.max_placement_attempts),
            anchor: config.anchor,
            zoom_step: config.zoom_step,
            lifetime,
        }
    }

    /// Close the session. Outstanding tickets become stale.
    pub fn close(self) {
        log::debug!("Closing editor view {}", self.lifetime.id());
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Token tied to this session's lifetime.
    pub fn lifetime_token(&self) -> LifetimeToken {
        self.lifetime.token()
    }

    /// Palette drag-start: remember what is being dragged.
    pub fn begin_drag(&mut self, kind: PrimitiveKind) {
        self.canvas.drag.begin(kind);
    }

    /// The primitive currently being dragged, if any.
    pub fn drag_intent(&self) -> Option<PrimitiveKind> {
        self.canvas.drag.current()
    }

    /// Drop the dragged primitive at a point on the canvas surface.
    pub fn drop_at(&mut self, screen_point: Point) -> PlacementResult<DropOutcome> {
        let kind = self.canvas.drag.current().ok_or(PlacementError::NoDragIntent)?;
        self.drop_kind(kind, screen_point)
    }

    /// Drop a primitive named by a drag payload.
    pub fn drop_named(&mut self, name: &str, screen_point: Point) -> PlacementResult<DropOutcome> {
        let kind: PrimitiveKind = name.parse()?;
        self.drop_kind(kind, screen_point)
    }

    fn drop_kind(&mut self, kind: PrimitiveKind, screen_point: Point) -> PlacementResult<DropOutcome> {
        let world = self.canvas.camera.screen_to_world(screen_point);
        let anchor = self.anchor.anchor(world, self.canvas.document.len());

        if kind.is_raster() {
            self.canvas.drag.clear();
            return Ok(DropOutcome::Pending(PendingImage {
                kind,
                source: descriptor(kind).icon_path,
                anchor,
                token: self.lifetime.token(),
            }));
        }

        let id = placement::place(kind, anchor, &mut self.canvas.document, &self.resolver)?;
        self.canvas.drag.clear();
        self.canvas.request_redraw();
        Ok(DropOutcome::Placed(id))
    }

    /// Commit a raster primitive once its asset has decoded.
    ///
    /// The image lands at its anchor even if that overlaps other objects.
    pub fn finish_image(
        &mut self,
        pending: PendingImage,
        source_width: u32,
        source_height: u32,
    ) -> PlacementResult<ShapeId> {
        if !pending.token.is_valid_for(&self.lifetime) {
            log::warn!("Dropping late {} decode for a closed view", pending.kind);
            return Err(PlacementError::StaleView(pending.kind));
        }
        let image = instantiate_raster(
            pending.kind,
            pending.anchor,
            pending.source,
            source_width,
            source_height,
        );
        let id = placement::place_raster(image, &mut self.canvas.document);
        self.canvas.request_redraw();
        Ok(id)
    }

    /// Serialize the scene for download.
    pub fn save(&self) -> Result<String, serde_json::Error> {
        persistence::serialize(&self.canvas.document)
    }

    /// Replace the scene with a parsed document.
    pub fn load(&mut self, json: &str) -> LoadResult<usize> {
        persistence::load_into(&mut self.canvas, json)
    }

    /// Start an upload.
    pub fn begin_load(&self) -> PendingLoad {
        PendingLoad {
            token: self.lifetime.token(),
        }
    }

    /// Finish an upload once the picked file has been read.
    ///
    /// Rejects files without a `.json` extension.
    pub fn finish_load(&mut self, pending: PendingLoad, file_name: &str, json: &str) -> LoadResult<usize> {
        if !pending.token.is_valid_for(&self.lifetime) {
            log::warn!("Dropping late read of {} for a closed view", file_name);
            return Err(LoadError::StaleView);
        }
        persistence::check_extension(file_name)?;
        self.load(json)
    }

    /// Zoom in one step at the viewport center. Returns the new level.
    pub fn zoom_in(&mut self) -> f64 {
        self.canvas.zoom_by(self.zoom_step)
    }

    /// Zoom out one step at the viewport center. Returns the new level.
    pub fn zoom_out(&mut self) -> f64 {
        self.canvas.zoom_by(-self.zoom_step)
    }

    /// Current zoom as a whole percentage.
    pub fn zoom_percent(&self) -> u32 {
        self.canvas.camera.percent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::boxes_overlap;
    use crate::shapes::{SerializableColor, Shape};

    fn stacked_session() -> EditorSession {
        EditorSession::open(&EditorConfig {
            anchor: AnchorMode::classic_column(),
            ..EditorConfig::default()
        })
    }

    fn placed(outcome: DropOutcome) -> ShapeId {
        match outcome {
            DropOutcome::Placed(id) => id,
            DropOutcome::Pending(p) => panic!("expected placement, got pending {}", p.kind),
        }
    }

    fn pending(outcome: DropOutcome) -> PendingImage {
        match outcome {
            DropOutcome::Pending(p) => p,
            DropOutcome::Placed(_) => panic!("expected pending image"),
        }
    }

    #[test]
    fn test_drop_without_intent() {
        let mut session = EditorSession::default();
        assert!(matches!(
            session.drop_at(Point::new(10.0, 10.0)),
            Err(PlacementError::NoDragIntent)
        ));
    }

    #[test]
    fn test_drop_unknown_name() {
        let mut session = EditorSession::default();
        let err = session.drop_named("hexagon", Point::ZERO).unwrap_err();
        assert!(matches!(err, PlacementError::UnknownPrimitive(_)));
        assert!(session.canvas().document.is_empty());
    }

    #[test]
    fn test_drop_places_and_clears_intent() {
        let mut session = EditorSession::default();
        session.canvas_mut().take_redraw();
        session.begin_drag(PrimitiveKind::Circle);

        let id = placed(session.drop_at(Point::new(120.0, 80.0)).unwrap());
        assert_eq!(session.drag_intent(), None);
        assert!(session.canvas_mut().take_redraw());

        let Some(Shape::Ellipse(circle)) = session.canvas().document.get_shape(id) else {
            panic!("circle expected")
        };
        assert_eq!(circle.radius_x, 40.0);
        assert_eq!(circle.position, Point::new(120.0, 80.0));
        assert_eq!(circle.style.fill_color, Some(SerializableColor::yellow()));
    }

    #[test]
    fn test_drop_point_respects_zoom() {
        let mut session = EditorSession::default();
        session.canvas_mut().set_viewport_size(800.0, 600.0);
        session.zoom_in();
        let world = session.canvas().camera.screen_to_world(Point::new(500.0, 300.0));

        session.begin_drag(PrimitiveKind::Oval);
        let id = placed(session.drop_at(Point::new(500.0, 300.0)).unwrap());
        let position = session.canvas().document.get_shape(id).unwrap().position();
        assert!((position.x - world.x).abs() < 1e-9);
        assert!((position.y - world.y).abs() < 1e-9);
    }

    #[test]
    fn test_stacked_drops_never_overlap() {
        let mut session = stacked_session();
        for kind in [
            PrimitiveKind::Rectangle,
            PrimitiveKind::Button,
            PrimitiveKind::Text,
            PrimitiveKind::Oval,
            PrimitiveKind::Circle,
            PrimitiveKind::Rectangle,
        ] {
            session.begin_drag(kind);
            let id = placed(session.drop_at(Point::ZERO).unwrap());
            let doc = &session.canvas().document;
            let bounds = doc.get_shape(id).unwrap().bounds();
            assert!(
                doc.shapes_ordered()
                    .filter(|s| s.id() != id)
                    .all(|s| !boxes_overlap(bounds, s.bounds()))
            );
        }
    }

    #[test]
    fn test_image_drop_is_deferred_and_may_overlap() {
        let mut session = stacked_session();
        session.begin_drag(PrimitiveKind::Rectangle);
        let rect_id = placed(session.drop_at(Point::ZERO).unwrap());

        session.begin_drag(PrimitiveKind::Image);
        let ticket = pending(session.drop_at(Point::ZERO).unwrap());
        assert_eq!(ticket.source, "/image-icon.png");
        assert_eq!(session.drag_intent(), None);
        assert_eq!(session.canvas().document.len(), 1);

        // Stacked anchor for the second object: (400, 250), overlapping the rectangle.
        let image_id = session.finish_image(ticket, 100, 100).unwrap();
        let doc = &session.canvas().document;
        let image = doc.get_shape(image_id).unwrap();
        assert_eq!(image.position(), Point::new(375.0, 250.0));
        assert!(boxes_overlap(image.bounds(), doc.get_shape(rect_id).unwrap().bounds()));
    }

    #[test]
    fn test_icon_completion_after_close_is_stale() {
        let mut session = EditorSession::default();
        session.begin_drag(PrimitiveKind::Icon);
        let ticket = pending(session.drop_at(Point::ZERO).unwrap());
        let token = ticket.token().clone();
        session.close();
        assert!(!token.is_alive());

        // A new view must not accept the old ticket either.
        let mut next = EditorSession::default();
        assert_eq!(
            next.finish_image(ticket, 10, 10),
            Err(PlacementError::StaleView(PrimitiveKind::Icon))
        );
        assert!(next.canvas().document.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut session = stacked_session();
        for kind in [PrimitiveKind::Text, PrimitiveKind::Button, PrimitiveKind::Circle] {
            session.begin_drag(kind);
            session.drop_at(Point::ZERO).unwrap();
        }
        let json = session.save().unwrap();

        let mut restored = EditorSession::default();
        let ticket = restored.begin_load();
        assert_eq!(restored.finish_load(ticket, "canvas.json", &json).unwrap(), 3);

        let a: Vec<_> = session.canvas().document.shapes_ordered().collect();
        let b: Vec<_> = restored.canvas().document.shapes_ordered().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_rejects_wrong_extension_and_stale_reads() {
        let mut session = EditorSession::default();
        let ticket = session.begin_load();
        assert!(matches!(
            session.finish_load(ticket, "canvas.txt", "{}"),
            Err(LoadError::WrongExtension(_))
        ));

        let ticket = session.begin_load();
        session.close();
        let mut next = EditorSession::default();
        assert!(matches!(next.finish_load(ticket, "canvas.json", "{}"), Err(LoadError::StaleView)));
    }

    #[test]
    fn test_zoom_steps() {
        let mut session = EditorSession::default();
        for _ in 0..9 {
            session.zoom_in();
        }
        assert_eq!(session.zoom_percent(), 190);
        assert_eq!(session.zoom_in(), 2.0);
        assert_eq!(session.zoom_in(), 2.0);
        for _ in 0..30 {
            session.zoom_out();
        }
        assert_eq!(session.zoom_percent(), 50);
    }
}
