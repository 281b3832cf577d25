//! UI components using egui.

use egui::{
    Align2, Color32, Context, CornerRadius, FontId, Frame, Margin, Pos2, Rect, Sense, Stroke,
    StrokeKind, Vec2,
};
use stencil_core::camera::Camera;
use stencil_core::canvas::Canvas;
use stencil_core::palette::{PALETTE, PrimitiveKind, relay_drag_start};
use stencil_core::shapes::{SerializableColor, Shape, ShapeStyle, TextAlign};

/// Width of the palette side panel.
const PALETTE_WIDTH: f32 = 132.0;

/// Status line shown in the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

/// UI state that persists between frames.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Last status message.
    pub status: Option<Status>,
    /// Zoom shown in the toolbar, in percent.
    pub zoom_percent: u32,
    /// True while an image decode or upload is outstanding.
    pub busy: bool,
}

impl UiState {
    pub fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: true,
        });
    }
}

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// A palette tile started dragging.
    BeginDrag(PrimitiveKind),
    /// A palette tile was released over the canvas, at a point relative to
    /// the canvas surface.
    Drop(kurbo::Point),
    /// Close the current view and start a blank canvas.
    NewCanvas,
    /// Save the scene as `canvas.json`.
    SaveDocument,
    /// Pick a scene document to load.
    LoadDocument,
    /// Zoom in.
    ZoomIn,
    /// Zoom out.
    ZoomOut,
}

/// Render the whole editor and return the actions triggered this frame.
///
/// Also reports the canvas viewport size so zoom can anchor at its center.
pub fn render_ui(ctx: &Context, ui_state: &UiState, canvas: &Canvas) -> (Vec<UiAction>, Vec2) {
    let mut actions = Vec::new();
    actions.extend(render_toolbar(ctx, ui_state));
    actions.extend(render_palette(ctx));
    let (drop, viewport) = render_canvas(ctx, canvas);
    actions.extend(drop);
    (actions, viewport)
}

/// Top toolbar: save, load, zoom controls and the status line.
fn render_toolbar(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let mut action = None;

    egui::TopBottomPanel::top("toolbar")
        .frame(
            Frame::new()
                .fill(Color32::from_rgba_unmultiplied(250, 250, 252, 250))
                .stroke(Stroke::new(1.0, Color32::from_gray(220)))
                .inner_margin(Margin::symmetric(12, 6)),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let text_color = Color32::from_gray(80);

                if ui.button("New").on_hover_text("Start a blank canvas").clicked() {
                    action = Some(UiAction::NewCanvas);
                }
                if ui.button("Save").on_hover_text("Download canvas.json").clicked() {
                    action = Some(UiAction::SaveDocument);
                }
                if ui.button("Load").on_hover_text("Open a saved canvas").clicked() {
                    action = Some(UiAction::LoadDocument);
                }

                ui.add_space(8.0);
                ui.label(egui::RichText::new("|").size(14.0).color(Color32::from_gray(200)));
                ui.add_space(8.0);

                let minus_response = ui.add(
                    egui::Label::new(egui::RichText::new("\u{2212}").size(16.0).color(text_color))
                        .sense(Sense::click()),
                );
                if minus_response.clicked() {
                    action = Some(UiAction::ZoomOut);
                }
                minus_response.clone().on_hover_text("Zoom out");
                minus_response.on_hover_cursor(egui::CursorIcon::PointingHand);

                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(format!("{}%", ui_state.zoom_percent))
                        .size(13.0)
                        .color(text_color),
                );
                ui.add_space(12.0);

                let plus_response = ui.add(
                    egui::Label::new(egui::RichText::new("+").size(16.0).color(text_color))
                        .sense(Sense::click()),
                );
                if plus_response.clicked() {
                    action = Some(UiAction::ZoomIn);
                }
                plus_response.clone().on_hover_text("Zoom in");
                plus_response.on_hover_cursor(egui::CursorIcon::PointingHand);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui_state.busy {
                        ui.spinner();
                    }
                    if let Some(status) = &ui_state.status {
                        let color = if status.is_error {
                            Color32::from_rgb(200, 40, 40)
                        } else {
                            text_color
                        };
                        ui.label(egui::RichText::new(&status.text).size(12.0).color(color));
                    }
                });
            });
        });

    action
}

/// Palette side panel with one draggable tile per primitive.
fn render_palette(ctx: &Context) -> Option<UiAction> {
    let mut action = None;

    egui::SidePanel::left("palette")
        .resizable(false)
        .exact_width(PALETTE_WIDTH)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.spacing_mut().item_spacing = Vec2::new(0.0, 6.0);

            for (index, descriptor) in PALETTE.iter().enumerate() {
                let id = egui::Id::new(("palette_tile", descriptor.kind.name()));
                let response = ui
                    .dnd_drag_source(id, descriptor.kind, |ui| {
                        tile_frame().show(ui, |ui| {
                            ui.set_width(PALETTE_WIDTH - 28.0);
                            ui.horizontal(|ui| {
                                paint_tile_glyph(ui, descriptor.kind);
                                ui.label(descriptor.label);
                            });
                        });
                    })
                    .response;

                if response.drag_started() {
                    relay_drag_start(index, &response, |_, kind| {
                        action = Some(UiAction::BeginDrag(kind));
                    });
                }
                response.on_hover_text(descriptor.icon_path);
            }
        });

    action
}

fn tile_frame() -> Frame {
    Frame::new()
        .fill(Color32::WHITE)
        .corner_radius(CornerRadius::same(6))
        .stroke(Stroke::new(1.0, Color32::from_gray(220)))
        .inner_margin(Margin::same(6))
}

/// Small preview drawn next to a tile label.
fn paint_tile_glyph(ui: &mut egui::Ui, kind: PrimitiveKind) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(18.0), Sense::hover());
    let painter = ui.painter();
    let gray = Color32::from_gray(140);
    match kind {
        PrimitiveKind::Rectangle => {
            painter.rect_filled(rect.shrink2(Vec2::new(0.0, 4.0)), 0.0, to_color32(SerializableColor::blue()));
        }
        PrimitiveKind::Button => {
            painter.rect_filled(
                rect.shrink2(Vec2::new(0.0, 4.0)),
                CornerRadius::same(4),
                to_color32(SerializableColor::green()),
            );
        }
        PrimitiveKind::Oval => {
            painter.add(egui::Shape::ellipse_filled(
                rect.center(),
                Vec2::new(9.0, 5.5),
                to_color32(SerializableColor::purple()),
            ));
        }
        PrimitiveKind::Circle => {
            painter.circle_filled(rect.center(), 8.0, to_color32(SerializableColor::yellow()));
        }
        PrimitiveKind::Text => {
            painter.text(rect.center(), Align2::CENTER_CENTER, "T", FontId::proportional(16.0), gray);
        }
        PrimitiveKind::Image | PrimitiveKind::Icon => {
            painter.rect_stroke(rect.shrink(2.0), CornerRadius::same(2), Stroke::new(1.5, gray), StrokeKind::Inside);
        }
    }
}

/// The canvas surface. Returns a drop action and the viewport size.
fn render_canvas(ctx: &Context, canvas: &Canvas) -> (Option<UiAction>, Vec2) {
    let mut action = None;
    let mut viewport = Vec2::ZERO;

    egui::CentralPanel::default()
        .frame(Frame::new().fill(Color32::from_gray(228)))
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
            let rect = response.rect;
            viewport = rect.size();
            let view = ViewTransform::new(&canvas.camera, rect.min);

            let meta = &canvas.document.meta;
            let surface = view.rect(meta.surface());
            painter.rect_filled(surface, 0.0, to_color32(meta.background));

            for shape in canvas.document.shapes_ordered() {
                paint_shape(&painter, &view, shape);
            }

            if response.dnd_hover_payload::<PrimitiveKind>().is_some() {
                painter.rect_stroke(
                    surface,
                    0.0,
                    Stroke::new(2.0, Color32::from_rgb(90, 140, 230)),
                    StrokeKind::Outside,
                );
            }

            if response.dnd_release_payload::<PrimitiveKind>().is_some() {
                if let Some(pos) = ctx.pointer_interact_pos() {
                    let local = pos - rect.min;
                    action = Some(UiAction::Drop(kurbo::Point::new(local.x as f64, local.y as f64)));
                }
            }
        });

    (action, viewport)
}

/// World to screen mapping for one frame.
struct ViewTransform<'a> {
    camera: &'a Camera,
    origin: Pos2,
}

impl<'a> ViewTransform<'a> {
    fn new(camera: &'a Camera, origin: Pos2) -> Self {
        Self { camera, origin }
    }

    fn zoom(&self) -> f32 {
        self.camera.zoom as f32
    }

    fn point(&self, world: kurbo::Point) -> Pos2 {
        let screen = self.camera.world_to_screen(world);
        Pos2::new(self.origin.x + screen.x as f32, self.origin.y + screen.y as f32)
    }

    fn rect(&self, world: kurbo::Rect) -> Rect {
        Rect::from_min_max(
            self.point(kurbo::Point::new(world.x0, world.y0)),
            self.point(kurbo::Point::new(world.x1, world.y1)),
        )
    }
}

fn paint_shape(painter: &egui::Painter, view: &ViewTransform<'_>, shape: &Shape) {
    let bounds = view.rect(shape.bounds());
    match shape {
        Shape::Rectangle(rect) => {
            if let Some(fill) = fill_color(&rect.style) {
                let radius = (rect.corner_radius as f32 * view.zoom()).round().clamp(0.0, 255.0) as u8;
                painter.rect_filled(bounds, CornerRadius::same(radius), fill);
            }
        }
        Shape::Ellipse(ellipse) => {
            if let Some(fill) = fill_color(&ellipse.style) {
                let radius = Vec2::new(ellipse.radius_x as f32, ellipse.radius_y as f32) * view.zoom();
                painter.add(egui::Shape::ellipse_filled(view.point(ellipse.center()), radius, fill));
            }
        }
        Shape::Text(text) => {
            let color = fill_color(&text.style).unwrap_or(Color32::BLACK);
            let (anchor, align) = match text.align {
                TextAlign::Left => (bounds.left_top(), Align2::LEFT_TOP),
                TextAlign::Center => (bounds.center_top(), Align2::CENTER_TOP),
                TextAlign::Right => (bounds.right_top(), Align2::RIGHT_TOP),
            };
            painter.text(
                anchor,
                align,
                &text.content,
                FontId::proportional(text.font_size as f32 * view.zoom()),
                color,
            );
        }
        Shape::Image(image) => {
            painter.rect_filled(bounds, CornerRadius::same(2), Color32::from_gray(210));
            painter.rect_stroke(
                bounds,
                CornerRadius::same(2),
                Stroke::new(1.0, Color32::from_gray(150)),
                StrokeKind::Inside,
            );
            let name = image.source.rsplit('/').next().unwrap_or(&image.source);
            painter.text(
                bounds.center(),
                Align2::CENTER_CENTER,
                name,
                FontId::proportional((11.0 * view.zoom()).max(6.0)),
                Color32::from_gray(90),
            );
        }
    }
}

fn to_color32(color: SerializableColor) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Fill color with the style opacity folded into alpha.
fn fill_color(style: &ShapeStyle) -> Option<Color32> {
    style.fill_with_opacity().map(|color| {
        let rgba = color.to_rgba8();
        Color32::from_rgba_unmultiplied(rgba.r, rgba.g, rgba.b, rgba.a)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    #[test]
    fn test_fill_color_applies_opacity() {
        let mut style = ShapeStyle::filled(SerializableColor::blue());
        assert_eq!(fill_color(&style), Some(Color32::from_rgb(0, 0, 255)));
        style.opacity = 0.0;
        assert_eq!(fill_color(&style).map(|c| c.a()), Some(0));
        assert_eq!(fill_color(&ShapeStyle::default()), None);
    }

    #[test]
    fn test_view_transform_follows_camera() {
        let mut camera = Camera::new();
        camera.zoom_by(1.0, Size::new(800.0, 600.0));
        let view = ViewTransform::new(&camera, Pos2::new(10.0, 20.0));

        // The viewport center stays fixed under zoom.
        let center = camera.screen_to_world(kurbo::Point::new(400.0, 300.0));
        let screen = view.point(center);
        assert!((screen.x - 410.0).abs() < 1e-3);
        assert!((screen.y - 320.0).abs() < 1e-3);

        let rect = view.rect(kurbo::Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!((rect.width() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_status_helpers() {
        let mut state = UiState::default();
        state.error("boom");
        assert!(state.status.as_ref().is_some_and(|s| s.is_error));
        state.info("ok");
        assert_eq!(state.status, Some(Status { text: "ok".into(), is_error: false }));
    }
}
