use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use metamorph_core::scene::parse_hex;
use metamorph_core::{Msg, Point, Scene, Viewport};

use crate::app::resources::ViewerState;
use crate::ui::layout::{to_canvas, UiLayout};
use crate::ui::tooltips::render_tooltip;

const BACKGROUND: egui::Color32 = egui::Color32::WHITE;
const PLACEHOLDER_FONT: f32 = 14.0;

pub fn canvas(mut contexts: EguiContexts, mut st: ResMut<ViewerState>, mut layout: ResMut<UiLayout>) {
    let st = &mut *st;
    let ctx = contexts.ctx_mut();

    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(BACKGROUND))
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            layout.canvas_rect = rect;

            let (w, h) = st.session.size();
            let (rw, rh) = (rect.width() as f64, rect.height() as f64);
            if (w - rw).abs() > 0.5 || (h - rh).abs() > 0.5 {
                st.session.resize(rw, rh);
            }

            handle_pointer(ui, &response, st);

            let scene = st.session.scene();
            paint_scene(&painter, rect, &scene);

            if let (Some(node), Some(pos)) =
                (scene.nodes.iter().find(|n| n.hovered), response.hover_pos())
            {
                render_tooltip(
                    ui.ctx(),
                    "node-tooltip",
                    pos + egui::vec2(14.0, 14.0),
                    node.title.lines().map(str::to_string),
                );
            }
        });
}

/// Pointer and wheel input on the canvas, translated into session calls.
/// Presses on a node drag it; presses on empty canvas pan the view.
fn handle_pointer(ui: &egui::Ui, response: &egui::Response, st: &mut ViewerState) {
    let rect = response.rect;
    let local = |p: egui::Pos2| to_canvas(rect, p);

    if response.drag_started_by(egui::PointerButton::Primary) {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or(response.interact_pointer_pos());
        let pointer = response.interact_pointer_pos().or(origin);
        if let (Some(origin), Some(pointer)) = (origin, pointer) {
            match st.session.hit_test(local(origin)) {
                Some(id) => st.session.dispatch(Msg::DragStart {
                    id,
                    pointer: local(pointer),
                }),
                None => st.panning = true,
            }
        }
    }

    if response.dragged_by(egui::PointerButton::Primary) {
        if st.session.interaction().drag().is_some() {
            if let Some(pointer) = response.interact_pointer_pos() {
                st.session.dispatch(Msg::DragMove {
                    pointer: local(pointer),
                });
            }
        } else if st.panning {
            let d = response.drag_delta();
            st.session.pan_by(d.x as f64, d.y as f64);
        }
    }

    if response.drag_stopped() {
        if st.session.interaction().drag().is_some() {
            st.session.dispatch(Msg::DragEnd);
        }
        st.panning = false;
    }

    if response.clicked() {
        let hit = response
            .interact_pointer_pos()
            .and_then(|p| st.session.hit_test(local(p)));
        match hit {
            Some(id) => st.session.dispatch(Msg::Select(id)),
            None => st.session.dispatch(Msg::Deselect),
        }
    }

    if st.session.interaction().drag().is_none() {
        match response.hover_pos() {
            Some(pos) => {
                st.session.hover_at(local(pos));
            }
            None => {
                if st.session.interaction().hovered().is_some() {
                    st.session.dispatch(Msg::HoverExit);
                }
            }
        }
    }

    if let Some(anchor) = response.hover_pos().map(local) {
        let (scroll, pinch) = ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
        if scroll != 0.0 {
            let factor = Viewport::wheel_factor(scroll as f64, st.cfg.wheel_sensitivity);
            st.session.zoom_at(factor, anchor);
        }
        if pinch != 1.0 {
            st.session.zoom_at(pinch as f64, anchor);
        }
    }
}

fn paint_scene(painter: &egui::Painter, rect: egui::Rect, scene: &Scene) {
    let style = &scene.style;

    if let Some(msg) = &scene.placeholder {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            msg,
            egui::FontId::proportional(PLACEHOLDER_FONT),
            color(&style.placeholder_color, 1.0),
        );
        return;
    }

    let k = scene.transform.scale() as f32;
    let to_screen = |p: Point| {
        let s = scene.to_screen(p);
        rect.min + egui::vec2(s.x as f32, s.y as f32)
    };

    let link = color(&style.link_color, style.link_opacity);
    for l in &scene.links {
        painter.line_segment(
            [to_screen(l.from), to_screen(l.to)],
            egui::Stroke::new(l.width as f32 * k, link),
        );
    }

    let label_color = color(&style.label_color, 1.0);
    let font = egui::FontId::proportional(style.font_size as f32 * k);
    for n in &scene.nodes {
        let center = to_screen(n.center);
        painter.circle(
            center,
            n.radius as f32 * k,
            color(&n.fill, 1.0),
            egui::Stroke::new(n.stroke_width as f32 * k, color(&n.stroke, 1.0)),
        );
        if let Some(label) = &n.label {
            painter.text(
                center + egui::vec2(n.label_dx as f32 * k, 0.0),
                egui::Align2::LEFT_CENTER,
                label,
                font.clone(),
                label_color,
            );
        }
    }
}

pub fn color(hex: &str, opacity: f64) -> egui::Color32 {
    let (r, g, b) = parse_hex(hex).unwrap_or((0x99, 0x99, 0x99));
    let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_colours_map_to_egui() {
        assert_eq!(color("#1f77b4", 1.0), egui::Color32::from_rgb(0x1f, 0x77, 0xb4));
        assert_eq!(color("nonsense", 1.0), egui::Color32::from_rgb(0x99, 0x99, 0x99));
        assert_eq!(color("#fff", 0.0).a(), 0);
    }
}
