use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use metamorph_core::Msg;

use crate::app::resources::ViewerState;
use crate::ui::UiLayout;

pub fn handle_shortcuts(
    mut contexts: EguiContexts,
    mut st: ResMut<ViewerState>,
    layout: Res<UiLayout>,
) {
    let ctx = contexts.ctx_mut();

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && st.session.interaction().selected().is_some()
    {
        st.session.dispatch(Msg::Deselect);
    }

    if ctx.wants_keyboard_input() {
        return;
    }

    let anchor = ctx
        .pointer_hover_pos()
        .filter(|p| layout.canvas_rect.contains(*p))
        .or_else(|| layout.has_canvas().then(|| layout.canvas_rect.center()))
        .map(|p| layout.to_canvas(p));

    if ctx.input(|i| i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)) {
        st.zoom_step(1.25, anchor);
    }
    if ctx.input(|i| i.key_pressed(egui::Key::Minus)) {
        st.zoom_step(0.8, anchor);
    }
    if ctx.input(|i| i.key_pressed(egui::Key::R)) {
        st.session.reset_view();
    }
    if ctx.input(|i| i.key_pressed(egui::Key::S)) {
        st.export_svg();
    }
    if ctx.input(|i| i.key_pressed(egui::Key::P)) && st.pending.is_none() {
        st.start_png_export();
    }
}
