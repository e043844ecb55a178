use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::ViewerState;
use crate::ui::{UiLayout, HUD_EDGE_PADDING, HUD_W};

pub fn hud_overlay(mut contexts: EguiContexts, st: Res<ViewerState>, layout: Res<UiLayout>) {
    if !layout.has_canvas() {
        return;
    }
    let rect = layout.canvas_rect;
    let x = (rect.max.x - HUD_W - HUD_EDGE_PADDING).max(rect.min.x + HUD_EDGE_PADDING);
    let y = rect.min.y + HUD_EDGE_PADDING;
    let sim = st.session.simulation();

    egui::Area::new(egui::Id::new("hud"))
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(x, y))
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.group(|ui| {
                ui.label(format!("Zoom: {}%", st.session.viewport().scale_percent()));
                ui.label(format!("Nodes: {}", sim.len()));
                if sim.is_running() {
                    ui.label(format!("Layout: alpha {:.3}", sim.alpha()));
                } else {
                    ui.label("Layout: settled");
                }
                ui.label(format!("Ticks: {}", sim.ticks()));
            });
        });
}
