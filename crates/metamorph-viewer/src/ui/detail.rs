use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use metamorph_core::Msg;

use crate::app::resources::ViewerState;

pub fn detail_panel(mut contexts: EguiContexts, mut st: ResMut<ViewerState>) {
    let Some(detail) = st.session.detail() else {
        return;
    };

    egui::SidePanel::right("detail")
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("File details");
            ui.separator();
            ui.label(format!("Path: {}", detail.id));
            ui.label(format!(
                "Extension: {}",
                detail.extension.as_deref().unwrap_or("none")
            ));
            ui.label(format!("Category: {}", detail.category_label()));
            ui.label(format!("Changes: {}", detail.value));
            ui.add_space(8.0);
            if ui.button("Close").clicked() {
                st.session.dispatch(Msg::Deselect);
            }
        });
}
