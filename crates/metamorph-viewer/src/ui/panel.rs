use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use metamorph_core::Category;

use crate::app::resources::ViewerState;
use crate::ui::canvas::color;
use crate::ui::{UiLayout, PANEL_W};

const DISTRIBUTION_ROWS: usize = 8;

pub fn ui_panel(mut contexts: EguiContexts, mut st: ResMut<ViewerState>, layout: Res<UiLayout>) {
    let st = &mut *st;
    egui::SidePanel::left("left")
        .default_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Metamorph");
            ui.label(format!("files: {}", st.session.visible().nodes.len()));
            ui.label(format!("links: {}", st.session.visible().edges.len()));
            ui.separator();

            ui.label("History (JSON):");
            ui.horizontal(|ui| {
                let resp = ui.text_edit_singleline(&mut st.history_input);
                let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Load").clicked() || enter {
                    st.load_history_from_input();
                }
            });

            ui.add_space(8.0);
            ui.label("Search files:");
            if ui.text_edit_singleline(&mut st.search_input).changed() {
                let text = st.search_input.clone();
                st.set_search(text);
            }

            ui.add_space(8.0);
            ui.label("Timeline:");
            let mut pct = st.session.fraction() * 100.0;
            let slider = egui::Slider::new(&mut pct, 0.0..=100.0)
                .suffix("%")
                .fixed_decimals(0);
            if ui.add(slider).changed() {
                st.session.set_timeline(pct / 100.0);
            }

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Window");
            let stats = st.stats.get(&st.session);
            ui.label(format!("commits: {}", stats.commits));
            ui.label(format!("files changed: {}", stats.files_changed));
            ui.label(format!("total changes: {}", stats.total_changes));
            ui.label(format!("active days: {}", stats.active_days));
            if let (Some(oldest), Some(newest)) = (&stats.oldest, &stats.newest) {
                ui.label(format!("from: {oldest}"));
                ui.label(format!("to: {newest}"));
            }

            ui.add_space(8.0);
            ui.separator();
            ui.heading("View");
            let anchor = layout
                .has_canvas()
                .then(|| layout.to_canvas(layout.canvas_rect.center()));
            ui.horizontal(|ui| {
                if ui.button("-").clicked() {
                    st.zoom_step(0.8, anchor);
                }
                ui.label(format!("{}%", st.session.viewport().scale_percent()));
                if ui.button("+").clicked() {
                    st.zoom_step(1.25, anchor);
                }
                if ui.button("Reset").clicked() {
                    st.session.reset_view();
                }
            });

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Export");
            ui.horizontal(|ui| {
                if ui.button("SVG").clicked() {
                    st.export_svg();
                }
                let idle = st.pending.is_none();
                if ui.add_enabled(idle, egui::Button::new("PNG")).clicked() {
                    st.start_png_export();
                }
                if !idle {
                    ui.spinner();
                }
            });
            if let Some(status) = &st.status {
                ui.label(status);
            }

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Legend");
            for cat in Category::ALL {
                ui.horizontal(|ui| {
                    let fill = st.cfg.style.fill_for(cat.group());
                    ui.colored_label(color(fill, 1.0), "●");
                    ui.label(cat.label());
                });
            }

            ui.add_space(8.0);
            ui.separator();
            ui.heading("File distribution");
            let stats = st.stats.get(&st.session);
            if stats.by_extension.is_empty() {
                ui.label("no changes in window");
            }
            for share in stats.by_extension.iter().take(DISTRIBUTION_ROWS) {
                let fill = color(st.cfg.style.fill_for(share.category.group()), 1.0);
                let percent = share.percent_of(stats.total_changes);
                ui.horizontal(|ui| {
                    ui.colored_label(fill, "●");
                    ui.label(format!(".{}", share.extension));
                    ui.label(format!("{} files", share.count));
                    ui.label(format!("{percent:.1}%"));
                });
                ui.add(egui::ProgressBar::new((percent / 100.0) as f32).fill(fill));
            }
            if stats.by_extension.len() > DISTRIBUTION_ROWS {
                ui.label(format!("+{} more", stats.by_extension.len() - DISTRIBUTION_ROWS));
            }

            ui.add_space(10.0);
            ui.separator();
            if ui.button("Save settings").clicked() {
                st.save_config();
            }
        });
}
