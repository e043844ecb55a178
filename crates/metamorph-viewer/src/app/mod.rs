use bevy::prelude::*;

use crate::app::resources::ViewerState;
use crate::ui::UiLayout;

pub mod resources;

pub struct MetamorphViewerPlugin;

impl Plugin for MetamorphViewerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiLayout>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    tick_simulation,
                    poll_export,
                    crate::ui::handle_shortcuts,
                    crate::ui::ui_panel,
                    crate::ui::detail_panel,
                    crate::ui::canvas,
                    crate::ui::hud_overlay,
                )
                    .chain(),
            );
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

/// One layout step per display frame; a settled or stopped layout costs nothing.
fn tick_simulation(mut st: ResMut<ViewerState>) {
    st.session.tick();
}

fn poll_export(mut st: ResMut<ViewerState>) {
    st.poll_export();
}
