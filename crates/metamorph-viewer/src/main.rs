mod app;
mod ui;
mod util;

use anyhow::Result;
use app::resources::ViewerState;
use app::MetamorphViewerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use util::{args, config};

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = args::parse_args()?;
    let cfg = config::load_or_default();
    let state = ViewerState::new(cfg, args.history)?;

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Metamorph".into(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<LogPlugin>(),
        )
        .add_plugins(EguiPlugin)
        .insert_resource(state)
        .add_plugins(MetamorphViewerPlugin)
        .run();
    Ok(())
}
