pub mod canvas;
pub mod detail;
pub mod hud;
pub mod layout;
pub mod panel;
pub mod shortcuts;
pub mod tooltips;

pub use canvas::canvas;
pub use detail::detail_panel;
pub use hud::hud_overlay;
pub use layout::UiLayout;
pub use panel::ui_panel;
pub use shortcuts::handle_shortcuts;

pub const PANEL_W: f32 = 260.0;
pub const HUD_EDGE_PADDING: f32 = 10.0;
pub const HUD_W: f32 = 170.0;
