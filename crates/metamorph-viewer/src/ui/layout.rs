use bevy::prelude::Resource;
use bevy_egui::egui;
use metamorph_core::Point;

/// Canvas placement from the last frame, for systems that run before the canvas is laid out.
#[derive(Resource, Clone, Copy)]
pub struct UiLayout {
    pub canvas_rect: egui::Rect,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            canvas_rect: egui::Rect::NOTHING,
        }
    }
}

impl UiLayout {
    pub fn has_canvas(&self) -> bool {
        self.canvas_rect.is_positive()
    }

    /// Screen position to canvas-local coordinates.
    pub fn to_canvas(&self, pos: egui::Pos2) -> Point {
        to_canvas(self.canvas_rect, pos)
    }
}

pub fn to_canvas(rect: egui::Rect, pos: egui::Pos2) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_coordinates_are_relative_to_rect() {
        let rect = egui::Rect::from_min_size(egui::pos2(260.0, 0.0), egui::vec2(400.0, 300.0));
        assert_eq!(to_canvas(rect, egui::pos2(300.0, 50.0)), Point::new(40.0, 50.0));
        assert!(!UiLayout::default().has_canvas());
    }
}
