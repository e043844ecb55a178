use serde::{Deserialize, Serialize};

use crate::Point;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 4.0;

/// Pan/zoom transform from simulation space to screen space: `screen = sim * k + (tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub tx: f64,
    pub ty: f64,
    pub k: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Viewport {
    pub const IDENTITY: Viewport = Viewport {
        tx: 0.0,
        ty: 0.0,
        k: 1.0,
    };

    pub fn scale(&self) -> f64 {
        self.k
    }

    /// Zoom readout, e.g. `120` for 1.2x.
    pub fn scale_percent(&self) -> u32 {
        (self.k * 100.0).round() as u32
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.tx, p.y * self.k + self.ty)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.tx) / self.k, (p.y - self.ty) / self.k)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.tx += dx;
            self.ty += dy;
        }
    }

    /// Multiplies the scale by `factor`, keeping the screen point `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.invert(anchor);
        self.k = clamp_scale(self.k * factor);
        self.tx = anchor.x - fixed.x * self.k;
        self.ty = anchor.y - fixed.y * self.k;
    }

    /// Wheel step the way browsers zoom graphs: `2^(delta * sensitivity)`.
    pub fn wheel_factor(delta: f64, sensitivity: f64) -> f64 {
        2f64.powf(delta * sensitivity)
    }

    pub fn set_scale(&mut self, k: f64, anchor: Point) {
        if k.is_finite() && k > 0.0 {
            self.zoom_at(k / self.k, anchor);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    pub fn svg_transform(&self) -> String {
        format!("translate({},{}) scale({})", self.tx, self.ty, self.k)
    }
}

fn clamp_scale(k: f64) -> f64 {
    k.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_stays_within_bounds_after_any_zoom_sequence() {
        let mut v = Viewport::default();
        let anchor = Point::new(320.0, 240.0);
        let factors = [3.0, 3.0, 3.0, 0.01, 0.5, 10.0, 1e9, 1e-9, 1.7, f64::NAN, -2.0, 0.0];
        for f in factors {
            v.zoom_at(f, anchor);
            assert!((MIN_SCALE..=MAX_SCALE).contains(&v.scale()), "k = {}", v.k);
        }
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut v = Viewport::default();
        v.pan_by(40.0, -10.0);
        let anchor = Point::new(200.0, 150.0);
        let under = v.invert(anchor);

        v.zoom_at(1.5, anchor);
        let back = v.apply(under);
        assert!((back.x - anchor.x).abs() < 1e-9);
        assert!((back.y - anchor.y).abs() < 1e-9);
    }

    #[test]
    fn apply_and_invert_are_inverse() {
        let v = Viewport {
            tx: 12.0,
            ty: -7.5,
            k: 2.5,
        };
        let p = Point::new(3.0, 4.0);
        let q = v.invert(v.apply(p));
        assert!((q.x - p.x).abs() < 1e-12 && (q.y - p.y).abs() < 1e-12);
    }

    #[test]
    fn readout_and_wheel_factor() {
        let mut v = Viewport::default();
        v.set_scale(1.2, Point::default());
        assert_eq!(v.scale_percent(), 120);
        assert_eq!(Viewport::wheel_factor(0.0, 0.002), 1.0);
        assert!(Viewport::wheel_factor(500.0, 0.002) > 1.0);
        v.reset();
        assert_eq!(v, Viewport::IDENTITY);
    }

    #[test]
    fn svg_transform_format() {
        let v = Viewport {
            tx: 10.0,
            ty: 20.5,
            k: 0.5,
        };
        assert_eq!(v.svg_transform(), "translate(10,20.5) scale(0.5)");
    }
}
