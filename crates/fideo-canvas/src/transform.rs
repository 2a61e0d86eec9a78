//! The canvas pan/zoom transform.
//!
//! Nodes live in canvas space; input and drawing happen in window space. The
//! transform is a uniform scale plus an offset, with the viewport's own
//! window position folded in so the canvas can sit below a menu bar.

use fideo_graph::Vec2;

/// Quantized zoom step per wheel notch.
pub const ZOOM_STEP: f32 = 0.25;
/// Smallest allowed zoom scale.
pub const ZOOM_MIN: f32 = 0.25;

/// Pan offset and zoom scale shared by the whole view.
#[derive(Clone, Copy, Debug)]
pub struct Canvas {
    /// Canvas origin in viewport-relative window units.
    pub origin_offset: Vec2,
    /// Viewport upper-left corner in window coordinates.
    pub viewport_origin: Vec2,
    /// Uniform zoom scale.
    pub scale: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            origin_offset: Vec2::default(),
            viewport_origin: Vec2::default(),
            scale: 1.0,
        }
    }
}

impl Canvas {
    /// Maps a canvas-space point to window space.
    pub fn to_window(&self, p: Vec2) -> Vec2 {
        self.viewport_origin + self.origin_offset + p * self.scale
    }

    /// Maps a window-space point to canvas space.
    pub fn to_canvas(&self, p: Vec2) -> Vec2 {
        (p - self.viewport_origin - self.origin_offset) * (1.0 / self.scale)
    }

    /// Translates the view by a window-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.origin_offset = self.origin_offset + delta;
    }

    /// Zooms by whole wheel steps about the given window-space pointer, so
    /// the canvas point under the pointer stays put.
    pub fn zoom_at(&mut self, pointer: Vec2, steps: f32) {
        let new_scale = (self.scale + ZOOM_STEP * steps).max(ZOOM_MIN);
        if (new_scale - self.scale).abs() < f32::EPSILON {
            return;
        }
        let pointer = pointer - self.viewport_origin;
        let ratio = new_scale / self.scale;
        self.origin_offset = pointer - (pointer - self.origin_offset) * ratio;
        self.scale = new_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn window_and_canvas_mappings_invert() {
        let canvas = Canvas {
            origin_offset: Vec2::new(40.0, -12.0),
            viewport_origin: Vec2::new(0.0, 24.0),
            scale: 1.75,
        };
        let p = Vec2::new(123.0, -45.0);
        assert!(close(canvas.to_canvas(canvas.to_window(p)), p));
    }

    #[test]
    fn zoom_clamps_at_the_minimum_scale() {
        let mut canvas = Canvas::default();
        canvas.zoom_at(Vec2::default(), -100.0);
        assert!((canvas.scale - ZOOM_MIN).abs() < f32::EPSILON);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// The canvas point under the pointer is unchanged by any zoom.
        #[test]
        fn zoom_pivot_is_invariant(
            px in -500.0f32..1500.0,
            py in -500.0f32..1500.0,
            ox in -300.0f32..300.0,
            oy in -300.0f32..300.0,
            steps in -6i32..6,
        ) {
            let mut canvas = Canvas {
                origin_offset: Vec2::new(ox, oy),
                viewport_origin: Vec2::new(0.0, 24.0),
                scale: 1.0,
            };
            let pointer = Vec2::new(px, py);
            let before = canvas.to_canvas(pointer);
            canvas.zoom_at(pointer, steps as f32);
            let after = canvas.to_canvas(pointer);
            prop_assert!(close(before, after), "{before:?} vs {after:?}");
        }

        /// Equal zoom-in and zoom-out step counts restore the original view
        /// when the minimum is never hit.
        #[test]
        fn zoom_round_trip_restores_the_view(
            px in 0.0f32..1000.0,
            py in 0.0f32..1000.0,
            steps in 1i32..6,
        ) {
            let mut canvas = Canvas::default();
            let pointer = Vec2::new(px, py);
            let before = canvas.to_canvas(pointer);
            for _ in 0..steps {
                canvas.zoom_at(pointer, 1.0);
            }
            for _ in 0..steps {
                canvas.zoom_at(pointer, -1.0);
            }
            prop_assert!((canvas.scale - 1.0).abs() < 1e-4);
            prop_assert!(close(canvas.to_canvas(pointer), before));
        }
    }
}
