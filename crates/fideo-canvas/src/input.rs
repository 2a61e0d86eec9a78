//! Abstract pointer input.
//!
//! The front end samples its windowing library once per frame into a
//! [`PointerFrame`]; the editor never reads events directly. [`MouseState`]
//! derives edge-triggered click flags and carries the gesture bits the
//! interaction code flips as a drag settles into a mode.

use fideo_graph::Vec2;

/// One frame's pointer sample, in window coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerFrame {
    /// Pointer position.
    pub pos: Vec2,
    /// Primary button held.
    pub primary_down: bool,
    /// Secondary button released this frame.
    pub secondary_clicked: bool,
    /// Wheel steps this frame, positive away from the user.
    pub wheel: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Pointer is over the canvas viewport (not a menu or popup).
    pub in_viewport: bool,
}

/// Gesture state persisted across frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct MouseState {
    /// Primary button went down this frame.
    pub click_initiated: bool,
    /// Primary button came up this frame.
    pub click_ended: bool,
    /// Primary button is held.
    pub dragging: bool,
    /// A pending wire follows the pointer.
    pub dragging_wire: bool,
    /// A node (and any group siblings) follows the pointer.
    pub dragging_node: bool,
    /// A group's lower-right corner follows the pointer.
    pub resizing_node: bool,
    /// The drag pans the canvas.
    pub interacting_with_canvas: bool,
    /// Window-space position where the primary button went down.
    pub initial_pos: Vec2,
    /// Canvas-space position where the primary button went down.
    pub initial_canvas_pos: Vec2,
    was_down: bool,
}

impl MouseState {
    /// Folds this frame's sample into the edge flags. Gesture mode bits are
    /// left alone; the interaction code owns them.
    pub fn update(&mut self, frame: &PointerFrame) {
        self.click_initiated = frame.primary_down && !self.was_down && frame.in_viewport;
        self.click_ended = !frame.primary_down && self.was_down;
        self.dragging = frame.primary_down && self.was_down;
        self.was_down = frame.primary_down;
    }

    /// Clears every gesture mode at the end of a drag.
    pub fn end_gesture(&mut self) {
        self.dragging_wire = false;
        self.dragging_node = false;
        self.resizing_node = false;
        self.interacting_with_canvas = false;
    }

    /// True while any drag gesture owns the pointer.
    pub fn gesture_active(&self) -> bool {
        self.dragging_wire
            || self.dragging_node
            || self.resizing_node
            || self.interacting_with_canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(down: bool) -> PointerFrame {
        PointerFrame {
            primary_down: down,
            in_viewport: true,
            ..PointerFrame::default()
        }
    }

    #[test]
    fn click_edges_fire_once() {
        let mut mouse = MouseState::default();
        mouse.update(&frame(true));
        assert!(mouse.click_initiated);
        assert!(!mouse.dragging);

        mouse.update(&frame(true));
        assert!(!mouse.click_initiated);
        assert!(mouse.dragging);

        mouse.update(&frame(false));
        assert!(mouse.click_ended);
        mouse.update(&frame(false));
        assert!(!mouse.click_ended);
    }

    #[test]
    fn presses_outside_the_viewport_do_not_initiate() {
        let mut mouse = MouseState::default();
        let mut outside = frame(true);
        outside.in_viewport = false;
        mouse.update(&outside);
        assert!(!mouse.click_initiated);
    }
}
