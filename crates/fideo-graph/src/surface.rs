//! The rendering collaborator contract.
//!
//! The editor core decides *what* to draw and issues primitives through
//! [`DrawSurface`]; how pixels are produced is the front end's business.
//! Everything here is window-space.

use crate::graphic::Vec2;

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Pin icon shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    /// Signal-flow triangle, used for bus and param pins.
    Flow,
    /// Grid square, used for setting pins.
    Grid,
    /// Transport play triangle in the node header.
    Play,
    /// One-shot trigger mark in the node header.
    Bang,
}

/// Abstract draw target for one frame of editor output.
///
/// Implementations translate these calls onto a concrete painter (egui in
/// the bundled front end). Calls arrive back-to-front within a frame.
pub trait DrawSurface {
    /// Filled rounded rectangle.
    fn rect_filled(&mut self, ul: Vec2, lr: Vec2, rounding: f32, color: Rgba);

    /// Stroked rounded rectangle.
    fn rect_stroke(&mut self, ul: Vec2, lr: Vec2, rounding: f32, thickness: f32, color: Rgba);

    /// Straight line segment.
    fn line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Rgba);

    /// Stroked cubic Bézier through the four control points.
    fn bezier(&mut self, points: [Vec2; 4], thickness: f32, color: Rgba);

    /// Pin or header icon inside the given box. `fill` paints the icon
    /// interior (hover pulse); `color` is the outline.
    fn icon(&mut self, icon: Icon, ul: Vec2, lr: Vec2, color: Rgba, fill: Rgba);

    /// Text at `pos` with the given font size in window units.
    fn text(&mut self, pos: Vec2, size: f32, color: Rgba, text: &str);
}
