//! Fideo Canvas - interaction and presentation for the fideo noodle editor
//!
//! Everything between raw pointer samples and draw primitives lives here:
//! the pan/zoom transform, the per-frame pin layout, wire geometry, hover
//! resolution, the gesture state machine, and the draw pass. The crate
//! depends only on `fideo-graph`'s abstract contracts; it never touches a
//! window, an event loop, or a concrete painter.
//!
//! # Core Abstractions
//!
//! - [`Editor`] - owns the graph, the provider, and all interaction state;
//!   `Editor::frame` runs one frame in the canonical order (input, hover,
//!   Work, layout, draw)
//! - [`ModalRequest`] / [`ModalResponse`] - the popup protocol between the
//!   editor core and the front end
//! - [`Canvas`] - pan/zoom transform between canvas and window space
//! - [`HoverState`] - what the pointer is over, resolved pins-first
//! - [`PointerFrame`] - the abstract input sample the front end supplies
//! - [`Theme`] / [`DrawOptions`] - palette and overlay toggles

pub mod draw;
pub mod editor;
pub mod hover;
pub mod input;
pub mod layout;
pub mod theme;
pub mod transform;
pub mod wire;

pub use draw::{DrawOptions, draw_graph};
pub use editor::{Editor, ModalRequest, ModalResponse};
pub use hover::{HoverState, group_under, normalize_wire, pin_anchor, update_hovers};
pub use input::{MouseState, PointerFrame};
pub use layout::lay_out_pins;
pub use theme::Theme;
pub use transform::{Canvas, ZOOM_MIN, ZOOM_STEP};
pub use wire::{WIRE_HIT_DISTANCE_SQ, bezier_point, closest_distance_sq, wire_bezier};
