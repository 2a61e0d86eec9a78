//! Derived layout records and canvas-space geometry.
//!
//! Graphics are *not* authoritative: the layout overlay recomputes pin
//! placement and node boxes from the [`GraphStore`](crate::GraphStore) every
//! frame. Only the node's upper-left corner (where the user dragged it) and a
//! group's lower-right corner (where the user resized it) persist between
//! frames; everything else is scratch output of the layout pass.

use serde::{Deserialize, Serialize};

use crate::entity::NodeId;

/// Width of one pin column in canvas units.
pub const COLUMN_WIDTH: f32 = 180.0;
/// Pin icon height (and vertical slot pitch) in canvas units.
pub const PIN_HEIGHT: f32 = 20.0;
/// Pin icon width in canvas units.
pub const PIN_WIDTH: f32 = 20.0;
/// Height of the header strip drawn above a node body, canvas units.
pub const HEADER_HEIGHT: f32 = 20.0;
/// Vertical style padding, canvas units.
pub const PADDING_Y: f32 = 16.0;
/// Horizontal style padding, canvas units.
pub const PADDING_X: f32 = 12.0;
/// Side length of a group's resize-corner hit region, canvas units.
pub const RESIZE_CORNER: f32 = 16.0;
/// Minimum size a group can be resized down to, canvas units.
pub const GROUP_MIN_SIZE: Vec2 = Vec2 { x: 100.0, y: 50.0 };

/// A 2D point or offset in canvas or window space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vec2 {
    /// Constructs a vector from components.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Squared Euclidean length. Cheaper than [`length`](Self::length) for
    /// threshold comparisons.
    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }
}

impl core::ops::Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl core::ops::Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Draw-ordering layer for a node's primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GraphicLayer {
    /// Group rectangles draw behind everything else.
    Groups,
    /// Ordinary node bodies, pins, and wires.
    #[default]
    Nodes,
}

/// Per-node layout state, recomputed each frame for non-group nodes.
#[derive(Clone, Debug, Default)]
pub struct NodeGraphic {
    /// Canvas-space upper-left corner of the node body.
    pub ul: Vec2,
    /// Canvas-space lower-right corner. For groups this is user-resized
    /// state; for ordinary nodes it is layout output.
    pub lr: Vec2,
    /// Number of pin columns excluding the output column (1, or 2 when the
    /// node has settings).
    pub column_count: u32,
    /// Draw layer.
    pub layer: GraphicLayer,
    /// True when this node is a visual group container.
    pub group: bool,
    /// Weak back-reference to the containing group, resolved through the
    /// store on every use.
    pub parent_group: Option<NodeId>,
    /// Anchor captured when a drag or resize gesture starts; the gesture
    /// applies pointer deltas against this.
    pub drag_anchor: Vec2,
}

impl NodeGraphic {
    /// Layout record for an ordinary node placed at `pos`.
    pub fn at(pos: Vec2, parent_group: Option<NodeId>) -> Self {
        Self {
            ul: pos,
            lr: pos,
            column_count: 1,
            layer: GraphicLayer::Nodes,
            group: false,
            parent_group,
            drag_anchor: Vec2::default(),
        }
    }

    /// Layout record for a new group container placed at `pos`, with the
    /// default group footprint.
    pub fn group_at(pos: Vec2) -> Self {
        Self {
            ul: pos,
            lr: pos + Vec2::new(COLUMN_WIDTH * 2.0, PIN_HEIGHT * 8.0),
            column_count: 1,
            layer: GraphicLayer::Groups,
            group: true,
            parent_group: None,
            drag_anchor: Vec2::default(),
        }
    }

    /// Canvas-space size of the node box.
    pub fn size(&self) -> Vec2 {
        self.lr - self.ul
    }
}

/// Per-pin layout state: which column the pin sits in and its vertical
/// offset within the node, both derived each frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct PinGraphic {
    /// Column index. 0 = inputs and params, 1 = settings, `column_count` =
    /// outputs (the right edge).
    pub column: u32,
    /// Vertical offset of the pin slot from the node's upper-left corner,
    /// canvas units.
    pub pos_y: f32,
    /// Cached canvas-space origin of the owning node.
    pub node_origin: Vec2,
}

impl PinGraphic {
    /// Canvas-space upper-left corner of the pin's icon.
    pub fn ul(&self) -> Vec2 {
        self.node_origin + Vec2::new(self.column as f32 * COLUMN_WIDTH, self.pos_y)
    }

    /// True when the canvas-space point lies inside the pin's icon box.
    pub fn icon_contains(&self, p: Vec2) -> bool {
        let ul = self.ul();
        p.x >= ul.x && p.x <= ul.x + PIN_WIDTH && p.y >= ul.y && p.y <= ul.y + PIN_HEIGHT
    }

    /// True when the canvas-space point lies inside the pin's label strip
    /// (the rest of the column to the right of the icon).
    pub fn label_contains(&self, p: Vec2) -> bool {
        let ul = self.ul();
        p.x >= ul.x + PIN_WIDTH
            && p.x <= ul.x + COLUMN_WIDTH
            && p.y >= ul.y
            && p.y <= ul.y + PIN_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_icon_and_label_rects_do_not_overlap() {
        let pin = PinGraphic {
            column: 0,
            pos_y: 16.0,
            node_origin: Vec2::new(100.0, 200.0),
        };
        // inside the icon
        assert!(pin.icon_contains(Vec2::new(105.0, 220.0)));
        assert!(!pin.label_contains(Vec2::new(105.0, 220.0)));
        // inside the label strip
        assert!(pin.label_contains(Vec2::new(150.0, 220.0)));
        assert!(!pin.icon_contains(Vec2::new(150.0, 220.0)));
        // outside the column
        assert!(!pin.label_contains(Vec2::new(100.0 + COLUMN_WIDTH + 1.0, 220.0)));
    }

    #[test]
    fn second_column_offsets_by_column_width() {
        let pin = PinGraphic {
            column: 1,
            pos_y: 0.0,
            node_origin: Vec2::default(),
        };
        assert_eq!(pin.ul(), Vec2::new(COLUMN_WIDTH, 0.0));
    }

    #[test]
    fn group_default_footprint() {
        let g = NodeGraphic::group_at(Vec2::new(10.0, 10.0));
        assert!(g.group);
        assert_eq!(g.size(), Vec2::new(COLUMN_WIDTH * 2.0, PIN_HEIGHT * 8.0));
    }
}
