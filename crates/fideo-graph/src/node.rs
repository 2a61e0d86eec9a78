//! Graph records: nodes, pins, connections, and visual groups.
//!
//! These are plain data rows owned by the [`GraphStore`](crate::GraphStore).
//! Cross-references (a pin's owning node, a connection's endpoints, a group's
//! members) are plain ids resolved through the store on every use; a record
//! never owns another record.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::entity::{ConnectionId, NodeId, PinId};
use crate::graphic::Vec2;
use crate::surface::DrawSurface;

/// Custom draw callback for nodes that paint extra content inside their body
/// (for example a spectrum display). Set at creation time by the provider
/// that recognizes the kind. A capability, not a type test.
#[derive(Clone)]
pub struct NodeRender(pub Arc<dyn Fn(NodeId, Vec2, Vec2, f32, &mut dyn DrawSurface) + Send + Sync>);

impl fmt::Debug for NodeRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeRender(..)")
    }
}

/// A node in the graph: an audio processor, the implicit output device, or a
/// visual group container.
#[derive(Clone, Debug)]
pub struct Node {
    /// Handle of this node.
    pub id: NodeId,
    /// Kind tag, e.g. `"Gain"`, `"Oscillator"`, `"Device"`, `"Group"`.
    pub kind: String,
    /// Display name, unique across the graph.
    pub name: String,
    /// Pins in creation order.
    pub pins: Vec<PinId>,
    /// True when the node exposes a start/stop transport control.
    pub play_controller: bool,
    /// True when the node exposes a one-shot trigger control.
    pub bang_controller: bool,
    /// Optional custom body renderer.
    pub render: Option<NodeRender>,
}

impl Node {
    /// A node with no pins and no controllers.
    pub fn new(id: NodeId, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            name: name.into(),
            pins: Vec::new(),
            play_controller: false,
            bang_controller: false,
            render: None,
        }
    }
}

/// What role a pin plays on its node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PinKind {
    /// Audio bus input.
    BusIn,
    /// Audio bus output.
    BusOut,
    /// Continuously variable parameter; settable or driven by a wire.
    Param,
    /// Discrete configuration value; edited, never wired.
    Setting,
}

/// The value type a pin carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PinDataType {
    /// No value.
    #[default]
    None,
    /// A multi-channel audio bus (settings of this type load from a file).
    Bus,
    /// Boolean.
    Bool,
    /// Integer.
    Integer,
    /// One of a fixed label set.
    Enumeration,
    /// Floating point.
    Float,
    /// Free text.
    String,
}

/// A typed connection point on a node.
#[derive(Clone, Debug)]
pub struct Pin {
    /// Handle of this pin.
    pub id: PinId,
    /// Role on the node.
    pub kind: PinKind,
    /// Value type.
    pub data_type: PinDataType,
    /// Full name, used in documents and name resolution.
    pub name: String,
    /// Short label preferred for on-canvas display.
    pub short_name: String,
    /// Owning node; always valid while the pin exists.
    pub node: NodeId,
    /// Current value rendered for display and serialization.
    pub value_as_string: String,
    /// Label table for enumeration pins.
    pub enumeration: Option<Vec<String>>,
}

/// Whether a wire feeds a bus input or modulates a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Output bus into a bus input.
    ToBus,
    /// Output bus modulating a parameter pin.
    ToParam,
}

/// A wire between two pins. All four references must resolve for the
/// connection to be considered present; otherwise it is skipped at read time
/// and pruned when either node is deleted.
#[derive(Clone, Copy, Debug)]
pub struct Connection {
    /// Handle of this connection.
    pub id: ConnectionId,
    /// Edge kind.
    pub kind: ConnectionKind,
    /// Source pin (a bus output).
    pub from_pin: PinId,
    /// Source node.
    pub from_node: NodeId,
    /// Destination pin (a bus input or a param).
    pub to_pin: PinId,
    /// Destination node.
    pub to_node: NodeId,
}

/// Membership set of a visual group container. Purely for joint dragging and
/// display; holds no ownership over the member nodes.
#[derive(Clone, Debug, Default)]
pub struct Group {
    /// Member node ids, deduplicated, iterated in id order.
    pub nodes: BTreeSet<NodeId>,
}
