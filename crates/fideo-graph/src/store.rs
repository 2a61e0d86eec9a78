//! The graph store: the single owner of all editor-side graph records.
//!
//! Tables are `BTreeMap`s keyed by entity id. Ids increase monotonically, so
//! iteration over any table visits records in creation order; everything that
//! walks the graph (layout, hover, drawing, serialization) inherits that
//! determinism for free.
//!
//! The store never talks to the audio provider. Mutations arrive from the
//! Work-application phase, which calls the provider first and only mirrors
//! successful results in here.

use std::collections::BTreeMap;

use crate::entity::{ConnectionId, NodeId, PinId};
use crate::graphic::{NodeGraphic, PinGraphic};
use crate::names::UniqueNames;
use crate::node::{Connection, Group, Node, Pin, PinKind};

/// Owner of nodes, pins, connections, layout records, groups, and the
/// unique-name allocator.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: BTreeMap<NodeId, Node>,
    pins: BTreeMap<PinId, Pin>,
    connections: BTreeMap<ConnectionId, Connection>,
    node_graphics: BTreeMap<NodeId, NodeGraphic>,
    pin_graphics: BTreeMap<PinId, PinGraphic>,
    groups: BTreeMap<NodeId, Group>,
    names: UniqueNames,
}

impl GraphStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every record and forgets all issued names.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.pins.clear();
        self.connections.clear();
        self.node_graphics.clear();
        self.pin_graphics.clear();
        self.groups.clear();
        self.names.clear();
    }

    /// Allocates a display name unique in this store, derived from
    /// `requested`.
    pub fn allocate_name(&mut self, requested: &str) -> String {
        self.names.allocate(requested)
    }

    /// Records a caller-chosen name (from a loaded document) so generated
    /// names avoid it.
    pub fn reserve_name(&mut self, name: &str) {
        self.names.reserve(name);
    }

    // --- nodes -----------------------------------------------------------

    /// Inserts a node together with its layout record.
    pub fn insert_node(&mut self, node: Node, graphic: NodeGraphic) {
        let id = node.id;
        if graphic.group {
            self.groups.insert(id, Group::default());
        }
        self.nodes.insert(id, node);
        self.node_graphics.insert(id, graphic);
    }

    /// Looks up a node; `None` means the handle is stale.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable node lookup.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolves a display name to the node carrying it.
    pub fn node_named(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.name == name)
            .map(|node| node.id)
    }

    // --- pins ------------------------------------------------------------

    /// Inserts a pin together with its layout record, appending it to the
    /// owning node's pin list.
    pub fn insert_pin(&mut self, pin: Pin) {
        if let Some(node) = self.nodes.get_mut(&pin.node) {
            node.pins.push(pin.id);
        }
        self.pin_graphics.insert(pin.id, PinGraphic::default());
        self.pins.insert(pin.id, pin);
    }

    /// Looks up a pin; `None` means the handle is stale.
    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    /// Mutable pin lookup.
    pub fn pin_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.pins.get_mut(&id)
    }

    /// All pins in creation order.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    /// The live pins of a node, in the node's pin order.
    pub fn pins_of(&self, node: NodeId) -> impl Iterator<Item = &Pin> {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|n| n.pins.iter())
            .filter_map(|id| self.pins.get(id))
    }

    fn pin_of_kind_named(&self, node: NodeId, kind: PinKind, name: &str) -> Option<PinId> {
        self.pins_of(node)
            .find(|pin| pin.kind == kind && pin.name == name)
            .map(|pin| pin.id)
    }

    fn pin_of_kind_at(&self, node: NodeId, kind: PinKind, index: usize) -> Option<PinId> {
        self.pins_of(node)
            .filter(|pin| pin.kind == kind)
            .nth(index)
            .map(|pin| pin.id)
    }

    /// The node's bus output with the given name.
    pub fn output_named(&self, node: NodeId, name: &str) -> Option<PinId> {
        self.pin_of_kind_named(node, PinKind::BusOut, name)
    }

    /// The node's `index`-th bus output, in pin order.
    pub fn output_with_index(&self, node: NodeId, index: usize) -> Option<PinId> {
        self.pin_of_kind_at(node, PinKind::BusOut, index)
    }

    /// The node's bus input with the given name.
    pub fn input_named(&self, node: NodeId, name: &str) -> Option<PinId> {
        self.pin_of_kind_named(node, PinKind::BusIn, name)
    }

    /// The node's `index`-th bus input, in pin order.
    pub fn input_with_index(&self, node: NodeId, index: usize) -> Option<PinId> {
        self.pin_of_kind_at(node, PinKind::BusIn, index)
    }

    /// The node's parameter pin with the given name.
    pub fn param_named(&self, node: NodeId, name: &str) -> Option<PinId> {
        self.pin_of_kind_named(node, PinKind::Param, name)
    }

    /// The node's setting pin with the given name.
    pub fn setting_named(&self, node: NodeId, name: &str) -> Option<PinId> {
        self.pin_of_kind_named(node, PinKind::Setting, name)
    }

    // --- connections -----------------------------------------------------

    /// Inserts a connection record.
    pub fn insert_connection(&mut self, connection: Connection) {
        self.connections.insert(connection.id, connection);
    }

    /// Looks up a connection; `None` means the handle is stale.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Removes a single connection record.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    /// All connection records in creation order, including any whose
    /// endpoints no longer resolve.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Connections whose four endpoints all resolve to live records. Stale
    /// entries are skipped, never surfaced.
    pub fn resolved_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(|c| {
            self.nodes.contains_key(&c.from_node)
                && self.nodes.contains_key(&c.to_node)
                && self.pins.contains_key(&c.from_pin)
                && self.pins.contains_key(&c.to_pin)
        })
    }

    // --- graphics --------------------------------------------------------

    /// Layout record of a node.
    pub fn node_graphic(&self, id: NodeId) -> Option<&NodeGraphic> {
        self.node_graphics.get(&id)
    }

    /// Mutable layout record of a node.
    pub fn node_graphic_mut(&mut self, id: NodeId) -> Option<&mut NodeGraphic> {
        self.node_graphics.get_mut(&id)
    }

    /// Layout record of a pin.
    pub fn pin_graphic(&self, id: PinId) -> Option<&PinGraphic> {
        self.pin_graphics.get(&id)
    }

    /// Mutable layout record of a pin.
    pub fn pin_graphic_mut(&mut self, id: PinId) -> Option<&mut PinGraphic> {
        self.pin_graphics.get_mut(&id)
    }

    // --- groups ----------------------------------------------------------

    /// Membership set of a group node.
    pub fn group(&self, id: NodeId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Member ids of a group, in id order. Empty for non-groups.
    pub fn group_members(&self, id: NodeId) -> Vec<NodeId> {
        self.groups
            .get(&id)
            .map(|g| g.nodes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Moves `node` into `group`, detaching it from any previous group.
    pub fn add_to_group(&mut self, group: NodeId, node: NodeId) {
        self.detach_from_group(node);
        if let Some(members) = self.groups.get_mut(&group) {
            members.nodes.insert(node);
            if let Some(graphic) = self.node_graphics.get_mut(&node) {
                graphic.parent_group = Some(group);
            }
        }
    }

    /// Removes `node` from its containing group, if any.
    pub fn detach_from_group(&mut self, node: NodeId) {
        let parent = self
            .node_graphics
            .get(&node)
            .and_then(|graphic| graphic.parent_group);
        if let Some(parent) = parent {
            if let Some(members) = self.groups.get_mut(&parent) {
                members.nodes.remove(&node);
            }
        }
        if let Some(graphic) = self.node_graphics.get_mut(&node) {
            graphic.parent_group = None;
        }
    }

    // --- deletion --------------------------------------------------------

    /// Removes a node and everything hanging off it: its pins, the
    /// connections touching it, both layout records, its group membership,
    /// and (for groups) its membership table. Member nodes of a deleted
    /// group are *not* removed here; the command layer deletes them
    /// explicitly so the provider is told about each one.
    ///
    /// Returns the removed connection records so the caller can mirror the
    /// disconnects.
    pub fn delete_node_cascade(&mut self, id: NodeId) -> Vec<Connection> {
        let Some(node) = self.nodes.remove(&id) else {
            return Vec::new();
        };
        for pin in &node.pins {
            self.pins.remove(pin);
            self.pin_graphics.remove(pin);
        }
        self.detach_from_group(id);
        self.node_graphics.remove(&id);
        self.groups.remove(&id);

        let severed: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.from_node == id || c.to_node == id)
            .map(|c| c.id)
            .collect();
        severed
            .into_iter()
            .filter_map(|cid| self.connections.remove(&cid))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ConnectionId, NodeId, PinId};
    use crate::node::{ConnectionKind, PinDataType};

    fn pin(id: u64, node: NodeId, kind: PinKind, name: &str) -> Pin {
        Pin {
            id: PinId(id),
            kind,
            data_type: PinDataType::Bus,
            name: name.to_string(),
            short_name: String::new(),
            node,
            value_as_string: String::new(),
            enumeration: None,
        }
    }

    fn store_with_two_wired_nodes() -> (GraphStore, NodeId, NodeId) {
        let mut store = GraphStore::new();
        let a = NodeId(1);
        let b = NodeId(2);
        store.insert_node(Node::new(a, "Oscillator", "Oscillator-1"), NodeGraphic::default());
        store.insert_node(Node::new(b, "Gain", "Gain-1"), NodeGraphic::default());
        store.insert_pin(pin(3, a, PinKind::BusOut, "out"));
        store.insert_pin(pin(4, b, PinKind::BusIn, "in"));
        store.insert_connection(Connection {
            id: ConnectionId(5),
            kind: ConnectionKind::ToBus,
            from_pin: PinId(3),
            from_node: a,
            to_pin: PinId(4),
            to_node: b,
        });
        (store, a, b)
    }

    #[test]
    fn cascade_delete_removes_pins_and_incident_connections() {
        let (mut store, a, b) = store_with_two_wired_nodes();
        let severed = store.delete_node_cascade(a);
        assert_eq!(severed.len(), 1);
        assert!(store.node(a).is_none());
        assert!(store.pin(PinId(3)).is_none());
        assert!(store.node(b).is_some());
        assert_eq!(store.resolved_connections().count(), 0);
        assert_eq!(store.connections().count(), 0);
    }

    #[test]
    fn resolved_connections_skips_stale_endpoints() {
        let (mut store, _a, b) = store_with_two_wired_nodes();
        // remove the destination pin behind the store's back
        store.pins.remove(&PinId(4));
        assert_eq!(store.connections().count(), 1);
        assert_eq!(store.resolved_connections().count(), 0);
        let _ = b;
    }

    #[test]
    fn named_pin_lookup_respects_kind() {
        let (store, a, b) = store_with_two_wired_nodes();
        assert_eq!(store.output_named(a, "out"), Some(PinId(3)));
        assert_eq!(store.output_named(b, "in"), None);
        assert_eq!(store.input_with_index(b, 0), Some(PinId(4)));
        assert_eq!(store.input_with_index(b, 1), None);
    }

    #[test]
    fn node_named_resolves_display_names() {
        let (store, a, _b) = store_with_two_wired_nodes();
        assert_eq!(store.node_named("Oscillator-1"), Some(a));
        assert_eq!(store.node_named("Oscillator-9"), None);
    }

    #[test]
    fn group_membership_is_symmetric() {
        let mut store = GraphStore::new();
        let g = NodeId(1);
        let n = NodeId(2);
        store.insert_node(
            Node::new(g, "Group", "Group-1"),
            NodeGraphic::group_at(crate::graphic::Vec2::default()),
        );
        store.insert_node(Node::new(n, "Gain", "Gain-1"), NodeGraphic::default());
        store.add_to_group(g, n);
        assert_eq!(store.group_members(g), vec![n]);
        assert_eq!(store.node_graphic(n).unwrap().parent_group, Some(g));
        store.detach_from_group(n);
        assert!(store.group_members(g).is_empty());
        assert_eq!(store.node_graphic(n).unwrap().parent_group, None);
    }

    #[test]
    fn clear_resets_names_too() {
        let mut store = GraphStore::new();
        let name = store.allocate_name("Gain");
        assert_eq!(name, "Gain-1");
        store.clear();
        assert_eq!(store.allocate_name("Gain"), "Gain-1");
    }
}
