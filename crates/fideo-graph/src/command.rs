//! The deferred Work protocol.
//!
//! Interaction code never mutates the graph directly: every gesture or modal
//! confirmation enqueues a [`Work`] command, and the whole queue is applied
//! in order once per frame, after input processing. Each handler resolves its
//! targets defensively against the current store; a stale handle, an unknown
//! name, or a provider rejection turns that one command into a logged no-op
//! with no partial side effects. The provider is always called before any
//! store record is created, so the store never holds a record the engine
//! refused.

use tracing::{debug, warn};

use crate::entity::{ConnectionId, NodeId, PinId};
use crate::graphic::{NodeGraphic, Vec2};
use crate::node::{Connection, ConnectionKind, Node, Pin, PinKind};
use crate::provider::{AudioProvider, NodeManifest};
use crate::store::GraphStore;

/// A node reference in either live (id) or document (name) form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRef {
    /// Resolved handle from a live gesture.
    Id(NodeId),
    /// Display name from a loaded document.
    Named(String),
}

/// A pin reference in either live (id) or document (node + pin name) form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinTarget {
    /// Resolved handle from a live gesture.
    Pin(PinId),
    /// Names from a loaded document; the handler resolves them against the
    /// pin kind it expects.
    Named {
        /// Display name of the owning node.
        node: String,
        /// Pin name within that node.
        pin: String,
    },
}

/// Wire endpoints in either live (resolved ids) or document (names) form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireSpec {
    /// Endpoints resolved by the hover pass during a drag.
    Resolved {
        /// Source node.
        from_node: NodeId,
        /// Source bus output.
        from_pin: PinId,
        /// Destination node.
        to_node: NodeId,
        /// Destination bus input or param.
        to_pin: PinId,
    },
    /// Endpoints by name, from a loaded document.
    Named {
        /// Source node display name.
        from_node: String,
        /// Source output pin name.
        from_pin: String,
        /// Destination node display name.
        to_node: String,
        /// Destination pin name.
        to_pin: String,
    },
}

/// One deferred graph mutation. Commands are applied strictly in enqueue
/// order at the end of the frame.
#[derive(Clone, Debug)]
pub enum Work {
    /// No effect; a placeholder for gestures that resolve to nothing.
    Nop,
    /// Deletes every node and connection and resets both epochs to zero.
    ClearScene,
    /// Creates the implicit output-device node. Idempotent while the device
    /// node is live.
    CreateRuntimeContext {
        /// Display name; empty means allocate one.
        name: String,
        /// Canvas position for the device node.
        pos: Vec2,
    },
    /// Creates a visual group container.
    CreateGroup {
        /// Display name; empty means allocate one.
        name: String,
        /// Canvas position.
        pos: Vec2,
    },
    /// Creates an audio node of the given kind.
    CreateNode {
        /// Provider kind tag.
        kind: String,
        /// Display name; empty means allocate one from the kind.
        name: String,
        /// Canvas position.
        pos: Vec2,
        /// Group to place the node into, when created over one.
        group: Option<NodeId>,
    },
    /// Adds a dynamically named output to a node.
    CreateOutput {
        /// Owning node.
        node: NodeRef,
        /// Output name.
        name: String,
        /// Channel count.
        channels: u32,
    },
    /// Deletes a node and everything attached to it. Deleting a group
    /// deletes its members.
    DeleteNode {
        /// Node to delete.
        node: NodeId,
    },
    /// Writes a parameter value.
    SetParam {
        /// Target param pin.
        pin: PinTarget,
        /// New value.
        value: f32,
    },
    /// Writes a float setting.
    SetFloatSetting {
        /// Target setting pin.
        pin: PinTarget,
        /// New value.
        value: f32,
    },
    /// Writes an integer setting.
    SetIntSetting {
        /// Target setting pin.
        pin: PinTarget,
        /// New value.
        value: i32,
    },
    /// Writes a boolean setting.
    SetBoolSetting {
        /// Target setting pin.
        pin: PinTarget,
        /// New value.
        value: bool,
    },
    /// Loads a bus setting from an audio file.
    SetBusSetting {
        /// Target setting pin.
        pin: PinTarget,
        /// Path to the audio file.
        path: String,
    },
    /// Selects an enumeration setting by label.
    SetEnumerationSetting {
        /// Target setting pin.
        pin: PinTarget,
        /// Chosen label.
        value: String,
    },
    /// Wires a bus output into a bus input.
    ConnectBusOutToBusIn {
        /// Endpoints.
        wire: WireSpec,
    },
    /// Wires a bus output into a parameter.
    ConnectBusOutToParamIn {
        /// Endpoints.
        wire: WireSpec,
    },
    /// Removes a connection.
    DisconnectInFromOut {
        /// Connection to remove.
        connection: ConnectionId,
    },
    /// Toggles a node's transport between started and stopped.
    Start {
        /// Target node.
        node: NodeId,
    },
    /// Fires a one-shot trigger on a node.
    Bang {
        /// Target node.
        node: NodeId,
    },
    /// Marks the current state as freshly loaded: both epochs become one.
    ResetSaveWorkEpoch,
}

/// Change counters deciding whether the document needs saving.
///
/// The work epoch advances on every applied mutation; the save epoch catches
/// up when the document is written out. Equality means nothing to save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Epochs {
    /// Count of applied mutations.
    pub work: u64,
    /// Work-epoch value at the last save.
    pub save: u64,
}

impl Epochs {
    /// Advances the work epoch by one.
    pub fn increment(&mut self) {
        self.work += 1;
    }

    /// Marks a freshly loaded document: both epochs become one.
    pub fn reset(&mut self) {
        self.work = 1;
        self.save = 1;
    }

    /// Marks an empty scene: both epochs become zero.
    pub fn clear(&mut self) {
        self.work = 0;
        self.save = 0;
    }

    /// Marks a save: the save epoch catches up to the work epoch.
    pub fn unify(&mut self) {
        self.save = self.work;
    }

    /// True when mutations happened since the last save (or load).
    pub fn needs_saving(&self) -> bool {
        self.work != self.save
    }
}

/// Apply-time session state carried across frames.
#[derive(Debug, Default)]
pub struct Session {
    /// Change counters.
    pub epochs: Epochs,
    /// The implicit output-device node, once created.
    pub device_node: Option<NodeId>,
}

/// The per-frame command queue.
#[derive(Debug, Default)]
pub struct WorkQueue {
    queue: Vec<Work>,
}

impl WorkQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a command for the end-of-frame application pass.
    pub fn push(&mut self, work: Work) {
        self.queue.push(work);
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Applies every queued command in enqueue order, then leaves the queue
    /// empty.
    pub fn apply_all(
        &mut self,
        store: &mut GraphStore,
        provider: &mut dyn AudioProvider,
        session: &mut Session,
    ) {
        for work in self.queue.drain(..) {
            apply(work, store, provider, session);
        }
    }
}

/// Applies one command. Failures are logged and leave the graph untouched.
pub fn apply(
    work: Work,
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
) {
    debug!(?work, "applying");
    match work {
        Work::Nop => {}
        Work::ClearScene => clear_scene(store, provider, session),
        Work::CreateRuntimeContext { name, pos } => {
            create_runtime_context(store, provider, session, &name, pos);
        }
        Work::CreateGroup { name, pos } => create_group(store, provider, session, &name, pos),
        Work::CreateNode {
            kind,
            name,
            pos,
            group,
        } => create_node(store, provider, session, &kind, &name, pos, group),
        Work::CreateOutput {
            node,
            name,
            channels,
        } => create_output(store, provider, session, &node, &name, channels),
        Work::DeleteNode { node } => delete_node(store, provider, session, node),
        Work::SetParam { pin, value } => {
            if let Some(pin) = resolve_pin(store, &pin, PinKind::Param) {
                provider.pin_set_float_value(pin, value);
                set_value_string(store, pin, format_float(value));
                session.epochs.increment();
            }
        }
        Work::SetFloatSetting { pin, value } => {
            if let Some(pin) = resolve_pin(store, &pin, PinKind::Setting) {
                provider.pin_set_float_value(pin, value);
                set_value_string(store, pin, format_float(value));
                session.epochs.increment();
            }
        }
        Work::SetIntSetting { pin, value } => {
            if let Some(pin) = resolve_pin(store, &pin, PinKind::Setting) {
                provider.pin_set_int_value(pin, value);
                set_value_string(store, pin, value.to_string());
                session.epochs.increment();
            }
        }
        Work::SetBoolSetting { pin, value } => {
            if let Some(pin) = resolve_pin(store, &pin, PinKind::Setting) {
                provider.pin_set_bool_value(pin, value);
                set_value_string(store, pin, if value { "True" } else { "False" }.to_string());
                session.epochs.increment();
            }
        }
        Work::SetBusSetting { pin, path } => {
            if let Some(pin) = resolve_pin(store, &pin, PinKind::Setting) {
                provider.pin_set_bus_from_file(pin, &path);
                set_value_string(store, pin, basename(&path).to_string());
                session.epochs.increment();
            }
        }
        Work::SetEnumerationSetting { pin, value } => {
            if let Some(pin) = resolve_pin(store, &pin, PinKind::Setting) {
                provider.pin_set_enumeration_value(pin, &value);
                set_value_string(store, pin, value);
                session.epochs.increment();
            }
        }
        Work::ConnectBusOutToBusIn { wire } => {
            connect(store, provider, session, &wire, ConnectionKind::ToBus);
        }
        Work::ConnectBusOutToParamIn { wire } => {
            connect(store, provider, session, &wire, ConnectionKind::ToParam);
        }
        Work::DisconnectInFromOut { connection } => {
            disconnect(store, provider, session, connection);
        }
        Work::Start { node } => {
            if store.node(node).is_some() {
                provider.node_start_stop(node, 0.0);
            } else {
                warn!(node = node.index(), "start on a stale node handle");
            }
        }
        Work::Bang { node } => {
            if store.node(node).is_some() {
                provider.node_bang(node);
            } else {
                warn!(node = node.index(), "bang on a stale node handle");
            }
        }
        Work::ResetSaveWorkEpoch => session.epochs.reset(),
    }
}

fn clear_scene(store: &mut GraphStore, provider: &mut dyn AudioProvider, session: &mut Session) {
    let nodes: Vec<NodeId> = store.nodes().map(|n| n.id).collect();
    for id in nodes {
        let is_group = store.node_graphic(id).is_some_and(|g| g.group);
        if !is_group {
            provider.node_delete(id);
        }
    }
    provider.clear_entity_node_associations();
    store.clear();
    session.device_node = None;
    session.epochs.clear();
}

fn create_runtime_context(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    name: &str,
    pos: Vec2,
) {
    if let Some(device) = session.device_node {
        if store.node(device).is_some() {
            return;
        }
    }
    let node = NodeId(provider.create_entity());
    let manifest = match provider.create_runtime_context(node) {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!(%err, "runtime context creation rejected");
            return;
        }
    };
    let name = pick_name(store, name, "Device");
    provider.associate(node, &name);
    adopt(store, node, "Device", name, manifest, NodeGraphic::at(pos, None));
    session.device_node = Some(node);
    session.epochs.increment();
}

fn create_group(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    name: &str,
    pos: Vec2,
) {
    let node = NodeId(provider.create_entity());
    let name = pick_name(store, name, "Group");
    provider.associate(node, &name);
    store.insert_node(Node::new(node, "Group", name), NodeGraphic::group_at(pos));
    session.epochs.increment();
}

#[allow(clippy::too_many_arguments)]
fn create_node(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    kind: &str,
    name: &str,
    pos: Vec2,
    group: Option<NodeId>,
) {
    let node = NodeId(provider.create_entity());
    let manifest = match provider.node_create(kind, node) {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!(kind, %err, "node creation rejected");
            return;
        }
    };
    let name = pick_name(store, name, kind);
    provider.associate(node, &name);
    let parent = group.filter(|g| store.group(*g).is_some());
    adopt(store, node, kind, name, manifest, NodeGraphic::at(pos, parent));
    if let Some(parent) = parent {
        store.add_to_group(parent, node);
    }
    session.epochs.increment();
}

fn create_output(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    node: &NodeRef,
    name: &str,
    channels: u32,
) {
    let Some(node) = resolve_node(store, node) else {
        warn!(?node, "create-output target did not resolve");
        return;
    };
    // documents record every output; the reflected ones already exist
    if store.output_named(node, name).is_some() {
        return;
    }
    match provider.pin_create_output(node, name, channels) {
        Ok(spec) => {
            store.insert_pin(Pin {
                id: spec.id,
                kind: spec.kind,
                data_type: spec.data_type,
                name: spec.name,
                short_name: spec.short_name,
                node,
                value_as_string: spec.value_as_string,
                enumeration: spec.enumeration,
            });
            session.epochs.increment();
        }
        Err(err) => warn!(node = node.index(), %err, "output creation rejected"),
    }
}

fn delete_node(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    node: NodeId,
) {
    if store.node(node).is_none() {
        warn!(node = node.index(), "delete on a stale node handle");
        return;
    }
    // a group takes its members with it
    for member in store.group_members(node) {
        delete_one(store, provider, session, member);
    }
    delete_one(store, provider, session, node);
    session.epochs.increment();
}

fn delete_one(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    node: NodeId,
) {
    let is_group = store.node_graphic(node).is_some_and(|g| g.group);
    if !is_group {
        provider.node_delete(node);
    }
    store.delete_node_cascade(node);
    if session.device_node == Some(node) {
        session.device_node = None;
    }
}

fn connect(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    wire: &WireSpec,
    kind: ConnectionKind,
) {
    let Some((from_node, from_pin, to_node, to_pin)) = resolve_wire(store, wire, kind) else {
        warn!(?wire, "wire endpoints did not resolve");
        return;
    };
    // the validity gate holds regardless of how the command was produced
    let from_ok = store.pin(from_pin).is_some_and(|p| p.kind == PinKind::BusOut);
    let to_kind = match kind {
        ConnectionKind::ToBus => PinKind::BusIn,
        ConnectionKind::ToParam => PinKind::Param,
    };
    let to_ok = store.pin(to_pin).is_some_and(|p| p.kind == to_kind);
    if !from_ok || !to_ok || from_node == to_node {
        warn!(?wire, "invalid wire dropped");
        return;
    }
    let outcome = match kind {
        ConnectionKind::ToBus => provider.connect_bus_out_to_bus_in(from_node, from_pin, to_node),
        ConnectionKind::ToParam => {
            provider.connect_bus_out_to_param_in(from_node, from_pin, to_pin)
        }
    };
    if let Err(err) = outcome {
        warn!(%err, "connection rejected by the provider");
        return;
    }
    store.insert_connection(Connection {
        id: ConnectionId(provider.create_entity()),
        kind,
        from_pin,
        from_node,
        to_pin,
        to_node,
    });
    session.epochs.increment();
}

fn disconnect(
    store: &mut GraphStore,
    provider: &mut dyn AudioProvider,
    session: &mut Session,
    connection: ConnectionId,
) {
    let Some(record) = store.remove_connection(connection) else {
        warn!(
            connection = connection.index(),
            "disconnect on a stale connection handle"
        );
        return;
    };
    provider.disconnect(
        record.from_node,
        record.from_pin,
        record.to_node,
        record.to_pin,
        record.kind,
    );
    session.epochs.increment();
}

/// Mirrors a provider manifest into store records for a new node.
fn adopt(
    store: &mut GraphStore,
    node: NodeId,
    kind: &str,
    name: String,
    manifest: NodeManifest,
    graphic: NodeGraphic,
) {
    let mut record = Node::new(node, kind, name);
    record.play_controller = manifest.play_controller;
    record.bang_controller = manifest.bang_controller;
    record.render = manifest.render;
    store.insert_node(record, graphic);
    for spec in manifest.pins {
        store.insert_pin(Pin {
            id: spec.id,
            kind: spec.kind,
            data_type: spec.data_type,
            name: spec.name,
            short_name: spec.short_name,
            node,
            value_as_string: spec.value_as_string,
            enumeration: spec.enumeration,
        });
    }
}

fn pick_name(store: &mut GraphStore, requested: &str, kind: &str) -> String {
    if requested.is_empty() {
        store.allocate_name(kind)
    } else {
        store.reserve_name(requested);
        requested.to_string()
    }
}

fn resolve_node(store: &GraphStore, node: &NodeRef) -> Option<NodeId> {
    match node {
        NodeRef::Id(id) => store.node(*id).map(|n| n.id),
        NodeRef::Named(name) => store.node_named(name),
    }
}

fn resolve_pin(store: &GraphStore, target: &PinTarget, kind: PinKind) -> Option<PinId> {
    let resolved = match target {
        PinTarget::Pin(id) => store.pin(*id).filter(|p| p.kind == kind).map(|p| p.id),
        PinTarget::Named { node, pin } => {
            let node = store.node_named(node)?;
            match kind {
                PinKind::Param => store.param_named(node, pin),
                PinKind::Setting => store.setting_named(node, pin),
                PinKind::BusOut => store.output_named(node, pin),
                PinKind::BusIn => None,
            }
        }
    };
    if resolved.is_none() {
        warn!(?target, ?kind, "pin target did not resolve");
    }
    resolved
}

fn resolve_wire(
    store: &GraphStore,
    wire: &WireSpec,
    kind: ConnectionKind,
) -> Option<(NodeId, PinId, NodeId, PinId)> {
    match wire {
        WireSpec::Resolved {
            from_node,
            from_pin,
            to_node,
            to_pin,
        } => Some((*from_node, *from_pin, *to_node, *to_pin)),
        WireSpec::Named {
            from_node,
            from_pin,
            to_node,
            to_pin,
        } => {
            let from_node = store.node_named(from_node)?;
            let from_pin = store
                .output_named(from_node, from_pin)
                .or_else(|| store.output_with_index(from_node, 0))?;
            let to_node = store.node_named(to_node)?;
            let to_pin = match kind {
                ConnectionKind::ToBus => store
                    .input_named(to_node, to_pin)
                    .or_else(|| store.input_with_index(to_node, 0))?,
                ConnectionKind::ToParam => store.param_named(to_node, to_pin)?,
            };
            Some((from_node, from_pin, to_node, to_pin))
        }
    }
}

fn set_value_string(store: &mut GraphStore, pin: PinId, value: String) {
    if let Some(pin) = store.pin_mut(pin) {
        pin.value_as_string = value;
    }
}

/// Float formatting used for displayed and serialized values.
pub fn format_float(value: f32) -> String {
    let s = format!("{value}");
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_law() {
        let mut epochs = Epochs::default();
        assert!(!epochs.needs_saving());
        epochs.increment();
        assert!(epochs.needs_saving());
        epochs.unify();
        assert!(!epochs.needs_saving());
        epochs.reset();
        assert_eq!(epochs, Epochs { work: 1, save: 1 });
        epochs.clear();
        assert_eq!(epochs, Epochs { work: 0, save: 0 });
    }

    #[test]
    fn float_formatting_keeps_a_decimal_point() {
        assert_eq!(format_float(440.0), "440.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(-3.0), "-3.0");
    }

    #[test]
    fn basename_strips_directories() {
        assert_eq!(basename("/a/b/kick.wav"), "kick.wav");
        assert_eq!(basename("kick.wav"), "kick.wav");
        assert_eq!(basename("c:\\samples\\kick.wav"), "kick.wav");
    }
}
