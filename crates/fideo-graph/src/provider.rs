//! The Audio Provider contract.
//!
//! The editor core never touches audio: node realization, signal wiring, and
//! value storage live behind this trait, implemented by an audio-engine
//! binding (or by [`OfflineProvider`](crate::OfflineProvider) when no engine
//! is attached). The core calls the provider only from the Work-application
//! phase, one command at a time.
//!
//! Creation calls return a [`NodeManifest`], the provider's reflected
//! port/parameter/setting list, which the core mirrors into
//! [`Pin`](crate::Pin) records. The provider allocates pin ids from the
//! shared entity counter and keeps its own pin-id to engine-object map, so
//! later `pin_*` calls identify targets by id alone.

use thiserror::Error;

use crate::entity::{EntityId, NodeId, PinId};
use crate::node::{ConnectionKind, NodeRender, PinDataType, PinKind};

/// Why the provider declined a request. All variants are non-fatal: the
/// issuing command becomes a no-op and no graph record is created.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested node kind is not known to the engine.
    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    /// A referenced node has no engine-side counterpart.
    #[error("no engine node for id {0}")]
    UnknownNode(EntityId),

    /// A referenced pin has no engine-side counterpart.
    #[error("no engine pin for id {0}")]
    UnknownPin(EntityId),

    /// The engine rejected a wiring request (incompatible endpoints).
    #[error("connection rejected: {0}")]
    ConnectionRejected(String),

    /// The runtime context already exists or could not be created.
    #[error("runtime context unavailable: {0}")]
    Context(String),
}

/// One reflected pin in a [`NodeManifest`].
#[derive(Clone, Debug)]
pub struct PinSpec {
    /// Provider-allocated handle for the pin.
    pub id: PinId,
    /// Role on the node.
    pub kind: PinKind,
    /// Value type.
    pub data_type: PinDataType,
    /// Full name.
    pub name: String,
    /// Short display label.
    pub short_name: String,
    /// Initial value rendered for display.
    pub value_as_string: String,
    /// Label table for enumeration pins.
    pub enumeration: Option<Vec<String>>,
}

impl PinSpec {
    /// A bus pin (input or output) with the given name.
    pub fn bus(id: PinId, kind: PinKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            data_type: PinDataType::Bus,
            name: name.into(),
            short_name: String::new(),
            value_as_string: String::new(),
            enumeration: None,
        }
    }
}

/// Everything the core needs to mirror a freshly created engine node.
#[derive(Clone, Debug, Default)]
pub struct NodeManifest {
    /// Reflected pins: bus inputs, bus outputs, params, settings.
    pub pins: Vec<PinSpec>,
    /// The node exposes a start/stop transport control.
    pub play_controller: bool,
    /// The node exposes a one-shot trigger control.
    pub bang_controller: bool,
    /// Custom body renderer, when the kind wants one.
    pub render: Option<NodeRender>,
}

/// The external audio engine binding consumed by the editor core.
pub trait AudioProvider {
    /// Allocates the next entity number from the shared counter.
    fn create_entity(&mut self) -> EntityId;

    /// Realizes the implicit output-device node and returns its manifest.
    fn create_runtime_context(&mut self, node: NodeId) -> Result<NodeManifest, ProviderError>;

    /// Creates an engine node of `kind` bound to `node` and returns its
    /// reflected manifest.
    fn node_create(&mut self, kind: &str, node: NodeId) -> Result<NodeManifest, ProviderError>;

    /// Destroys the engine node, disconnecting it fully first.
    fn node_delete(&mut self, node: NodeId);

    /// The kind tags this provider can create.
    fn node_names(&self) -> &[&'static str];

    /// Wires a bus output into a node's bus input.
    fn connect_bus_out_to_bus_in(
        &mut self,
        from_node: NodeId,
        from_pin: PinId,
        to_node: NodeId,
    ) -> Result<(), ProviderError>;

    /// Wires a bus output into a parameter for modulation.
    fn connect_bus_out_to_param_in(
        &mut self,
        from_node: NodeId,
        from_pin: PinId,
        param_pin: PinId,
    ) -> Result<(), ProviderError>;

    /// Unwires an edge. Endpoints arrive individually, each resolved by the
    /// core from the connection record's own stored ids.
    fn disconnect(
        &mut self,
        from_node: NodeId,
        from_pin: PinId,
        to_node: NodeId,
        to_pin: PinId,
        kind: ConnectionKind,
    );

    /// Writes a float to a param or float setting.
    fn pin_set_float_value(&mut self, pin: PinId, value: f32);

    /// Writes an integer to a param or integer/enumeration setting.
    fn pin_set_int_value(&mut self, pin: PinId, value: i32);

    /// Writes a boolean to a param or bool setting.
    fn pin_set_bool_value(&mut self, pin: PinId, value: bool);

    /// Selects an enumeration setting by label.
    fn pin_set_enumeration_value(&mut self, pin: PinId, value: &str);

    /// Loads a bus setting's content from an audio file.
    fn pin_set_bus_from_file(&mut self, pin: PinId, path: &str);

    /// Reads a pin's float value.
    fn pin_float_value(&self, pin: PinId) -> f32;

    /// Reads a pin's integer value.
    fn pin_int_value(&self, pin: PinId) -> i32;

    /// Reads a pin's boolean value.
    fn pin_bool_value(&self, pin: PinId) -> bool;

    /// Adds a dynamically named output port with `channels` channels to the
    /// node and returns the reflected pin.
    fn pin_create_output(
        &mut self,
        node: NodeId,
        name: &str,
        channels: u32,
    ) -> Result<PinSpec, ProviderError>;

    /// Toggles a scheduled node between started and stopped at `when`
    /// seconds.
    fn node_start_stop(&mut self, node: NodeId, when: f32);

    /// Fires a one-shot trigger on the node.
    fn node_bang(&mut self, node: NodeId);

    /// Inclusive processing time of the node's subgraph, seconds.
    fn node_get_timing(&self, node: NodeId) -> f32;

    /// Self processing time of the node, seconds.
    fn node_get_self_timing(&self, node: NodeId) -> f32;

    /// Records the display name chosen for a node, for engine-side
    /// bookkeeping.
    fn associate(&mut self, node: NodeId, name: &str);

    /// Drops all node/name associations. Called on scene clear.
    fn clear_entity_node_associations(&mut self);
}
