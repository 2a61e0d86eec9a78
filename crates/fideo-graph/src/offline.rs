//! In-process audio provider.
//!
//! `OfflineProvider` implements the full [`AudioProvider`] contract with no
//! audio engine behind it: a catalog of built-in node kinds supplies the
//! reflected manifests, pin values live in maps so reads round-trip, and
//! every engine-facing call is appended to a log the tests assert against.
//! The bundled GUI runs on it, so the editor is fully usable without a
//! device.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::entity::{EntityId, NodeId, PinId};
use crate::graphic::Vec2;
use crate::node::{ConnectionKind, NodeRender, PinDataType, PinKind};
use crate::provider::{AudioProvider, NodeManifest, PinSpec, ProviderError};
use crate::surface::{DrawSurface, Rgba};

/// A parameter exposed by a built-in kind.
struct ParamDescriptor {
    name: &'static str,
    short_name: &'static str,
    default: f32,
}

/// A setting exposed by a built-in kind.
struct SettingDescriptor {
    name: &'static str,
    short_name: &'static str,
    data_type: PinDataType,
    default: &'static str,
    labels: Option<&'static [&'static str]>,
}

/// Describes one built-in node kind: its bus arity, parameters, settings,
/// and controller capabilities.
struct KindDescriptor {
    name: &'static str,
    inputs: u32,
    outputs: u32,
    params: &'static [ParamDescriptor],
    settings: &'static [SettingDescriptor],
    play_controller: bool,
    bang_controller: bool,
    spectrum: bool,
}

const OSCILLATOR_TYPES: &[&str] = &["Sine", "FastSine", "Square", "Sawtooth", "Triangle"];
const FILTER_TYPES: &[&str] = &[
    "LowPass", "HighPass", "BandPass", "LowShelf", "HighShelf", "Peaking", "Notch", "AllPass",
];
const NOISE_TYPES: &[&str] = &["White", "Pink", "Brown"];

const KINDS: &[KindDescriptor] = &[
    KindDescriptor {
        name: "Oscillator",
        inputs: 0,
        outputs: 1,
        params: &[
            ParamDescriptor { name: "frequency", short_name: "freq", default: 440.0 },
            ParamDescriptor { name: "detune", short_name: "det", default: 0.0 },
            ParamDescriptor { name: "amplitude", short_name: "amp", default: 1.0 },
        ],
        settings: &[SettingDescriptor {
            name: "type",
            short_name: "type",
            data_type: PinDataType::Enumeration,
            default: "Sine",
            labels: Some(OSCILLATOR_TYPES),
        }],
        play_controller: true,
        bang_controller: false,
        spectrum: false,
    },
    KindDescriptor {
        name: "Gain",
        inputs: 1,
        outputs: 1,
        params: &[ParamDescriptor { name: "gain", short_name: "gain", default: 1.0 }],
        settings: &[],
        play_controller: false,
        bang_controller: false,
        spectrum: false,
    },
    KindDescriptor {
        name: "Delay",
        inputs: 1,
        outputs: 1,
        params: &[ParamDescriptor { name: "delayTime", short_name: "time", default: 0.0 }],
        settings: &[],
        play_controller: false,
        bang_controller: false,
        spectrum: false,
    },
    KindDescriptor {
        name: "BiquadFilter",
        inputs: 1,
        outputs: 1,
        params: &[
            ParamDescriptor { name: "frequency", short_name: "freq", default: 350.0 },
            ParamDescriptor { name: "Q", short_name: "Q", default: 1.0 },
            ParamDescriptor { name: "gain", short_name: "gain", default: 0.0 },
            ParamDescriptor { name: "detune", short_name: "det", default: 0.0 },
        ],
        settings: &[SettingDescriptor {
            name: "type",
            short_name: "type",
            data_type: PinDataType::Enumeration,
            default: "LowPass",
            labels: Some(FILTER_TYPES),
        }],
        play_controller: false,
        bang_controller: false,
        spectrum: false,
    },
    KindDescriptor {
        name: "Noise",
        inputs: 0,
        outputs: 1,
        params: &[],
        settings: &[SettingDescriptor {
            name: "type",
            short_name: "type",
            data_type: PinDataType::Enumeration,
            default: "White",
            labels: Some(NOISE_TYPES),
        }],
        play_controller: true,
        bang_controller: false,
        spectrum: false,
    },
    KindDescriptor {
        name: "Analyser",
        inputs: 1,
        outputs: 1,
        params: &[],
        settings: &[SettingDescriptor {
            name: "fftSize",
            short_name: "fft",
            data_type: PinDataType::Integer,
            default: "2048",
            labels: None,
        }],
        play_controller: false,
        bang_controller: false,
        spectrum: true,
    },
    KindDescriptor {
        name: "ADSR",
        inputs: 1,
        outputs: 1,
        params: &[
            ParamDescriptor { name: "attack", short_name: "atk", default: 0.05 },
            ParamDescriptor { name: "decay", short_name: "dcy", default: 0.05 },
            ParamDescriptor { name: "sustain", short_name: "sus", default: 0.75 },
            ParamDescriptor { name: "release", short_name: "rel", default: 0.0625 },
        ],
        settings: &[],
        play_controller: false,
        bang_controller: true,
        spectrum: false,
    },
    KindDescriptor {
        name: "StereoPanner",
        inputs: 1,
        outputs: 1,
        params: &[ParamDescriptor { name: "pan", short_name: "pan", default: 0.0 }],
        settings: &[],
        play_controller: false,
        bang_controller: false,
        spectrum: false,
    },
    KindDescriptor {
        name: "SampledAudio",
        inputs: 0,
        outputs: 1,
        params: &[ParamDescriptor { name: "playbackRate", short_name: "rate", default: 1.0 }],
        settings: &[SettingDescriptor {
            name: "sourceBus",
            short_name: "src",
            data_type: PinDataType::Bus,
            default: "",
            labels: None,
        }],
        play_controller: true,
        bang_controller: false,
        spectrum: false,
    },
];

/// A stored pin value.
#[derive(Clone, Debug, PartialEq)]
enum PinValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Text(String),
}

/// Placeholder spectrum drawn inside Analyser bodies: the display frame with
/// a flat trace, since there is no engine to sample.
fn spectrum_render() -> NodeRender {
    NodeRender(Arc::new(
        |_node: NodeId, ul: Vec2, lr: Vec2, _scale: f32, surface: &mut dyn DrawSurface| {
            let frame = Rgba::rgb(100, 100, 100);
            surface.rect_stroke(ul, lr, 2.0, 1.0, frame);
            let baseline = lr.y - (lr.y - ul.y) * 0.25;
            surface.line(
                Vec2::new(ul.x + 2.0, baseline),
                Vec2::new(lr.x - 2.0, baseline),
                1.0,
                Rgba::rgb(241, 196, 15),
            );
        },
    ))
}

/// The engineless provider. See the module docs.
pub struct OfflineProvider {
    next_entity: EntityId,
    kind_names: Vec<&'static str>,
    node_kinds: HashMap<NodeId, &'static str>,
    pin_values: HashMap<PinId, PinValue>,
    associations: HashMap<NodeId, String>,
    started: BTreeSet<NodeId>,
    calls: Vec<String>,
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineProvider {
    /// A provider with the built-in kind catalog and no nodes.
    pub fn new() -> Self {
        Self {
            next_entity: 1,
            kind_names: KINDS.iter().map(|k| k.name).collect(),
            node_kinds: HashMap::new(),
            pin_values: HashMap::new(),
            associations: HashMap::new(),
            started: BTreeSet::new(),
            calls: Vec::new(),
        }
    }

    /// Every engine-facing call made so far, oldest first.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Empties the call log.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// True when the node's transport is currently started.
    pub fn is_started(&self, node: NodeId) -> bool {
        self.started.contains(&node)
    }

    fn log(&mut self, call: String) {
        debug!(%call, "offline provider");
        self.calls.push(call);
    }

    fn descriptor(kind: &str) -> Option<&'static KindDescriptor> {
        KINDS.iter().find(|k| k.name == kind)
    }

    fn reflect(&mut self, descriptor: &'static KindDescriptor) -> NodeManifest {
        let mut pins = Vec::new();
        for i in 0..descriptor.inputs {
            let name = if i == 0 { "in".to_string() } else { format!("in{}", i + 1) };
            pins.push(PinSpec::bus(PinId(self.create_entity()), PinKind::BusIn, name));
        }
        for i in 0..descriptor.outputs {
            let name = if i == 0 { "out".to_string() } else { format!("out{}", i + 1) };
            pins.push(PinSpec::bus(PinId(self.create_entity()), PinKind::BusOut, name));
        }
        for param in descriptor.params {
            let id = PinId(self.create_entity());
            self.pin_values.insert(id, PinValue::Float(param.default));
            pins.push(PinSpec {
                id,
                kind: PinKind::Param,
                data_type: PinDataType::Float,
                name: param.name.to_string(),
                short_name: param.short_name.to_string(),
                value_as_string: crate::command::format_float(param.default),
                enumeration: None,
            });
        }
        for setting in descriptor.settings {
            let id = PinId(self.create_entity());
            let value = match setting.data_type {
                PinDataType::Integer => {
                    PinValue::Int(setting.default.parse().unwrap_or_default())
                }
                PinDataType::Bool => PinValue::Bool(setting.default.eq_ignore_ascii_case("true")),
                PinDataType::Float => {
                    PinValue::Float(setting.default.parse().unwrap_or_default())
                }
                _ => PinValue::Text(setting.default.to_string()),
            };
            self.pin_values.insert(id, value);
            pins.push(PinSpec {
                id,
                kind: PinKind::Setting,
                data_type: setting.data_type,
                name: setting.name.to_string(),
                short_name: setting.short_name.to_string(),
                value_as_string: setting.default.to_string(),
                enumeration: setting
                    .labels
                    .map(|labels| labels.iter().map(|l| (*l).to_string()).collect()),
            });
        }
        NodeManifest {
            pins,
            play_controller: descriptor.play_controller,
            bang_controller: descriptor.bang_controller,
            render: descriptor.spectrum.then(spectrum_render),
        }
    }
}

impl AudioProvider for OfflineProvider {
    fn create_entity(&mut self) -> EntityId {
        let id = self.next_entity;
        self.next_entity += 1;
        id
    }

    fn create_runtime_context(&mut self, node: NodeId) -> Result<NodeManifest, ProviderError> {
        self.log(format!("create_runtime_context({})", node.index()));
        self.node_kinds.insert(node, "Device");
        let input = PinSpec::bus(PinId(self.create_entity()), PinKind::BusIn, "in");
        Ok(NodeManifest {
            pins: vec![input],
            play_controller: false,
            bang_controller: false,
            render: None,
        })
    }

    fn node_create(&mut self, kind: &str, node: NodeId) -> Result<NodeManifest, ProviderError> {
        let descriptor =
            Self::descriptor(kind).ok_or_else(|| ProviderError::UnknownKind(kind.to_string()))?;
        self.log(format!("node_create({kind}, {})", node.index()));
        self.node_kinds.insert(node, descriptor.name);
        Ok(self.reflect(descriptor))
    }

    fn node_delete(&mut self, node: NodeId) {
        self.log(format!("node_delete({})", node.index()));
        self.node_kinds.remove(&node);
        self.started.remove(&node);
        self.associations.remove(&node);
    }

    fn node_names(&self) -> &[&'static str] {
        &self.kind_names
    }

    fn connect_bus_out_to_bus_in(
        &mut self,
        from_node: NodeId,
        from_pin: PinId,
        to_node: NodeId,
    ) -> Result<(), ProviderError> {
        if !self.node_kinds.contains_key(&from_node) {
            return Err(ProviderError::UnknownNode(from_node.index()));
        }
        if !self.node_kinds.contains_key(&to_node) {
            return Err(ProviderError::UnknownNode(to_node.index()));
        }
        self.log(format!(
            "connect_bus_out_to_bus_in({}, {}, {})",
            from_node.index(),
            from_pin.index(),
            to_node.index()
        ));
        Ok(())
    }

    fn connect_bus_out_to_param_in(
        &mut self,
        from_node: NodeId,
        from_pin: PinId,
        param_pin: PinId,
    ) -> Result<(), ProviderError> {
        if !self.node_kinds.contains_key(&from_node) {
            return Err(ProviderError::UnknownNode(from_node.index()));
        }
        if !self.pin_values.contains_key(&param_pin) {
            return Err(ProviderError::UnknownPin(param_pin.index()));
        }
        self.log(format!(
            "connect_bus_out_to_param_in({}, {}, {})",
            from_node.index(),
            from_pin.index(),
            param_pin.index()
        ));
        Ok(())
    }

    fn disconnect(
        &mut self,
        from_node: NodeId,
        from_pin: PinId,
        to_node: NodeId,
        to_pin: PinId,
        kind: ConnectionKind,
    ) {
        self.log(format!(
            "disconnect({}, {}, {}, {}, {kind:?})",
            from_node.index(),
            from_pin.index(),
            to_node.index(),
            to_pin.index()
        ));
    }

    fn pin_set_float_value(&mut self, pin: PinId, value: f32) {
        self.log(format!("pin_set_float_value({}, {value})", pin.index()));
        self.pin_values.insert(pin, PinValue::Float(value));
    }

    fn pin_set_int_value(&mut self, pin: PinId, value: i32) {
        self.log(format!("pin_set_int_value({}, {value})", pin.index()));
        self.pin_values.insert(pin, PinValue::Int(value));
    }

    fn pin_set_bool_value(&mut self, pin: PinId, value: bool) {
        self.log(format!("pin_set_bool_value({}, {value})", pin.index()));
        self.pin_values.insert(pin, PinValue::Bool(value));
    }

    fn pin_set_enumeration_value(&mut self, pin: PinId, value: &str) {
        self.log(format!("pin_set_enumeration_value({}, {value})", pin.index()));
        self.pin_values.insert(pin, PinValue::Text(value.to_string()));
    }

    fn pin_set_bus_from_file(&mut self, pin: PinId, path: &str) {
        self.log(format!("pin_set_bus_from_file({}, {path})", pin.index()));
        self.pin_values.insert(pin, PinValue::Text(path.to_string()));
    }

    fn pin_float_value(&self, pin: PinId) -> f32 {
        match self.pin_values.get(&pin) {
            Some(PinValue::Float(v)) => *v,
            Some(PinValue::Int(v)) => *v as f32,
            _ => 0.0,
        }
    }

    fn pin_int_value(&self, pin: PinId) -> i32 {
        match self.pin_values.get(&pin) {
            Some(PinValue::Int(v)) => *v,
            Some(PinValue::Float(v)) => *v as i32,
            _ => 0,
        }
    }

    fn pin_bool_value(&self, pin: PinId) -> bool {
        matches!(self.pin_values.get(&pin), Some(PinValue::Bool(true)))
    }

    fn pin_create_output(
        &mut self,
        node: NodeId,
        name: &str,
        channels: u32,
    ) -> Result<PinSpec, ProviderError> {
        if !self.node_kinds.contains_key(&node) {
            return Err(ProviderError::UnknownNode(node.index()));
        }
        self.log(format!(
            "pin_create_output({}, {name}, {channels})",
            node.index()
        ));
        Ok(PinSpec::bus(PinId(self.create_entity()), PinKind::BusOut, name))
    }

    fn node_start_stop(&mut self, node: NodeId, when: f32) {
        self.log(format!("node_start_stop({}, {when})", node.index()));
        if !self.started.remove(&node) {
            self.started.insert(node);
        }
    }

    fn node_bang(&mut self, node: NodeId) {
        self.log(format!("node_bang({})", node.index()));
    }

    fn node_get_timing(&self, node: NodeId) -> f32 {
        // a stable nonzero figure keeps the profiler strip visible offline
        ((node.index() % 7) + 1) as f32 * 1e-4
    }

    fn node_get_self_timing(&self, node: NodeId) -> f32 {
        ((node.index() % 7) + 1) as f32 * 5e-5
    }

    fn associate(&mut self, node: NodeId, name: &str) {
        self.associations.insert(node, name.to_string());
    }

    fn clear_entity_node_associations(&mut self) {
        self.associations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_rejected() {
        let mut provider = OfflineProvider::new();
        let node = NodeId(provider.create_entity());
        assert!(matches!(
            provider.node_create("Theremin", node),
            Err(ProviderError::UnknownKind(_))
        ));
    }

    #[test]
    fn oscillator_manifest_reflects_catalog() {
        let mut provider = OfflineProvider::new();
        let node = NodeId(provider.create_entity());
        let manifest = provider.node_create("Oscillator", node).unwrap();
        assert!(manifest.play_controller);
        assert!(!manifest.bang_controller);
        let outs = manifest.pins.iter().filter(|p| p.kind == PinKind::BusOut).count();
        assert_eq!(outs, 1);
        let freq = manifest
            .pins
            .iter()
            .find(|p| p.name == "frequency")
            .unwrap();
        assert_eq!(freq.kind, PinKind::Param);
        assert_eq!(freq.value_as_string, "440.0");
        let ty = manifest.pins.iter().find(|p| p.name == "type").unwrap();
        assert_eq!(ty.data_type, PinDataType::Enumeration);
        assert!(ty.enumeration.as_deref().unwrap().contains(&"Square".to_string()));
    }

    #[test]
    fn float_values_round_trip() {
        let mut provider = OfflineProvider::new();
        let node = NodeId(provider.create_entity());
        let manifest = provider.node_create("Gain", node).unwrap();
        let gain = manifest.pins.iter().find(|p| p.name == "gain").unwrap().id;
        assert!((provider.pin_float_value(gain) - 1.0).abs() < f32::EPSILON);
        provider.pin_set_float_value(gain, 0.25);
        assert!((provider.pin_float_value(gain) - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn entity_ids_are_never_reused() {
        let mut provider = OfflineProvider::new();
        let a = provider.create_entity();
        let node = NodeId(provider.create_entity());
        let manifest = provider.node_create("Gain", node).unwrap();
        let max_pin = manifest.pins.iter().map(|p| p.id.index()).max().unwrap();
        let next = provider.create_entity();
        assert!(a < node.index());
        assert!(node.index() < max_pin);
        assert!(max_pin < next);
    }

    #[test]
    fn start_stop_toggles() {
        let mut provider = OfflineProvider::new();
        let node = NodeId(provider.create_entity());
        provider.node_create("Oscillator", node).unwrap();
        provider.node_start_stop(node, 0.0);
        assert!(provider.is_started(node));
        provider.node_start_stop(node, 0.0);
        assert!(!provider.is_started(node));
    }

    #[test]
    fn analyser_carries_a_render_callback() {
        let mut provider = OfflineProvider::new();
        let node = NodeId(provider.create_entity());
        let manifest = provider.node_create("Analyser", node).unwrap();
        assert!(manifest.render.is_some());
    }
}
