//! Document persistence.
//!
//! A saved graph is a list of node records (kind, name, position, typed pin
//! values) and a list of connection records with endpoints by *name*. Ids are
//! never persisted; they are not stable across sessions. Loading is replay:
//! the document is turned back into the same [`Work`] commands live editing
//! uses, applied through the ordinary queue, so a loaded graph passes through
//! exactly one code path.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::command::{NodeRef, PinTarget, WireSpec, Work};
use crate::graphic::Vec2;
use crate::node::{ConnectionKind, PinDataType, PinKind};
use crate::store::GraphStore;

/// Why a document could not be read or written.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Filesystem failure.
    #[error("document i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The text is not a well-formed document.
    #[error("document parse failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One persisted pin: outputs, params, and settings. Bus inputs are omitted;
/// they are reflected from the node kind at creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PinRecord {
    /// `"bus_out"`, `"param"`, or `"setting"`.
    pub kind: String,
    /// Pin name within the node.
    pub name: String,
    /// Value rendered as a string, absent for outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Value type tag for settings.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// One persisted node.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    /// Kind tag, including `"Device"` and `"Group"`.
    pub kind: String,
    /// Display name, unique in the document.
    pub name: String,
    /// Canvas position of the upper-left corner.
    pub position: [f32; 2],
    /// Persisted pins in pin order.
    pub pins: Vec<PinRecord>,
}

/// One persisted connection, endpoints by name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConnectionRecord {
    /// Source node display name.
    pub from_node: String,
    /// Source output pin name.
    pub from_pin: String,
    /// Destination node display name.
    pub to_node: String,
    /// Destination pin name.
    pub to_pin: String,
    /// `"bus"` or `"param"`.
    pub to_pin_kind: String,
}

/// The persisted graph: nodes then connections, both in creation order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    /// Node records.
    pub nodes: Vec<NodeRecord>,
    /// Connection records.
    pub connections: Vec<ConnectionRecord>,
}

/// On-disk envelope identifying the format.
#[derive(Serialize, Deserialize)]
struct Envelope {
    fideo: GraphDocument,
}

fn data_type_tag(data_type: PinDataType) -> &'static str {
    match data_type {
        PinDataType::None => "none",
        PinDataType::Bus => "bus",
        PinDataType::Bool => "bool",
        PinDataType::Integer => "int",
        PinDataType::Enumeration => "enumeration",
        PinDataType::Float => "float",
        PinDataType::String => "string",
    }
}

impl GraphDocument {
    /// Snapshots the store into document records.
    pub fn capture(store: &GraphStore) -> Self {
        let mut nodes = Vec::with_capacity(store.node_count());
        for node in store.nodes() {
            let mut pins = Vec::new();
            for pin in store.pins_of(node.id) {
                match pin.kind {
                    PinKind::BusIn => {}
                    PinKind::BusOut => pins.push(PinRecord {
                        kind: "bus_out".to_string(),
                        name: pin.name.clone(),
                        value: None,
                        data_type: None,
                    }),
                    PinKind::Param => pins.push(PinRecord {
                        kind: "param".to_string(),
                        name: pin.name.clone(),
                        value: Some(pin.value_as_string.clone()),
                        data_type: None,
                    }),
                    PinKind::Setting => pins.push(PinRecord {
                        kind: "setting".to_string(),
                        name: pin.name.clone(),
                        value: Some(pin.value_as_string.clone()),
                        data_type: Some(data_type_tag(pin.data_type).to_string()),
                    }),
                }
            }
            let ul = store
                .node_graphic(node.id)
                .map(|g| g.ul)
                .unwrap_or_default();
            nodes.push(NodeRecord {
                kind: node.kind.clone(),
                name: node.name.clone(),
                position: [ul.x, ul.y],
                pins,
            });
        }

        let connections = store
            .resolved_connections()
            .filter_map(|c| {
                let from_node = store.node(c.from_node)?;
                let from_pin = store.pin(c.from_pin)?;
                let to_node = store.node(c.to_node)?;
                let to_pin = store.pin(c.to_pin)?;
                Some(ConnectionRecord {
                    from_node: from_node.name.clone(),
                    from_pin: from_pin.name.clone(),
                    to_node: to_node.name.clone(),
                    to_pin: to_pin.name.clone(),
                    to_pin_kind: match c.kind {
                        ConnectionKind::ToBus => "bus",
                        ConnectionKind::ToParam => "param",
                    }
                    .to_string(),
                })
            })
            .collect();

        Self { nodes, connections }
    }

    /// Serializes the document to pretty JSON under the format envelope.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&Envelope {
            fideo: self.clone(),
        })?)
    }

    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str::<Envelope>(text)?.fideo)
    }

    /// Writes the document to a file.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a document from a file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Expands the document into the command sequence that rebuilds it:
    /// clear, create every node with its values, wire every connection, then
    /// mark the epochs as freshly loaded. Records that fail to parse are
    /// skipped individually.
    pub fn replay(&self) -> Vec<Work> {
        let mut works = vec![Work::ClearScene];

        for node in &self.nodes {
            let pos = Vec2::new(node.position[0], node.position[1]);
            works.push(match node.kind.as_str() {
                "Device" => Work::CreateRuntimeContext {
                    name: node.name.clone(),
                    pos,
                },
                "Group" => Work::CreateGroup {
                    name: node.name.clone(),
                    pos,
                },
                kind => Work::CreateNode {
                    kind: kind.to_string(),
                    name: node.name.clone(),
                    pos,
                    group: None,
                },
            });
            for pin in &node.pins {
                if let Some(work) = pin_work(&node.name, pin) {
                    works.push(work);
                }
            }
        }

        for connection in &self.connections {
            let wire = WireSpec::Named {
                from_node: connection.from_node.clone(),
                from_pin: connection.from_pin.clone(),
                to_node: connection.to_node.clone(),
                to_pin: connection.to_pin.clone(),
            };
            works.push(match connection.to_pin_kind.as_str() {
                "param" => Work::ConnectBusOutToParamIn { wire },
                _ => Work::ConnectBusOutToBusIn { wire },
            });
        }

        works.push(Work::ResetSaveWorkEpoch);
        works
    }
}

fn pin_work(node_name: &str, pin: &PinRecord) -> Option<Work> {
    let target = || PinTarget::Named {
        node: node_name.to_string(),
        pin: pin.name.clone(),
    };
    match pin.kind.as_str() {
        "bus_out" => Some(Work::CreateOutput {
            node: NodeRef::Named(node_name.to_string()),
            name: pin.name.clone(),
            channels: 1,
        }),
        "param" => {
            let value = parse_float(node_name, pin)?;
            Some(Work::SetParam {
                pin: target(),
                value,
            })
        }
        "setting" => {
            let value = pin.value.clone()?;
            match pin.data_type.as_deref() {
                Some("float") => Some(Work::SetFloatSetting {
                    pin: target(),
                    value: parse_float(node_name, pin)?,
                }),
                Some("int") => Some(Work::SetIntSetting {
                    pin: target(),
                    value: value.parse().ok()?,
                }),
                Some("bool") => Some(Work::SetBoolSetting {
                    pin: target(),
                    value: value.eq_ignore_ascii_case("true"),
                }),
                Some("bus") => Some(Work::SetBusSetting {
                    pin: target(),
                    path: value,
                }),
                Some("enumeration") => Some(Work::SetEnumerationSetting {
                    pin: target(),
                    value,
                }),
                other => {
                    warn!(node = node_name, pin = %pin.name, ?other, "setting type not replayable");
                    None
                }
            }
        }
        other => {
            warn!(node = node_name, pin = %pin.name, other, "unknown pin record kind");
            None
        }
    }
}

fn parse_float(node_name: &str, pin: &PinRecord) -> Option<f32> {
    let text = pin.value.as_deref()?;
    match text.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(node = node_name, pin = %pin.name, text, "value did not parse as a float");
            None
        }
    }
}
