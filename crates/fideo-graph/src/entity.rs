//! Opaque entity handles for the noodle graph.
//!
//! Handles are plain numbers: no generation bits, no validity flag baked into
//! the value. A handle is *live* exactly when the corresponding
//! [`GraphStore`](crate::GraphStore) lookup succeeds, so staleness is decided
//! at the point of use, never encoded in the id itself.
//!
//! Ids for every entity kind come from one shared counter owned by the
//! [`AudioProvider`](crate::AudioProvider), so a node id is never numerically
//! equal to a pin id within a session. The ordering derives give the store's
//! `BTreeMap` tables a stable creation-order iteration.

use serde::{Deserialize, Serialize};

/// Raw entity number shared by all handle kinds.
pub type EntityId = u64;

/// Unique identifier for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub EntityId);

/// Unique identifier for a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PinId(pub EntityId);

/// Unique identifier for a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub EntityId);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> EntityId {
        self.0
    }
}

impl PinId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> EntityId {
        self.0
    }
}

impl ConnectionId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> EntityId {
        self.0
    }
}
