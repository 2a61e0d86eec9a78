//! Fideo Graph - the editor core of the fideo noodle editor
//!
//! This crate owns everything about an audio node graph except pixels and
//! audio: the record store, the deferred command protocol that is the only
//! way to mutate it, the contract to an external audio engine, and the
//! document formats.
//!
//! # Core Abstractions
//!
//! ## Graph Store
//!
//! - [`GraphStore`] - single owner of all node/pin/connection records
//! - [`Node`], [`Pin`], [`Connection`], [`Group`] - the record types
//! - [`NodeId`], [`PinId`], [`ConnectionId`] - opaque handles; validity is
//!   liveness in the store
//!
//! ## Work Protocol
//!
//! - [`Work`] - one deferred mutation per variant
//! - [`WorkQueue`] - applied strictly in order at the end of each frame
//! - [`Session`], [`Epochs`] - apply-time state and the needs-saving law
//!
//! ## Collaborator Contracts
//!
//! - [`AudioProvider`] - the audio engine seam; [`OfflineProvider`] is the
//!   bundled engineless implementation
//! - [`DrawSurface`] - the rendering seam the draw pass and node render
//!   callbacks paint through
//!
//! ## Persistence
//!
//! - [`GraphDocument`] - the saved schema; loading replays [`Work`] commands
//! - [`export_source`] - one-way projection into engine construction code
//!
//! # Example
//!
//! ```rust
//! use fideo_graph::{
//!     GraphStore, OfflineProvider, Session, Vec2, Work, WorkQueue,
//! };
//!
//! let mut store = GraphStore::new();
//! let mut provider = OfflineProvider::new();
//! let mut session = Session::default();
//! let mut queue = WorkQueue::new();
//!
//! queue.push(Work::CreateNode {
//!     kind: "Oscillator".to_string(),
//!     name: String::new(),
//!     pos: Vec2::new(100.0, 100.0),
//!     group: None,
//! });
//! queue.apply_all(&mut store, &mut provider, &mut session);
//!
//! assert_eq!(store.node_count(), 1);
//! assert!(session.epochs.needs_saving());
//! ```

pub mod command;
pub mod document;
pub mod entity;
pub mod export;
pub mod graphic;
pub mod names;
pub mod node;
pub mod offline;
pub mod provider;
pub mod store;
pub mod surface;

// Re-export main types at crate root
pub use command::{
    Epochs, NodeRef, PinTarget, Session, WireSpec, Work, WorkQueue, format_float,
};
pub use document::{ConnectionRecord, DocumentError, GraphDocument, NodeRecord, PinRecord};
pub use entity::{ConnectionId, EntityId, NodeId, PinId};
pub use export::export_source;
pub use graphic::{
    COLUMN_WIDTH, GROUP_MIN_SIZE, GraphicLayer, HEADER_HEIGHT, NodeGraphic, PADDING_X, PADDING_Y,
    PIN_HEIGHT, PIN_WIDTH, PinGraphic, RESIZE_CORNER, Vec2,
};
pub use names::UniqueNames;
pub use node::{
    Connection, ConnectionKind, Group, Node, NodeRender, Pin, PinDataType, PinKind,
};
pub use offline::OfflineProvider;
pub use provider::{AudioProvider, NodeManifest, PinSpec, ProviderError};
pub use store::GraphStore;
pub use surface::{DrawSurface, Icon, Rgba};
