//! The per-frame editor driver.
//!
//! `Editor::frame` runs the canonical frame order: sample input, resolve
//! hover and drags, enqueue Work, apply the queue, recompute layout, draw.
//! The editor owns the store, the provider, and all interaction state; the
//! front end owns windows and popups, fed through [`ModalRequest`] and
//! answered with [`ModalResponse`]. While a modal is pending, canvas hover
//! and drag processing is suspended.

use std::path::Path;

use tracing::info;

use fideo_graph::{
    AudioProvider, ConnectionId, DocumentError, DrawSurface, GROUP_MIN_SIZE, GraphDocument,
    GraphStore, NodeId, PinDataType, PinId, PinKind, Session, Vec2, WireSpec, Work, WorkQueue,
    export_source,
};

use crate::draw::{DrawOptions, draw_graph};
use crate::hover::{HoverState, group_under, normalize_wire, update_hovers};
use crate::input::{MouseState, PointerFrame};
use crate::layout::lay_out_pins;
use crate::theme::Theme;
use crate::transform::Canvas;

/// A popup the front end should realize this frame.
#[derive(Clone, Debug)]
pub enum ModalRequest {
    /// Float editor for a param or float setting.
    EditFloat {
        /// Target pin.
        pin: PinId,
        /// Label to show.
        name: String,
        /// Current value.
        value: f32,
    },
    /// Integer editor for an integer setting.
    EditInt {
        /// Target pin.
        pin: PinId,
        /// Label to show.
        name: String,
        /// Current value.
        value: i32,
    },
    /// Boolean toggle for a bool setting.
    EditBool {
        /// Target pin.
        pin: PinId,
        /// Label to show.
        name: String,
        /// Current value.
        value: bool,
    },
    /// Label picker for an enumeration setting.
    EditEnumeration {
        /// Target pin.
        pin: PinId,
        /// Label to show.
        name: String,
        /// Choices.
        labels: Vec<String>,
        /// Currently selected label.
        value: String,
    },
    /// File chooser for a bus setting.
    ChooseBusFile {
        /// Target pin.
        pin: PinId,
        /// Label to show.
        name: String,
    },
    /// Delete/cancel confirmation for a node.
    ConfirmDeleteNode {
        /// Target node.
        node: NodeId,
        /// Display name to show.
        name: String,
    },
    /// Delete/cancel confirmation for a connection.
    ConfirmDeleteConnection {
        /// Target connection.
        connection: ConnectionId,
    },
    /// Right-click node-creation menu.
    ContextMenu {
        /// Canvas position new nodes should appear at.
        pos: Vec2,
        /// Creatable kinds, from the provider.
        kinds: Vec<String>,
        /// Group under the pointer when the menu opened.
        group: Option<NodeId>,
    },
}

/// The front end's answer to a [`ModalRequest`].
#[derive(Clone, Debug)]
pub enum ModalResponse {
    /// Float editor confirmed.
    FloatValue {
        /// Target pin.
        pin: PinId,
        /// New value.
        value: f32,
    },
    /// Integer editor confirmed.
    IntValue {
        /// Target pin.
        pin: PinId,
        /// New value.
        value: i32,
    },
    /// Boolean toggle confirmed.
    BoolValue {
        /// Target pin.
        pin: PinId,
        /// New value.
        value: bool,
    },
    /// Enumeration picker confirmed.
    EnumerationValue {
        /// Target pin.
        pin: PinId,
        /// Chosen label.
        value: String,
    },
    /// File chooser confirmed.
    BusFile {
        /// Target pin.
        pin: PinId,
        /// Chosen path.
        path: String,
    },
    /// Node deletion confirmed.
    DeleteNode {
        /// Target node.
        node: NodeId,
    },
    /// Connection deletion confirmed.
    DeleteConnection {
        /// Target connection.
        connection: ConnectionId,
    },
    /// A kind was picked from the context menu.
    CreateNode {
        /// Kind to create.
        kind: String,
        /// Canvas position.
        pos: Vec2,
        /// Group to create into.
        group: Option<NodeId>,
    },
    /// The popup was dismissed without effect.
    Dismiss,
}

/// The whole interactive editor: graph, provider, view, and gesture state.
pub struct Editor {
    /// The graph being edited.
    pub store: GraphStore,
    /// The audio engine binding.
    pub provider: Box<dyn AudioProvider>,
    /// Pan/zoom view transform.
    pub canvas: Canvas,
    /// What the pointer is over.
    pub hover: HoverState,
    /// Overlay toggles.
    pub options: DrawOptions,
    /// Palette for the draw pass.
    pub theme: Theme,
    session: Session,
    queue: WorkQueue,
    mouse: MouseState,
    modal: Option<ModalRequest>,
    drag_targets: Vec<NodeId>,
    pointer_window: Vec2,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Box::new(fideo_graph::OfflineProvider::new()))
    }
}

impl Editor {
    /// An empty editor over the given provider. The implicit device node is
    /// created on the first frame.
    pub fn new(provider: Box<dyn AudioProvider>) -> Self {
        let mut editor = Self {
            store: GraphStore::new(),
            provider,
            canvas: Canvas::default(),
            hover: HoverState::default(),
            options: DrawOptions::default(),
            theme: Theme::default(),
            session: Session::default(),
            queue: WorkQueue::new(),
            mouse: MouseState::default(),
            modal: None,
            drag_targets: Vec::new(),
            pointer_window: Vec2::default(),
        };
        editor.queue.push(Work::CreateRuntimeContext {
            name: String::new(),
            pos: Vec2::new(600.0, 100.0),
        });
        editor
    }

    /// Enqueues a command for this frame's application pass.
    pub fn push(&mut self, work: Work) {
        self.queue.push(work);
    }

    /// The popup the front end should show, if any.
    pub fn modal(&self) -> Option<&ModalRequest> {
        self.modal.as_ref()
    }

    /// True when mutations happened since the last save or load.
    pub fn needs_saving(&self) -> bool {
        self.session.epochs.needs_saving()
    }

    /// Runs one frame: input, gestures, command application, layout, draw.
    pub fn frame(
        &mut self,
        pointer: &PointerFrame,
        viewport: (Vec2, Vec2),
        surface: &mut dyn DrawSurface,
    ) {
        self.canvas.viewport_origin = viewport.0;
        self.pointer_window = pointer.pos;

        if self.modal.is_none() {
            self.process_input(pointer);
        }

        self.queue
            .apply_all(&mut self.store, &mut *self.provider, &mut self.session);
        lay_out_pins(&mut self.store);

        let pending_wire = if self.mouse.dragging_wire {
            self.hover
                .originating_pin
                .map(|pin| (pin, self.pointer_window))
        } else {
            None
        };
        draw_graph(
            &self.store,
            &*self.provider,
            &self.canvas,
            &self.hover,
            pending_wire,
            &self.theme,
            &self.options,
            viewport,
            surface,
        );
    }

    fn process_input(&mut self, pointer: &PointerFrame) {
        self.mouse.update(pointer);
        let canvas_pos = self.canvas.to_canvas(pointer.pos);

        if pointer.in_viewport && pointer.wheel != 0.0 {
            self.canvas.zoom_at(pointer.pos, pointer.wheel);
        }

        // hover follows the pointer while idle and while a wire is in flight
        if !self.mouse.gesture_active() || self.mouse.dragging_wire {
            update_hovers(
                &mut self.hover,
                &self.store,
                &self.canvas,
                canvas_pos,
                pointer.pos,
            );
        }

        if pointer.secondary_clicked && pointer.in_viewport {
            self.modal = Some(ModalRequest::ContextMenu {
                pos: canvas_pos,
                kinds: self
                    .provider
                    .node_names()
                    .iter()
                    .map(|k| (*k).to_string())
                    .collect(),
                group: self.hover.group,
            });
            return;
        }

        if self.mouse.click_initiated {
            self.begin_gesture(canvas_pos);
        } else if self.mouse.dragging {
            self.continue_gesture(canvas_pos);
        } else if self.mouse.click_ended {
            self.finish_gesture(canvas_pos);
        }
    }

    fn begin_gesture(&mut self, canvas_pos: Vec2) {
        self.mouse.initial_pos = self.pointer_window;
        self.mouse.initial_canvas_pos = canvas_pos;

        if let Some(pin) = self.hover.pin {
            self.hover.originating_pin = Some(pin);
            self.mouse.dragging_wire = true;
            return;
        }
        // labels sit inside the node body, so they must win over node drag
        if let Some(pin) = self.hover.pin_label {
            self.modal = self.edit_request(pin);
            return;
        }
        if self.hover.resize_corner {
            if let Some(node) = self.hover.node {
                self.capture_drag_anchor(&[node]);
                self.drag_targets = vec![node];
                self.mouse.resizing_node = true;
            }
            return;
        }
        if let Some(node) = self.hover.node {
            if self.hover.play {
                self.queue.push(Work::Start { node });
                return;
            }
            if self.hover.bang {
                self.queue.push(Work::Bang { node });
                return;
            }
            if self.hover.header_menu {
                let name = self
                    .store
                    .node(node)
                    .map(|n| n.name.clone())
                    .unwrap_or_default();
                self.modal = Some(ModalRequest::ConfirmDeleteNode { node, name });
                return;
            }
            // drag the node, and the whole group when it is a container
            let mut targets = vec![node];
            targets.extend(self.store.group_members(node));
            self.capture_drag_anchor(&targets);
            self.drag_targets = targets;
            self.mouse.dragging_node = true;
            return;
        }
        if let Some(connection) = self.hover.connection {
            self.modal = Some(ModalRequest::ConfirmDeleteConnection { connection });
            return;
        }
        self.mouse.interacting_with_canvas = true;
    }

    fn capture_drag_anchor(&mut self, targets: &[NodeId]) {
        for node in targets {
            if let Some(graphic) = self.store.node_graphic_mut(*node) {
                graphic.drag_anchor = graphic.ul;
            }
        }
    }

    fn continue_gesture(&mut self, canvas_pos: Vec2) {
        if self.mouse.interacting_with_canvas {
            let previous = self.mouse.initial_pos;
            self.canvas.pan(self.pointer_window - previous);
            self.mouse.initial_pos = self.pointer_window;
            return;
        }
        let delta = canvas_pos - self.mouse.initial_canvas_pos;
        if self.mouse.dragging_node {
            for node in &self.drag_targets {
                if let Some(graphic) = self.store.node_graphic_mut(*node) {
                    let size = graphic.size();
                    graphic.ul = graphic.drag_anchor + delta;
                    graphic.lr = graphic.ul + size;
                }
            }
        } else if self.mouse.resizing_node {
            for node in &self.drag_targets {
                if let Some(graphic) = self.store.node_graphic_mut(*node) {
                    graphic.lr = Vec2::new(
                        canvas_pos.x.max(graphic.ul.x + GROUP_MIN_SIZE.x),
                        canvas_pos.y.max(graphic.ul.y + GROUP_MIN_SIZE.y),
                    );
                }
            }
        }
        // a wire drag needs no per-frame state; the draw pass reads the
        // originating pin and the pointer directly
    }

    fn finish_gesture(&mut self, canvas_pos: Vec2) {
        if self.mouse.dragging_wire {
            if let (Some(origin), Some(target)) = (self.hover.originating_pin, self.hover.pin) {
                if let Some((from, to)) = normalize_wire(&self.store, origin, target) {
                    let work = self.connect_work(from, to);
                    self.queue.push(work);
                }
            }
            self.hover.originating_pin = None;
        }
        if self.mouse.dragging_node {
            // dropping a node over a group adopts it; elsewhere releases it.
            // hover is frozen during node drags, so the drop target comes
            // from a fresh hit test at the release position
            let drop = group_under(&self.store, canvas_pos);
            for node in std::mem::take(&mut self.drag_targets) {
                if self.store.node_graphic(node).is_some_and(|g| g.group) {
                    continue;
                }
                match drop {
                    Some(group) if group != node => self.store.add_to_group(group, node),
                    _ => self.store.detach_from_group(node),
                }
            }
        }
        self.drag_targets.clear();
        self.mouse.end_gesture();
    }

    fn connect_work(&self, from: PinId, to: PinId) -> Work {
        let wire = |store: &GraphStore| -> Option<WireSpec> {
            Some(WireSpec::Resolved {
                from_node: store.pin(from)?.node,
                from_pin: from,
                to_node: store.pin(to)?.node,
                to_pin: to,
            })
        };
        let Some(wire) = wire(&self.store) else {
            return Work::Nop;
        };
        match self.store.pin(to).map(|p| p.kind) {
            Some(PinKind::Param) => Work::ConnectBusOutToParamIn { wire },
            Some(PinKind::BusIn) => Work::ConnectBusOutToBusIn { wire },
            _ => Work::Nop,
        }
    }

    fn edit_request(&mut self, pin: PinId) -> Option<ModalRequest> {
        let record = self.store.pin(pin)?;
        let name = if record.short_name.is_empty() {
            record.name.clone()
        } else {
            record.short_name.clone()
        };
        Some(match (record.kind, record.data_type) {
            (PinKind::Param, _) | (_, PinDataType::Float) => ModalRequest::EditFloat {
                pin,
                name,
                value: self.provider.pin_float_value(pin),
            },
            (_, PinDataType::Integer) => ModalRequest::EditInt {
                pin,
                name,
                value: self.provider.pin_int_value(pin),
            },
            (_, PinDataType::Bool) => ModalRequest::EditBool {
                pin,
                name,
                value: self.provider.pin_bool_value(pin),
            },
            (_, PinDataType::Enumeration) => ModalRequest::EditEnumeration {
                pin,
                name,
                labels: record.enumeration.clone().unwrap_or_default(),
                value: record.value_as_string.clone(),
            },
            (_, PinDataType::Bus) => ModalRequest::ChooseBusFile { pin, name },
            _ => return None,
        })
    }

    /// Consumes the front end's answer to the pending modal.
    pub fn respond(&mut self, response: ModalResponse) {
        self.modal = None;
        let target = |pin| fideo_graph::PinTarget::Pin(pin);
        match response {
            ModalResponse::FloatValue { pin, value } => {
                let work = match self.store.pin(pin).map(|p| p.kind) {
                    Some(PinKind::Param) => Work::SetParam { pin: target(pin), value },
                    _ => Work::SetFloatSetting { pin: target(pin), value },
                };
                self.queue.push(work);
            }
            ModalResponse::IntValue { pin, value } => {
                self.queue.push(Work::SetIntSetting { pin: target(pin), value });
            }
            ModalResponse::BoolValue { pin, value } => {
                self.queue.push(Work::SetBoolSetting { pin: target(pin), value });
            }
            ModalResponse::EnumerationValue { pin, value } => {
                self.queue
                    .push(Work::SetEnumerationSetting { pin: target(pin), value });
            }
            ModalResponse::BusFile { pin, path } => {
                self.queue.push(Work::SetBusSetting { pin: target(pin), path });
            }
            ModalResponse::DeleteNode { node } => {
                self.queue.push(Work::DeleteNode { node });
            }
            ModalResponse::DeleteConnection { connection } => {
                self.queue.push(Work::DisconnectInFromOut { connection });
            }
            ModalResponse::CreateNode { kind, pos, group } => {
                // groups are editor-side containers, not provider kinds
                if kind == "Group" {
                    self.queue.push(Work::CreateGroup {
                        name: String::new(),
                        pos,
                    });
                } else {
                    self.queue.push(Work::CreateNode {
                        kind,
                        name: String::new(),
                        pos,
                        group,
                    });
                }
            }
            ModalResponse::Dismiss => {}
        }
    }

    /// Writes the graph to `path` and marks the state saved.
    pub fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        GraphDocument::capture(&self.store).save(path)?;
        self.session.epochs.unify();
        info!(path = %path.display(), "saved");
        Ok(())
    }

    /// Loads `path`, replacing the current graph via command replay.
    pub fn load(&mut self, path: &Path) -> Result<(), DocumentError> {
        let document = GraphDocument::load(path)?;
        for work in document.replay() {
            self.queue.push(work);
        }
        self.queue
            .apply_all(&mut self.store, &mut *self.provider, &mut self.session);
        self.session.device_node = self
            .store
            .nodes()
            .find(|n| n.kind == "Device")
            .map(|n| n.id);
        info!(path = %path.display(), "loaded");
        Ok(())
    }

    /// Writes the generated-source projection to `path`.
    pub fn export(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, export_source(&self.store))?;
        Ok(())
    }

    /// Empties the scene and recreates the implicit device node.
    pub fn clear_all(&mut self) {
        self.queue.push(Work::ClearScene);
        self.queue.push(Work::CreateRuntimeContext {
            name: String::new(),
            pos: Vec2::new(600.0, 100.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fideo_graph::{Icon, Rgba};

    struct NullSurface;
    impl DrawSurface for NullSurface {
        fn rect_filled(&mut self, _: Vec2, _: Vec2, _: f32, _: Rgba) {}
        fn rect_stroke(&mut self, _: Vec2, _: Vec2, _: f32, _: f32, _: Rgba) {}
        fn line(&mut self, _: Vec2, _: Vec2, _: f32, _: Rgba) {}
        fn bezier(&mut self, _: [Vec2; 4], _: f32, _: Rgba) {}
        fn icon(&mut self, _: Icon, _: Vec2, _: Vec2, _: Rgba, _: Rgba) {}
        fn text(&mut self, _: Vec2, _: f32, _: Rgba, _: &str) {}
    }

    fn run_frame(editor: &mut Editor, pointer: PointerFrame) {
        let viewport = (Vec2::new(0.0, 24.0), Vec2::new(1280.0, 800.0));
        editor.frame(&pointer, viewport, &mut NullSurface);
    }

    fn idle() -> PointerFrame {
        PointerFrame {
            in_viewport: true,
            dt: 1.0 / 60.0,
            ..PointerFrame::default()
        }
    }

    #[test]
    fn first_frame_creates_the_device_node() {
        let mut editor = Editor::default();
        run_frame(&mut editor, idle());
        assert_eq!(editor.store.node_count(), 1);
        assert_eq!(editor.store.nodes().next().expect("device").kind, "Device");
    }

    #[test]
    fn context_menu_lists_provider_kinds() {
        let mut editor = Editor::default();
        run_frame(&mut editor, idle());
        run_frame(
            &mut editor,
            PointerFrame {
                secondary_clicked: true,
                pos: Vec2::new(300.0, 300.0),
                ..idle()
            },
        );
        let Some(ModalRequest::ContextMenu { kinds, .. }) = editor.modal() else {
            panic!("expected a context menu");
        };
        assert!(kinds.iter().any(|k| k == "Oscillator"));
    }

    #[test]
    fn context_menu_response_creates_a_node() {
        let mut editor = Editor::default();
        run_frame(&mut editor, idle());
        editor.respond(ModalResponse::CreateNode {
            kind: "Gain".to_string(),
            pos: Vec2::new(50.0, 50.0),
            group: None,
        });
        run_frame(&mut editor, idle());
        assert!(editor.store.node_named("Gain-1").is_some());
        assert!(editor.needs_saving());
    }

    #[test]
    fn modal_suspends_canvas_interaction() {
        let mut editor = Editor::default();
        run_frame(&mut editor, idle());
        run_frame(
            &mut editor,
            PointerFrame {
                secondary_clicked: true,
                ..idle()
            },
        );
        assert!(editor.modal().is_some());
        // a wheel over the canvas must not zoom while the popup is open
        let scale = editor.canvas.scale;
        run_frame(
            &mut editor,
            PointerFrame {
                wheel: 2.0,
                ..idle()
            },
        );
        assert!((editor.canvas.scale - scale).abs() < f32::EPSILON);
        editor.respond(ModalResponse::Dismiss);
        run_frame(
            &mut editor,
            PointerFrame {
                wheel: 2.0,
                ..idle()
            },
        );
        assert!(editor.canvas.scale > scale);
    }

    #[test]
    fn dragging_a_node_across_a_group_boundary_moves_its_membership() {
        let mut editor = Editor::default();
        run_frame(&mut editor, idle());
        editor.respond(ModalResponse::CreateNode {
            kind: "Group".to_string(),
            pos: Vec2::new(0.0, 300.0),
            group: None,
        });
        run_frame(&mut editor, idle());
        let group = editor
            .store
            .nodes()
            .find(|n| editor.store.node_graphic(n.id).is_some_and(|g| g.group))
            .expect("group")
            .id;
        editor.respond(ModalResponse::CreateNode {
            kind: "Gain".to_string(),
            pos: Vec2::new(40.0, 340.0),
            group: Some(group),
        });
        run_frame(&mut editor, idle());
        let gain = editor.store.node_named("Gain-1").expect("gain");
        let parent = |editor: &Editor| {
            editor
                .store
                .node_graphic(gain)
                .expect("graphic")
                .parent_group
        };
        assert_eq!(parent(&editor), Some(group));

        // grab the body below the pins and drag well clear of the group
        let held = |x, y| PointerFrame {
            pos: Vec2::new(x, y),
            primary_down: true,
            ..idle()
        };
        let released = |x, y| PointerFrame {
            pos: Vec2::new(x, y),
            ..idle()
        };
        run_frame(&mut editor, held(100.0, 426.0));
        run_frame(&mut editor, held(900.0, 426.0));
        run_frame(&mut editor, released(900.0, 426.0));
        assert_eq!(parent(&editor), None);

        // drag it back over the group; the drop adopts it again
        run_frame(&mut editor, held(900.0, 426.0));
        run_frame(&mut editor, held(140.0, 426.0));
        run_frame(&mut editor, released(140.0, 426.0));
        assert_eq!(parent(&editor), Some(group));
    }

    #[test]
    fn save_then_load_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("patch.json");

        let mut editor = Editor::default();
        run_frame(&mut editor, idle());
        editor.respond(ModalResponse::CreateNode {
            kind: "Oscillator".to_string(),
            pos: Vec2::new(40.0, 40.0),
            group: None,
        });
        run_frame(&mut editor, idle());
        editor.save(&path).expect("save");
        assert!(!editor.needs_saving());

        let mut fresh = Editor::default();
        run_frame(&mut fresh, idle());
        fresh.load(&path).expect("load");
        assert!(fresh.store.node_named("Oscillator-1").is_some());
        assert!(!fresh.needs_saving());
    }

    #[test]
    fn clear_all_keeps_an_editable_scene() {
        let mut editor = Editor::default();
        run_frame(&mut editor, idle());
        editor.respond(ModalResponse::CreateNode {
            kind: "Gain".to_string(),
            pos: Vec2::default(),
            group: None,
        });
        run_frame(&mut editor, idle());
        editor.clear_all();
        run_frame(&mut editor, idle());
        assert_eq!(editor.store.node_count(), 1);
        assert_eq!(editor.store.nodes().next().expect("device").kind, "Device");
    }
}
