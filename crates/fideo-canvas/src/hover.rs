//! Hover resolution and wire validity.
//!
//! Recomputed every idle frame (and during wire drags) from the pointer's
//! canvas position. Resolution order: pin icons and labels first, then node
//! bodies with smallest-area-wins among overlaps, then connections, which
//! are only tested when no node is under the pointer. Setting pins never
//! take icon hover; they are edited through their labels, not wired.

use fideo_graph::{
    Connection, ConnectionId, GraphStore, HEADER_HEIGHT, NodeId, PIN_WIDTH, PinId, PinKind,
    RESIZE_CORNER, Vec2,
};

use crate::transform::Canvas;
use crate::wire::{WIRE_HIT_DISTANCE_SQ, closest_distance_sq, wire_bezier};

/// Width of one header icon slot, canvas units.
const HEADER_SLOT: f32 = 20.0;

/// Everything under the pointer this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoverState {
    /// Hovered pin icon, wire-draggable.
    pub pin: Option<PinId>,
    /// Hovered pin label, editable.
    pub pin_label: Option<PinId>,
    /// Hovered node (smallest area among overlaps).
    pub node: Option<NodeId>,
    /// Hovered group body (smallest area among overlaps), for context-menu
    /// placement and drops.
    pub group: Option<NodeId>,
    /// Hovered connection; only set when no node is hovered.
    pub connection: Option<ConnectionId>,
    /// Pointer is on the hovered node's header menu region.
    pub header_menu: bool,
    /// Pointer is on the hovered node's play icon.
    pub play: bool,
    /// Pointer is on the hovered node's bang icon.
    pub bang: bool,
    /// Pointer is on the hovered group's resize corner.
    pub resize_corner: bool,
    /// Origin pin of the wire being dragged, if any.
    pub originating_pin: Option<PinId>,
    /// The pending wire's current endpoints form a valid connection.
    pub wire_valid: bool,
}

impl HoverState {
    /// Forgets everything except the in-flight wire drag.
    pub fn reset(&mut self) {
        let originating = self.originating_pin;
        *self = Self::default();
        self.originating_pin = originating;
    }
}

/// Normalizes a candidate pin pair so the first element is the output side,
/// returning `None` for any invalid pairing: a Setting anywhere, an
/// output-to-output or input-to-input pair, or both pins on one node.
pub fn normalize_wire(store: &GraphStore, a: PinId, b: PinId) -> Option<(PinId, PinId)> {
    let pa = store.pin(a)?;
    let pb = store.pin(b)?;
    let (from, to) = if matches!(pa.kind, PinKind::BusIn | PinKind::Param) {
        (pb, pa)
    } else {
        (pa, pb)
    };
    if matches!(to.kind, PinKind::Setting | PinKind::BusOut) {
        return None;
    }
    if matches!(from.kind, PinKind::BusIn | PinKind::Param | PinKind::Setting) {
        return None;
    }
    if from.node == to.node {
        return None;
    }
    Some((from.id, to.id))
}

/// Resolves the hover state for the pointer at `canvas_pos`.
pub fn update_hovers(
    hover: &mut HoverState,
    store: &GraphStore,
    canvas: &Canvas,
    canvas_pos: Vec2,
    window_pos: Vec2,
) {
    hover.reset();

    hover_pins(hover, store, canvas_pos);
    hover_nodes(hover, store, canvas_pos);
    hover.group = group_under(store, canvas_pos);
    if hover.node.is_none() && hover.pin.is_none() {
        hover_connections(hover, store, canvas, window_pos);
    }

    if let Some(origin) = hover.originating_pin {
        hover.wire_valid = hover
            .pin
            .is_some_and(|target| normalize_wire(store, origin, target).is_some());
    }
}

fn hover_pins(hover: &mut HoverState, store: &GraphStore, p: Vec2) {
    for pin in store.pins() {
        let Some(graphic) = store.pin_graphic(pin.id) else {
            continue;
        };
        if store.node_graphic(pin.node).is_none_or(|g| g.group) {
            continue;
        }
        if graphic.icon_contains(p) && pin.kind != PinKind::Setting {
            hover.pin = Some(pin.id);
        }
        if graphic.label_contains(p)
            && matches!(pin.kind, PinKind::Param | PinKind::Setting)
        {
            hover.pin_label = Some(pin.id);
        }
    }
}

fn hover_nodes(hover: &mut HoverState, store: &GraphStore, p: Vec2) {
    let mut best_area = f32::MAX;
    for node in store.nodes() {
        let Some(graphic) = store.node_graphic(node.id) else {
            continue;
        };
        // the hit box adds the header strip above and a pin-wide margin on
        // the right so edge-riding output icons stay grabbable
        let inside = p.x >= graphic.ul.x
            && p.x <= graphic.lr.x + PIN_WIDTH
            && p.y >= graphic.ul.y - HEADER_HEIGHT
            && p.y <= graphic.lr.y;
        if !inside {
            continue;
        }
        let size = graphic.size();
        let area = size.x * size.y;
        if area < best_area {
            best_area = area;
            hover.node = Some(node.id);
        }
    }

    let Some(id) = hover.node else {
        return;
    };
    let (Some(node), Some(graphic)) = (store.node(id), store.node_graphic(id)) else {
        return;
    };
    if p.y < graphic.ul.y {
        // header strip, left to right: play, bang, then the menu
        let mut edge = graphic.ul.x;
        if node.play_controller {
            if p.x < edge + HEADER_SLOT {
                hover.play = true;
                return;
            }
            edge += HEADER_SLOT;
        }
        if node.bang_controller {
            if p.x < edge + HEADER_SLOT {
                hover.bang = true;
                return;
            }
        }
        hover.header_menu = true;
    } else if graphic.group {
        let corner = graphic.lr - Vec2::new(RESIZE_CORNER, RESIZE_CORNER);
        hover.resize_corner = p.x >= corner.x && p.y >= corner.y;
    }
}

/// The innermost group whose body contains the canvas-space point. Among
/// nested or overlapping groups the smallest area wins, matching node hover.
/// Also called at drag release to pick the drop target, since hover freezes
/// while a node drag is in flight.
pub fn group_under(store: &GraphStore, p: Vec2) -> Option<NodeId> {
    let mut best_area = f32::MAX;
    let mut best = None;
    for node in store.nodes() {
        let Some(graphic) = store.node_graphic(node.id) else {
            continue;
        };
        if !graphic.group {
            continue;
        }
        let inside = p.x >= graphic.ul.x
            && p.x <= graphic.lr.x + PIN_WIDTH
            && p.y >= graphic.ul.y - HEADER_HEIGHT
            && p.y <= graphic.lr.y;
        if !inside {
            continue;
        }
        let size = graphic.size();
        let area = size.x * size.y;
        if area < best_area {
            best_area = area;
            best = Some(node.id);
        }
    }
    best
}

fn hover_connections(
    hover: &mut HoverState,
    store: &GraphStore,
    canvas: &Canvas,
    window_pos: Vec2,
) {
    let mut best = WIRE_HIT_DISTANCE_SQ;
    for connection in store.resolved_connections() {
        let Some(points) = connection_bezier(store, canvas, connection) else {
            continue;
        };
        let d = closest_distance_sq(&points, window_pos);
        if d < best {
            best = d;
            hover.connection = Some(connection.id);
        }
    }
}

/// Window-space curve for a stored connection: output icon center to input
/// icon center.
pub fn connection_bezier(
    store: &GraphStore,
    canvas: &Canvas,
    connection: &Connection,
) -> Option<[Vec2; 4]> {
    let from = pin_anchor(store, connection.from_pin)?;
    let to = pin_anchor(store, connection.to_pin)?;
    Some(wire_bezier(
        canvas.to_window(from),
        canvas.to_window(to),
        canvas.scale,
    ))
}

/// Canvas-space center of a pin's icon.
pub fn pin_anchor(store: &GraphStore, pin: PinId) -> Option<Vec2> {
    let graphic = store.pin_graphic(pin)?;
    Some(graphic.ul() + Vec2::new(PIN_WIDTH * 0.5, PIN_WIDTH * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::lay_out_pins;
    use fideo_graph::{COLUMN_WIDTH, OfflineProvider, Session, Work, WorkQueue};

    struct Rig {
        store: GraphStore,
        provider: OfflineProvider,
        session: Session,
    }

    fn rig(specs: &[(&str, Vec2)]) -> (Rig, Vec<NodeId>) {
        let mut rig = Rig {
            store: GraphStore::new(),
            provider: OfflineProvider::new(),
            session: Session::default(),
        };
        let mut queue = WorkQueue::new();
        for (kind, pos) in specs {
            queue.push(Work::CreateNode {
                kind: (*kind).to_string(),
                name: String::new(),
                pos: *pos,
                group: None,
            });
        }
        queue.apply_all(&mut rig.store, &mut rig.provider, &mut rig.session);
        lay_out_pins(&mut rig.store);
        let ids = rig.store.nodes().map(|n| n.id).collect();
        (rig, ids)
    }

    fn hover_at(store: &GraphStore, p: Vec2) -> HoverState {
        let canvas = Canvas::default();
        let mut hover = HoverState::default();
        update_hovers(&mut hover, store, &canvas, p, canvas.to_window(p));
        hover
    }

    #[test]
    fn pin_icon_hover_beats_node_hover_for_wiring() {
        let (rig, ids) = rig(&[("Gain", Vec2::new(100.0, 100.0))]);
        let input = rig.store.input_with_index(ids[0], 0).expect("in");
        let anchor = pin_anchor(&rig.store, input).expect("anchor");
        let hover = hover_at(&rig.store, anchor);
        assert_eq!(hover.pin, Some(input));
        assert_eq!(hover.node, Some(ids[0]));
    }

    #[test]
    fn setting_icons_take_label_hover_only() {
        let (rig, ids) = rig(&[("Oscillator", Vec2::new(0.0, 0.0))]);
        let setting = rig.store.setting_named(ids[0], "type").expect("setting");
        let anchor = pin_anchor(&rig.store, setting).expect("anchor");
        let on_icon = hover_at(&rig.store, anchor);
        assert_eq!(on_icon.pin, None);
        let on_label = hover_at(&rig.store, anchor + Vec2::new(PIN_WIDTH * 2.0, 0.0));
        assert_eq!(on_label.pin_label, Some(setting));
    }

    #[test]
    fn smallest_node_wins_on_overlap() {
        // a wide filter and a narrow gain stacked at the same spot
        let (rig, ids) = rig(&[
            ("BiquadFilter", Vec2::new(0.0, 0.0)),
            ("Gain", Vec2::new(10.0, 10.0)),
        ]);
        let inside_both = Vec2::new(60.0, 40.0);
        let hover = hover_at(&rig.store, inside_both);
        assert_eq!(hover.node, Some(ids[1]));
    }

    #[test]
    fn header_regions_resolve_in_order() {
        let (rig, _ids) = rig(&[("Oscillator", Vec2::new(100.0, 100.0))]);
        // oscillator has a play controller, no bang
        let play = hover_at(&rig.store, Vec2::new(105.0, 90.0));
        assert!(play.play && !play.header_menu);
        let menu = hover_at(&rig.store, Vec2::new(150.0, 90.0));
        assert!(menu.header_menu && !menu.play);
    }

    #[test]
    fn connections_hover_only_away_from_nodes() {
        let (mut rig, ids) = rig(&[
            ("Oscillator", Vec2::new(0.0, 0.0)),
            ("Gain", Vec2::new(COLUMN_WIDTH * 4.0, 0.0)),
        ]);
        let (osc, gain) = (ids[0], ids[1]);
        let from_pin = rig.store.output_with_index(osc, 0).expect("out");
        let to_pin = rig.store.input_with_index(gain, 0).expect("in");
        let mut queue = WorkQueue::new();
        queue.push(Work::ConnectBusOutToBusIn {
            wire: fideo_graph::WireSpec::Resolved {
                from_node: osc,
                from_pin,
                to_node: gain,
                to_pin,
            },
        });
        queue.apply_all(&mut rig.store, &mut rig.provider, &mut rig.session);
        lay_out_pins(&mut rig.store);
        let connection = rig.store.resolved_connections().next().expect("edge").id;

        let from = pin_anchor(&rig.store, from_pin).expect("a");
        let to = pin_anchor(&rig.store, to_pin).expect("b");
        let midpoint = (from + to) * 0.5;
        let hover = hover_at(&rig.store, midpoint);
        assert_eq!(hover.node, None);
        assert_eq!(hover.connection, Some(connection));
    }

    #[test]
    fn innermost_group_wins_among_nested_groups() {
        let (mut rig, _) = rig(&[]);
        let mut queue = WorkQueue::new();
        queue.push(Work::CreateGroup {
            name: String::new(),
            pos: Vec2::new(50.0, 50.0),
        });
        queue.push(Work::CreateGroup {
            name: String::new(),
            pos: Vec2::new(0.0, 0.0),
        });
        queue.apply_all(&mut rig.store, &mut rig.provider, &mut rig.session);
        let ids: Vec<NodeId> = rig.store.nodes().map(|n| n.id).collect();
        let (inner, outer) = (ids[0], ids[1]);
        // stretch the later group around the earlier one
        rig.store.node_graphic_mut(outer).expect("graphic").lr = Vec2::new(600.0, 400.0);

        // inside both: the smaller body wins regardless of creation order
        let hover = hover_at(&rig.store, Vec2::new(100.0, 100.0));
        assert_eq!(hover.group, Some(inner));
        // inside the outer one only
        assert_eq!(group_under(&rig.store, Vec2::new(10.0, 300.0)), Some(outer));
        assert_eq!(group_under(&rig.store, Vec2::new(700.0, 700.0)), None);
    }

    #[test]
    fn wire_validity_pairs() {
        let (rig, ids) = rig(&[
            ("Oscillator", Vec2::new(0.0, 0.0)),
            ("Gain", Vec2::new(500.0, 0.0)),
        ]);
        let store = &rig.store;
        let (osc, gain) = (ids[0], ids[1]);
        let osc_out = store.output_with_index(osc, 0).expect("out");
        let osc_freq = store.param_named(osc, "frequency").expect("freq");
        let osc_type = store.setting_named(osc, "type").expect("type");
        let gain_in = store.input_with_index(gain, 0).expect("in");
        let gain_out = store.output_with_index(gain, 0).expect("out");
        let gain_gain = store.param_named(gain, "gain").expect("gain");

        // order-insensitive: both directions normalize to out -> in
        assert_eq!(normalize_wire(store, osc_out, gain_in), Some((osc_out, gain_in)));
        assert_eq!(normalize_wire(store, gain_in, osc_out), Some((osc_out, gain_in)));
        assert_eq!(
            normalize_wire(store, osc_out, gain_gain),
            Some((osc_out, gain_gain))
        );
        // invalid pairings
        assert_eq!(normalize_wire(store, osc_out, osc_freq), None); // same node
        assert_eq!(normalize_wire(store, osc_out, gain_out), None); // out to out
        assert_eq!(normalize_wire(store, osc_type, gain_in), None); // setting
        assert_eq!(normalize_wire(store, osc_freq, gain_gain), None); // in to in
    }
}
