//! The per-frame layout overlay.
//!
//! Pin columns, pin rows, and node bounding boxes are derived entirely from
//! the store's pin ownership and kinds, every frame. Only a node's
//! upper-left corner (and a group's user-resized box) carries over between
//! frames. Column assignment: inputs and params share column 0, settings get
//! column 1 when any exist, and outputs sit at the right edge, one column
//! past the body.

use fideo_graph::{
    COLUMN_WIDTH, GraphStore, NodeId, PADDING_Y, PIN_HEIGHT, PinKind, Vec2,
};

/// Recomputes every non-group node's pin placement and bounding box.
pub fn lay_out_pins(store: &mut GraphStore) {
    let nodes: Vec<NodeId> = store.nodes().map(|n| n.id).collect();
    for node in nodes {
        if store.node_graphic(node).is_none_or(|g| g.group) {
            continue;
        }
        lay_out_node(store, node);
    }
}

fn lay_out_node(store: &mut GraphStore, node: NodeId) {
    let mut input_rows = 0u32;
    let mut setting_rows = 0u32;
    let mut output_rows = 0u32;
    for pin in store.pins_of(node) {
        match pin.kind {
            PinKind::BusIn | PinKind::Param => input_rows += 1,
            PinKind::Setting => setting_rows += 1,
            PinKind::BusOut => output_rows += 1,
        }
    }
    let column_count = if setting_rows > 0 { 2 } else { 1 };

    let Some(origin) = store.node_graphic(node).map(|g| g.ul) else {
        return;
    };

    let placements: Vec<(fideo_graph::PinId, u32, f32)> = {
        let mut input_y = PADDING_Y;
        let mut setting_y = PADDING_Y;
        let mut output_y = PADDING_Y;
        store
            .pins_of(node)
            .map(|pin| {
                let (column, y) = match pin.kind {
                    PinKind::BusIn | PinKind::Param => {
                        let y = input_y;
                        input_y += PIN_HEIGHT;
                        (0, y)
                    }
                    PinKind::Setting => {
                        let y = setting_y;
                        setting_y += PIN_HEIGHT;
                        (1, y)
                    }
                    PinKind::BusOut => {
                        let y = output_y;
                        output_y += PIN_HEIGHT;
                        (column_count, y)
                    }
                };
                (pin.id, column, y)
            })
            .collect()
    };
    for (pin, column, pos_y) in placements {
        if let Some(graphic) = store.pin_graphic_mut(pin) {
            graphic.column = column;
            graphic.pos_y = pos_y;
            graphic.node_origin = origin;
        }
    }

    let tallest = input_rows.max(setting_rows).max(output_rows);
    if let Some(graphic) = store.node_graphic_mut(node) {
        graphic.column_count = column_count;
        graphic.lr = origin
            + Vec2::new(
                COLUMN_WIDTH * column_count as f32,
                PIN_HEIGHT * (1.5 + tallest as f32),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fideo_graph::{
        AudioProvider, NodeGraphic, OfflineProvider, Session, Work, WorkQueue,
    };

    fn build(kind: &str, pos: Vec2) -> (GraphStore, NodeId) {
        let mut store = GraphStore::new();
        let mut provider = OfflineProvider::new();
        let mut session = Session::default();
        let mut queue = WorkQueue::new();
        queue.push(Work::CreateNode {
            kind: kind.to_string(),
            name: String::new(),
            pos,
            group: None,
        });
        queue.apply_all(&mut store, &mut provider, &mut session);
        let id = store.nodes().next().expect("node").id;
        (store, id)
    }

    #[test]
    fn gain_is_one_column_wide() {
        let (mut store, gain) = build("Gain", Vec2::new(50.0, 60.0));
        lay_out_pins(&mut store);

        let graphic = store.node_graphic(gain).expect("graphic");
        assert_eq!(graphic.column_count, 1);
        // in + gain param share column zero: two rows, one output row
        assert_eq!(graphic.size(), Vec2::new(COLUMN_WIDTH, PIN_HEIGHT * 3.5));

        let out = store.output_with_index(gain, 0).expect("out");
        assert_eq!(store.pin_graphic(out).expect("pg").column, 1);
        let input = store.input_with_index(gain, 0).expect("in");
        let input = store.pin_graphic(input).expect("pg");
        assert_eq!(input.column, 0);
        assert!((input.pos_y - PADDING_Y).abs() < f32::EPSILON);
        assert_eq!(input.node_origin, Vec2::new(50.0, 60.0));
    }

    #[test]
    fn settings_open_a_second_column() {
        let (mut store, osc) = build("Oscillator", Vec2::default());
        lay_out_pins(&mut store);

        let graphic = store.node_graphic(osc).expect("graphic");
        assert_eq!(graphic.column_count, 2);
        assert!((graphic.size().x - COLUMN_WIDTH * 2.0).abs() < f32::EPSILON);
        // three params drive the height
        assert!((graphic.size().y - PIN_HEIGHT * 4.5).abs() < f32::EPSILON);

        let setting = store.setting_named(osc, "type").expect("setting");
        assert_eq!(store.pin_graphic(setting).expect("pg").column, 1);
        let out = store.output_with_index(osc, 0).expect("out");
        assert_eq!(store.pin_graphic(out).expect("pg").column, 2);
    }

    #[test]
    fn rows_within_a_bucket_stack_by_pin_height() {
        let (mut store, filter) = build("BiquadFilter", Vec2::default());
        lay_out_pins(&mut store);

        let rows: Vec<f32> = store
            .pins_of(filter)
            .filter(|p| matches!(p.kind, PinKind::BusIn | PinKind::Param))
            .filter_map(|p| store.pin_graphic(p.id))
            .map(|g| g.pos_y)
            .collect();
        for (i, y) in rows.iter().enumerate() {
            assert!((y - (PADDING_Y + i as f32 * PIN_HEIGHT)).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn groups_are_skipped() {
        let mut store = GraphStore::new();
        let mut provider = OfflineProvider::new();
        let id = NodeId(provider.create_entity());
        let graphic = NodeGraphic::group_at(Vec2::new(5.0, 5.0));
        let expected = graphic.lr;
        store.insert_node(fideo_graph::Node::new(id, "Group", "Group-1"), graphic);

        lay_out_pins(&mut store);
        assert_eq!(store.node_graphic(id).expect("graphic").lr, expected);
    }
}
