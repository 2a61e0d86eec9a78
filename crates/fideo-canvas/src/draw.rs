//! The draw pass.
//!
//! Paints back to front: background grid, group containers, wires, node
//! bodies with their headers, pins with labels and values, then overlays
//! (profiler strip, custom node renders). Everything goes through the
//! abstract [`DrawSurface`]; this module never touches a real painter.

use fideo_graph::{
    AudioProvider, DrawSurface, GraphStore, HEADER_HEIGHT, Icon, PIN_WIDTH, PinId, PinKind,
    RESIZE_CORNER, Vec2,
};

use crate::hover::{HoverState, connection_bezier, pin_anchor};
use crate::theme::Theme;
use crate::transform::Canvas;
use crate::wire::wire_bezier;

/// Grid pitch in canvas units.
const GRID_STEP: f32 = 100.0;
/// Label font size in canvas units.
const LABEL_SIZE: f32 = 12.0;
/// Node name font size in canvas units.
const NAME_SIZE: f32 = 14.0;

/// Overlay toggles.
#[derive(Clone, Copy, Debug, Default)]
pub struct DrawOptions {
    /// Paint per-node timing strips from the provider's profiling queries.
    pub profile: bool,
    /// Paint raw entity numbers next to names.
    pub show_ids: bool,
}

/// Paints one frame of the editor into `surface`. `viewport` is the
/// window-space rectangle the canvas occupies; `pending_wire` is the origin
/// pin and pointer position of an in-flight wire drag.
#[allow(clippy::too_many_arguments)]
pub fn draw_graph(
    store: &GraphStore,
    provider: &dyn AudioProvider,
    canvas: &Canvas,
    hover: &HoverState,
    pending_wire: Option<(PinId, Vec2)>,
    theme: &Theme,
    options: &DrawOptions,
    viewport: (Vec2, Vec2),
    surface: &mut dyn DrawSurface,
) {
    draw_grid(canvas, theme, viewport, surface);
    draw_groups(store, canvas, hover, theme, surface);
    draw_wires(store, canvas, hover, theme, surface);
    if let Some((origin, pointer)) = pending_wire {
        draw_pending_wire(store, canvas, hover, theme, origin, pointer, surface);
    }
    draw_nodes(store, provider, canvas, hover, theme, options, surface);
}

fn draw_grid(
    canvas: &Canvas,
    theme: &Theme,
    (ul, lr): (Vec2, Vec2),
    surface: &mut dyn DrawSurface,
) {
    surface.rect_filled(ul, lr, 0.0, theme.background);
    let step = GRID_STEP * canvas.scale;
    if step < 4.0 {
        return;
    }
    let origin = canvas.to_window(Vec2::default());
    let mut x = origin.x + ((ul.x - origin.x) / step).floor() * step;
    while x <= lr.x {
        surface.line(Vec2::new(x, ul.y), Vec2::new(x, lr.y), 1.0, theme.grid_line);
        x += step;
    }
    let mut y = origin.y + ((ul.y - origin.y) / step).floor() * step;
    while y <= lr.y {
        surface.line(Vec2::new(ul.x, y), Vec2::new(lr.x, y), 1.0, theme.grid_line);
        y += step;
    }
}

fn draw_groups(
    store: &GraphStore,
    canvas: &Canvas,
    hover: &HoverState,
    theme: &Theme,
    surface: &mut dyn DrawSurface,
) {
    for node in store.nodes() {
        let Some(graphic) = store.node_graphic(node.id) else {
            continue;
        };
        if !graphic.group {
            continue;
        }
        let ul = canvas.to_window(graphic.ul);
        let lr = canvas.to_window(graphic.lr);
        let outline = if hover.node == Some(node.id) {
            theme.node_outline_hovered
        } else {
            theme.node_outline
        };
        surface.rect_filled(ul, lr, 4.0, theme.node_fill.with_alpha(48));
        surface.rect_stroke(ul, lr, 4.0, 1.5, outline);
        surface.text(
            ul + Vec2::new(4.0, -NAME_SIZE * canvas.scale),
            NAME_SIZE * canvas.scale,
            theme.text,
            &node.name,
        );
        // resize handle in the lower-right corner
        let corner = lr - Vec2::new(RESIZE_CORNER, RESIZE_CORNER) * canvas.scale;
        surface.line(Vec2::new(corner.x, lr.y), Vec2::new(lr.x, corner.y), 1.0, outline);
    }
}

fn draw_wires(
    store: &GraphStore,
    canvas: &Canvas,
    hover: &HoverState,
    theme: &Theme,
    surface: &mut dyn DrawSurface,
) {
    for connection in store.resolved_connections() {
        let Some(points) = connection_bezier(store, canvas, connection) else {
            continue;
        };
        let color = if hover.connection == Some(connection.id) {
            theme.wire_hovered
        } else {
            theme.wire
        };
        surface.bezier(points, 2.0 * canvas.scale, color);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_pending_wire(
    store: &GraphStore,
    canvas: &Canvas,
    hover: &HoverState,
    theme: &Theme,
    origin: PinId,
    pointer: Vec2,
    surface: &mut dyn DrawSurface,
) {
    let Some(anchor) = pin_anchor(store, origin) else {
        return;
    };
    let color = if hover.wire_valid {
        theme.wire_hovered
    } else {
        theme.wire_cancel
    };
    let points = wire_bezier(canvas.to_window(anchor), pointer, canvas.scale);
    surface.bezier(points, 2.0 * canvas.scale, color);
}

fn draw_nodes(
    store: &GraphStore,
    provider: &dyn AudioProvider,
    canvas: &Canvas,
    hover: &HoverState,
    theme: &Theme,
    options: &DrawOptions,
    surface: &mut dyn DrawSurface,
) {
    for node in store.nodes() {
        let Some(graphic) = store.node_graphic(node.id) else {
            continue;
        };
        if graphic.group {
            continue;
        }
        let ul = canvas.to_window(graphic.ul);
        let lr = canvas.to_window(graphic.lr);
        let hovered = hover.node == Some(node.id);
        let outline = if hovered {
            theme.node_outline_hovered
        } else {
            theme.node_outline
        };
        surface.rect_filled(ul, lr, 4.0, theme.node_fill);
        surface.rect_stroke(ul, lr, 4.0, 1.5, outline);

        draw_header(node, canvas, hover, theme, options, ul, surface);

        if let Some(render) = &node.render {
            (render.0)(node.id, ul, lr, canvas.scale, surface);
        }
        if options.profile {
            draw_profile_strip(provider, node.id, canvas, theme, ul, lr, surface);
        }
        for pin in store.pins_of(node.id) {
            draw_pin(store, canvas, hover, theme, pin.id, surface);
        }
    }
}

fn draw_header(
    node: &fideo_graph::Node,
    canvas: &Canvas,
    hover: &HoverState,
    theme: &Theme,
    options: &DrawOptions,
    ul: Vec2,
    surface: &mut dyn DrawSurface,
) {
    let slot = HEADER_HEIGHT * canvas.scale;
    let mut x = ul.x;
    let hovered_here = |active: bool| if active { theme.wire_hovered } else { theme.text };
    if node.play_controller {
        let icon_ul = Vec2::new(x, ul.y - slot);
        surface.icon(
            Icon::Play,
            icon_ul,
            icon_ul + Vec2::new(slot, slot),
            hovered_here(hover.play && hover.node == Some(node.id)),
            theme.node_fill,
        );
        x += slot;
    }
    if node.bang_controller {
        let icon_ul = Vec2::new(x, ul.y - slot);
        surface.icon(
            Icon::Bang,
            icon_ul,
            icon_ul + Vec2::new(slot, slot),
            hovered_here(hover.bang && hover.node == Some(node.id)),
            theme.node_fill,
        );
        x += slot;
    }
    let name_color = if hover.header_menu && hover.node == Some(node.id) {
        theme.text_highlight
    } else {
        theme.text
    };
    let label = if options.show_ids {
        format!("{} [{}]", node.name, node.id.index())
    } else {
        node.name.clone()
    };
    surface.text(
        Vec2::new(x + 4.0, ul.y - slot),
        NAME_SIZE * canvas.scale,
        name_color,
        &label,
    );
}

fn draw_profile_strip(
    provider: &dyn AudioProvider,
    node: fideo_graph::NodeId,
    canvas: &Canvas,
    theme: &Theme,
    ul: Vec2,
    lr: Vec2,
    surface: &mut dyn DrawSurface,
) {
    // one millisecond of self time spans the node's width
    let frac = (provider.node_get_self_timing(node) * 1000.0).clamp(0.0, 1.0);
    let y = lr.y - 3.0 * canvas.scale;
    surface.line(
        Vec2::new(ul.x, y),
        Vec2::new(ul.x + (lr.x - ul.x) * frac, y),
        2.0 * canvas.scale,
        theme.profile,
    );
}

fn draw_pin(
    store: &GraphStore,
    canvas: &Canvas,
    hover: &HoverState,
    theme: &Theme,
    pin: PinId,
    surface: &mut dyn DrawSurface,
) {
    let (Some(record), Some(graphic)) = (store.pin(pin), store.pin_graphic(pin)) else {
        return;
    };
    let icon_ul = canvas.to_window(graphic.ul());
    let icon_lr = canvas.to_window(graphic.ul() + Vec2::new(PIN_WIDTH, PIN_WIDTH));
    let (icon, color) = match record.kind {
        PinKind::BusIn | PinKind::BusOut => (Icon::Flow, theme.pin_bus),
        PinKind::Param => (Icon::Flow, theme.pin_value),
        PinKind::Setting => (Icon::Grid, theme.pin_value),
    };
    let fill = if hover.pin == Some(pin) {
        color.with_alpha(96)
    } else {
        theme.node_fill
    };
    surface.icon(icon, icon_ul, icon_lr, color, fill);

    // outputs carry no label; inputs show their name, params and settings
    // show name and value
    if record.kind == PinKind::BusOut {
        return;
    }
    let label = if record.kind == PinKind::BusIn {
        record.name.clone()
    } else {
        let shown = if record.short_name.is_empty() {
            &record.name
        } else {
            &record.short_name
        };
        format!("{shown}: {}", record.value_as_string)
    };
    let color = if hover.pin_label == Some(pin) {
        theme.text_highlight
    } else {
        theme.text
    };
    surface.text(
        icon_lr + Vec2::new(2.0, -PIN_WIDTH * canvas.scale),
        LABEL_SIZE * canvas.scale,
        color,
        &label,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::lay_out_pins;
    use fideo_graph::{OfflineProvider, Rgba, Session, WireSpec, Work, WorkQueue};

    /// Counts primitives instead of painting them.
    #[derive(Default)]
    struct CountingSurface {
        rects: usize,
        beziers: usize,
        icons: usize,
        texts: usize,
    }

    impl DrawSurface for CountingSurface {
        fn rect_filled(&mut self, _: Vec2, _: Vec2, _: f32, _: Rgba) {
            self.rects += 1;
        }
        fn rect_stroke(&mut self, _: Vec2, _: Vec2, _: f32, _: f32, _: Rgba) {
            self.rects += 1;
        }
        fn line(&mut self, _: Vec2, _: Vec2, _: f32, _: Rgba) {}
        fn bezier(&mut self, _: [Vec2; 4], _: f32, _: Rgba) {
            self.beziers += 1;
        }
        fn icon(&mut self, _: Icon, _: Vec2, _: Vec2, _: Rgba, _: Rgba) {
            self.icons += 1;
        }
        fn text(&mut self, _: Vec2, _: f32, _: Rgba, _: &str) {
            self.texts += 1;
        }
    }

    #[test]
    fn every_node_pin_and_wire_is_painted() {
        let mut store = GraphStore::new();
        let mut provider = OfflineProvider::new();
        let mut session = Session::default();
        let mut queue = WorkQueue::new();
        for (kind, x) in [("Oscillator", 0.0), ("Gain", 600.0)] {
            queue.push(Work::CreateNode {
                kind: kind.to_string(),
                name: String::new(),
                pos: Vec2::new(x, 0.0),
                group: None,
            });
        }
        queue.apply_all(&mut store, &mut provider, &mut session);
        let ids: Vec<_> = store.nodes().map(|n| n.id).collect();
        queue.push(Work::ConnectBusOutToBusIn {
            wire: WireSpec::Resolved {
                from_node: ids[0],
                from_pin: store.output_with_index(ids[0], 0).expect("out"),
                to_node: ids[1],
                to_pin: store.input_with_index(ids[1], 0).expect("in"),
            },
        });
        queue.apply_all(&mut store, &mut provider, &mut session);
        lay_out_pins(&mut store);

        let mut surface = CountingSurface::default();
        draw_graph(
            &store,
            &provider,
            &Canvas::default(),
            &HoverState::default(),
            None,
            &Theme::default(),
            &DrawOptions::default(),
            (Vec2::default(), Vec2::new(1280.0, 800.0)),
            &mut surface,
        );

        // every pin icon, plus the oscillator's play control
        let pin_count = store.pins().count();
        assert_eq!(surface.icons, pin_count + 1);
        assert_eq!(surface.beziers, 1);
        // background plus fill and stroke per node
        assert!(surface.rects >= 1 + ids.len() * 2);
        assert!(surface.texts >= ids.len());
    }
}
