//! Editor color palette.

use fideo_graph::Rgba;

/// Colors used by the draw pass. A front end can restyle the editor by
/// passing its own instance.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    /// Canvas background.
    pub background: Rgba,
    /// Grid lines.
    pub grid_line: Rgba,
    /// Node body fill.
    pub node_fill: Rgba,
    /// Node outline.
    pub node_outline: Rgba,
    /// Node outline while hovered.
    pub node_outline_hovered: Rgba,
    /// Bus pin icons.
    pub pin_bus: Rgba,
    /// Param and setting pin icons.
    pub pin_value: Rgba,
    /// Wires at rest.
    pub wire: Rgba,
    /// Hovered wires and the valid pending wire.
    pub wire_hovered: Rgba,
    /// A pending wire whose endpoints do not form a valid connection.
    pub wire_cancel: Rgba,
    /// Names and labels.
    pub text: Rgba,
    /// Hovered labels and header text.
    pub text_highlight: Rgba,
    /// Profiler strip bars.
    pub profile: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(50, 50, 50),
            grid_line: Rgba::rgba(189, 195, 199, 128),
            node_fill: Rgba::rgba(10, 20, 30, 128),
            node_outline: Rgba::rgb(192, 57, 43),
            node_outline_hovered: Rgba::rgb(231, 102, 72),
            pin_bus: Rgba::rgb(241, 196, 15),
            pin_value: Rgba::rgb(192, 57, 43),
            wire: Rgba::rgb(189, 195, 199),
            wire_hovered: Rgba::rgb(241, 196, 15),
            wire_cancel: Rgba::rgb(189, 50, 15),
            text: Rgba::rgb(255, 255, 255),
            text_highlight: Rgba::rgb(231, 92, 60),
            profile: Rgba::rgba(241, 196, 15, 160),
        }
    }
}
