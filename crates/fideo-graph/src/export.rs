//! Generated-source export.
//!
//! A one-way projection of the graph into Rust construction statements,
//! intended as a starting point for hand-written patch code. The output is
//! not a document and cannot be loaded back.

use std::fmt::Write;

use crate::node::{ConnectionKind, PinDataType, PinKind};
use crate::store::GraphStore;

/// Turns a display name into a usable Rust identifier.
fn identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push('_');
        }
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Renders the graph as Rust statements against a hypothetical engine
/// context: node constructors, param and setting writes, then connections.
pub fn export_source(store: &GraphStore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// generated by fideo; edit freely, not reloadable");
    let _ = writeln!(out, "let ctx = AudioContext::new()?;");

    for node in store.nodes() {
        let var = identifier(&node.name);
        match node.kind.as_str() {
            "Group" => continue,
            "Device" => {
                let _ = writeln!(out, "let {var} = ctx.destination();");
            }
            kind => {
                let _ = writeln!(out, "let {var} = ctx.create_node(\"{kind}\")?;");
            }
        }
        for pin in store.pins_of(node.id) {
            let value = &pin.value_as_string;
            match pin.kind {
                PinKind::Param => {
                    let _ = writeln!(out, "{var}.param(\"{}\").set({value});", pin.name);
                }
                PinKind::Setting => {
                    let literal = match pin.data_type {
                        PinDataType::Float | PinDataType::Integer => value.clone(),
                        PinDataType::Bool => value.to_ascii_lowercase(),
                        _ => format!("\"{value}\""),
                    };
                    let _ = writeln!(out, "{var}.setting(\"{}\").set({literal});", pin.name);
                }
                PinKind::BusIn | PinKind::BusOut => {}
            }
        }
    }

    for connection in store.resolved_connections() {
        let (Some(from), Some(to), Some(to_pin)) = (
            store.node(connection.from_node),
            store.node(connection.to_node),
            store.pin(connection.to_pin),
        ) else {
            continue;
        };
        let from = identifier(&from.name);
        let to = identifier(&to.name);
        match connection.kind {
            ConnectionKind::ToBus => {
                let _ = writeln!(out, "ctx.connect(&{from}, &{to})?;");
            }
            ConnectionKind::ToParam => {
                let _ = writeln!(
                    out,
                    "ctx.connect_to_param(&{from}, &{to}.param(\"{}\"))?;",
                    to_pin.name
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_lowercased_and_sanitized() {
        assert_eq!(identifier("Oscillator-1"), "oscillator_1");
        assert_eq!(identifier("2nd"), "_2nd");
    }
}
