// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree dumps.
//!
//! [`snapshot`] captures the drawing as JSON, including effective state that
//! is not part of a persisted record. [`outline`] renders the same tree as
//! indented text, one layer per line.

use std::fmt::Write as _;

use lamina_core::layer::{LayerId, LayerTree};
use serde_json::{Value, json};

fn handle(id: LayerId) -> String {
    format!("{}@{}", id.index(), id.generation())
}

/// Captures one layer and its subtree.
///
/// # Panics
///
/// Panics if the handle is stale.
#[must_use]
pub fn snapshot_layer(tree: &LayerTree, id: LayerId) -> Value {
    let state = tree.state(id);
    let children: Vec<Value> = tree.children(id).map(|c| snapshot_layer(tree, c)).collect();
    json!({
        "id": handle(id),
        "kind": tree.kind(id),
        "group": tree.is_group(id),
        "name": state.name(),
        "identityKey": state.identity_key(),
        "visible": state.is_visible(),
        "locked": state.is_locked(),
        "effectivelyVisible": tree.is_effectively_visible(id),
        "effectivelyLocked": tree.is_effectively_locked(id),
        "printable": state.is_printable(),
        "alpha": state.alpha(),
        "active": tree.is_active(id),
        "children": children,
    })
}

/// Captures the drawing: its size, the root group's subtree, and counts.
#[must_use]
pub fn snapshot(tree: &LayerTree) -> Value {
    let size = tree.drawing_size();
    json!({
        "drawingSize": [size.width, size.height],
        "liveLayers": tree.live_count(),
        "activeLayer": tree.active_layer().map(handle),
        "root": tree.root_group().map(|root| snapshot_layer(tree, root)),
    })
}

/// Renders the root group's subtree as indented text.
///
/// Each line shows the handle, kind, quoted name, and flags: `H` for own
/// hidden, `L` for own locked, `*` for the active layer.
#[must_use]
pub fn outline(tree: &LayerTree) -> String {
    let mut out = String::new();
    match tree.root_group() {
        Some(root) => outline_into(tree, root, 0, &mut out),
        None => out.push_str("(no root)\n"),
    }
    out
}

fn outline_into(tree: &LayerTree, id: LayerId, depth: usize, out: &mut String) {
    let state = tree.state(id);
    let mut flags = String::new();
    if !state.is_visible() {
        flags.push('H');
    }
    if state.is_locked() {
        flags.push('L');
    }
    if tree.is_active(id) {
        flags.push('*');
    }
    let _ = writeln!(
        out,
        "{:indent$}{} {} {:?}{}{flags}",
        "",
        handle(id),
        tree.kind(id),
        state.name(),
        if flags.is_empty() { "" } else { " " },
        indent = depth * 2,
    );
    for child in tree.children(id) {
        outline_into(tree, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use lamina_core::kurbo::Size;

    use super::*;

    fn sample() -> (LayerTree, LayerId, LayerId) {
        let mut tree = LayerTree::default();
        tree.set_drawing_size(Size::new(50.0, 40.0));
        let root = tree.create_plain_group();
        tree.set_root_group(root).unwrap();
        tree.set_name(root, "Drawing");
        let sketch = tree.create_plain_layer();
        tree.add_child(root, sketch).unwrap();
        tree.set_name(sketch, "Sketch");
        (tree, root, sketch)
    }

    #[test]
    fn snapshot_reports_effective_state() {
        let (mut tree, root, sketch) = sample();
        tree.hide(root);

        let snap = snapshot(&tree);
        assert_eq!(snap["drawingSize"], json!([50.0, 40.0]));
        assert_eq!(snap["liveLayers"], json!(2));
        let child = &snap["root"]["children"][0];
        assert_eq!(child["name"], json!("Sketch"));
        assert_eq!(child["visible"], json!(true));
        assert_eq!(child["effectivelyVisible"], json!(false));
        assert_eq!(child["id"], json!(handle(sketch)));
    }

    #[test]
    fn outline_indents_children() {
        let (mut tree, _, sketch) = sample();
        tree.lock(sketch);
        let text = outline(&tree);
        assert_eq!(text, "0@0 group \"Drawing\"\n  1@0 layer \"Sketch\" L\n");
    }

    #[test]
    fn empty_tree() {
        let tree = LayerTree::default();
        assert_eq!(outline(&tree), "(no root)\n");
        assert_eq!(snapshot(&tree)["root"], Value::Null);
    }
}
