// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Versioned layer records.
//!
//! A [`LayerRecord`] is the persisted form of a layer and, for groups, its
//! whole subtree. Records are plain serde data; JSON is the interchange
//! format. Every field has a documented default so that older or sparse
//! records decode:
//!
//! | Field                 | Default   |
//! |-----------------------|-----------|
//! | `version`             | `1`       |
//! | `kind`                | `"layer"` |
//! | `group`               | `false`   |
//! | `name`                | `""`      |
//! | `visible`             | `true`    |
//! | `locked`              | `false`   |
//! | `printable`           | `true`    |
//! | `clipToInterior`      | `false`   |
//! | `alpha`               | `1.0`     |
//! | `rulerMarkersEnabled` | `true`    |
//! | `knobsAdjustToScale`  | `true`    |
//! | `selectionColor`      | next palette color |
//! | `identityKey`         | freshly minted |
//! | `userInfo`            | `{}`      |
//! | `payload`             | `null`    |
//! | `children`            | `[]`      |
//!
//! Concrete layer kinds are rebuilt through a [`LayerFactory`]. Decoding is
//! all-or-nothing: every record is validated and every behavior created
//! before the first layer is allocated, so a failure leaves the tree as it
//! was.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Color;
use crate::error::DecodeError;
use crate::layer::{GroupLayer, Layer, LayerId, LayerState, LayerTree, PlainLayer};
use crate::trace::IdentityRegeneratedEvent;

/// The newest record version this crate reads and the one it writes.
pub const SCHEMA_VERSION: u32 = 1;

/// The persisted form of a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerRecord {
    /// Schema version.
    pub version: u32,
    /// Kind name, as reported by [`Layer::kind`].
    pub kind: String,
    /// Whether the layer is a group.
    pub group: bool,
    /// User-visible name.
    pub name: String,
    /// Own visible flag.
    pub visible: bool,
    /// Own locked flag.
    pub locked: bool,
    /// Whether the layer is included when printing.
    pub printable: bool,
    /// Whether drawing is clipped to the drawing's interior.
    pub clip_to_interior: bool,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f64,
    /// Whether ruler marker updates are forwarded.
    pub ruler_markers_enabled: bool,
    /// Whether knob sizes follow the view scale.
    pub knobs_adjust_to_scale: bool,
    /// Selection highlight color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_color: Option<Color>,
    /// Persistent identity key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_key: Option<String>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub user_info: BTreeMap<String, Value>,
    /// Kind-specific data, from [`Layer::encode_payload`].
    #[serde(skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    /// Child records, bottom to top. Groups only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerRecord>,
}

impl Default for LayerRecord {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            kind: String::from("layer"),
            group: false,
            name: String::new(),
            visible: true,
            locked: false,
            printable: true,
            clip_to_interior: false,
            alpha: 1.0,
            ruler_markers_enabled: true,
            knobs_adjust_to_scale: true,
            selection_color: None,
            identity_key: None,
            user_info: BTreeMap::new(),
            payload: Value::Null,
            children: Vec::new(),
        }
    }
}

impl LayerRecord {
    /// Checks this record and its descendants without building anything.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.version == 0 || self.version > SCHEMA_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                found: self.version,
                supported: SCHEMA_VERSION,
            });
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(DecodeError::AlphaOutOfRange(self.alpha));
        }
        if self.selection_color.is_some_and(|c| !c.is_valid()) {
            return Err(DecodeError::InvalidColor);
        }
        if !self.group && !self.children.is_empty() {
            return Err(DecodeError::ChildrenOnLeaf(self.kind.clone()));
        }
        self.children.iter().try_for_each(Self::validate)
    }
}

/// Rebuilds layer behaviors from persisted kind names.
pub trait LayerFactory {
    /// Creates the behavior for a record of `kind`.
    ///
    /// `payload` is whatever the kind's [`Layer::encode_payload`] produced,
    /// or `null`.
    fn create(&self, kind: &str, group: bool, payload: &Value)
    -> Result<Box<dyn Layer>, DecodeError>;
}

/// A factory for the built-in [`PlainLayer`] and [`GroupLayer`] kinds.
///
/// Wrap it to add kinds of your own.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicFactory;

impl LayerFactory for BasicFactory {
    fn create(
        &self,
        kind: &str,
        group: bool,
        _payload: &Value,
    ) -> Result<Box<dyn Layer>, DecodeError> {
        match (kind, group) {
            ("layer", false) => Ok(Box::new(PlainLayer)),
            ("group", true) => Ok(Box::new(GroupLayer)),
            ("group", false) => Err(DecodeError::Factory {
                kind: kind.to_string(),
                message: String::from("group kind on a leaf record"),
            }),
            _ => Err(DecodeError::UnknownKind(kind.to_string())),
        }
    }
}

/// A validated record paired with its freshly created behavior.
struct Staged<'r> {
    record: &'r LayerRecord,
    behavior: Box<dyn Layer>,
    children: Vec<Staged<'r>>,
}

fn stage<'r>(
    record: &'r LayerRecord,
    factory: &dyn LayerFactory,
) -> Result<Staged<'r>, DecodeError> {
    let behavior = factory.create(&record.kind, record.group, &record.payload)?;
    let children = record
        .children
        .iter()
        .map(|c| stage(c, factory))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Staged {
        record,
        behavior,
        children,
    })
}

impl LayerTree {
    // -- Encoding --

    /// Encodes a layer and its subtree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn encode_layer(&self, id: LayerId) -> LayerRecord {
        self.validate(id);
        self.encode_at(id.idx)
    }

    /// Encodes a layer and its subtree as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn encode_json(&self, id: LayerId) -> serde_json::Result<String> {
        serde_json::to_string(&self.encode_layer(id))
    }

    fn encode_at(&self, idx: u32) -> LayerRecord {
        let i = idx as usize;
        let state = &self.state[i];
        let behavior = &self.behavior[i];
        LayerRecord {
            version: SCHEMA_VERSION,
            kind: behavior.kind().to_string(),
            group: self.is_group[i],
            name: state.name.clone(),
            visible: state.visible,
            locked: state.locked,
            printable: state.printable,
            clip_to_interior: state.clip_to_interior,
            alpha: state.alpha,
            ruler_markers_enabled: state.ruler_markers_enabled,
            knobs_adjust_to_scale: state.knobs_adjust_to_scale,
            selection_color: state.selection_color,
            identity_key: Some(state.identity_key.clone()),
            user_info: state.user_info.clone(),
            payload: behavior.encode_payload(),
            children: self.children[i]
                .iter()
                .map(|&c| self.encode_at(c))
                .collect(),
        }
    }

    // -- Decoding --

    /// Decodes a record into a new detached layer (with its subtree) and
    /// returns its handle.
    ///
    /// A persisted identity key is kept unless a live layer in the same
    /// context already holds it; in that case a new key is minted.
    pub fn decode_layer(
        &mut self,
        record: &LayerRecord,
        factory: &dyn LayerFactory,
    ) -> Result<LayerId, DecodeError> {
        record.validate()?;
        let staged = stage(record, factory)?;
        Ok(self.commit_staged(staged))
    }

    /// Parses JSON and decodes it as with [`decode_layer`](Self::decode_layer).
    pub fn decode_json(
        &mut self,
        json: &str,
        factory: &dyn LayerFactory,
    ) -> Result<LayerId, DecodeError> {
        let record: LayerRecord =
            serde_json::from_str(json).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        self.decode_layer(&record, factory)
    }

    fn commit_staged(&mut self, staged: Staged<'_>) -> LayerId {
        let Staged {
            record,
            behavior,
            children,
        } = staged;

        let (key, regenerated) = match &record.identity_key {
            Some(key) if self.context.claim_key(key) => (key.clone(), false),
            Some(_) => (self.context.mint_key(), true),
            None => (self.context.mint_key(), false),
        };
        let selection_color = record
            .selection_color
            .unwrap_or_else(|| self.context.next_selection_color());

        let state = LayerState {
            identity_key: key,
            name: record.name.clone(),
            visible: record.visible,
            locked: record.locked,
            printable: record.printable,
            clip_to_interior: record.clip_to_interior,
            ruler_markers_enabled: record.ruler_markers_enabled,
            knobs_adjust_to_scale: record.knobs_adjust_to_scale,
            alpha: record.alpha,
            selection_color: Some(selection_color),
            knobs: None,
            user_info: record.user_info.clone(),
        };
        let id = self.alloc(behavior, record.group, state);

        if regenerated {
            let event = IdentityRegeneratedEvent {
                layer: id,
                persisted: record.identity_key.as_deref().unwrap_or_default(),
                assigned: &self.state[id.idx as usize].identity_key,
            };
            Self::tracer(&mut self.trace).identity_regenerated(&event);
        }

        for (index, child) in children.into_iter().enumerate() {
            let c = self.commit_staged(child);
            self.link(id.idx, c.idx, index);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::context::LayerContext;

    fn isolated() -> LayerTree {
        LayerTree::new(Rc::new(LayerContext::new()))
    }

    #[test]
    fn empty_object_decodes_with_defaults() {
        let mut tree = isolated();
        let id = tree.decode_json("{}", &BasicFactory).unwrap();
        let state = tree.state(id);
        assert_eq!(tree.kind(id), "layer");
        assert!(!tree.is_group(id));
        assert_eq!(state.name(), "");
        assert!(state.is_visible());
        assert!(!state.is_locked());
        assert!(state.is_printable());
        assert!(!state.clips_to_interior());
        assert_eq!(state.alpha(), 1.0);
        assert!(state.ruler_markers_enabled());
        assert!(state.knobs_adjust_to_scale());
        assert!(state.selection_color().is_some());
        assert!(!state.identity_key().is_empty());
        assert!(state.user_info().is_empty());
    }

    #[test]
    fn round_trip_keeps_common_state() {
        let mut tree = isolated();
        let group = tree.create_plain_group();
        let leaf = tree.create_plain_layer();
        tree.add_child(group, leaf).unwrap();
        tree.set_name(leaf, "Ink");
        tree.set_locked(leaf, true);
        tree.set_alpha(leaf, 0.5);
        tree.set_clip_to_interior(leaf, true);
        tree.set_user_info_value(leaf, "note", json!("keep"));

        let json = tree.encode_json(group).unwrap();
        let mut other = isolated();
        let copy = other.decode_json(&json, &BasicFactory).unwrap();

        assert!(other.is_group(copy));
        let copied_leaf = other.children(copy).next().unwrap();
        let state = other.state(copied_leaf);
        assert_eq!(state.name(), "Ink");
        assert!(state.is_locked());
        assert_eq!(state.alpha(), 0.5);
        assert!(state.clips_to_interior());
        assert_eq!(state.user_info()["note"], json!("keep"));
        assert_eq!(
            state.selection_color(),
            tree.state(leaf).selection_color()
        );
        assert_eq!(other.parent(copied_leaf), Some(copy));
    }

    #[test]
    fn record_field_names_are_camel_case() {
        let mut tree = isolated();
        let id = tree.create_plain_layer();
        tree.set_clip_to_interior(id, true);
        let value = serde_json::to_value(tree.encode_layer(id)).unwrap();
        assert_eq!(value["clipToInterior"], json!(true));
        assert_eq!(value["version"], json!(SCHEMA_VERSION));
        assert!(value.get("children").is_none());
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn failure_leaves_no_layer() {
        let mut tree = isolated();
        let before = tree.live_count();
        let json = r#"{
            "kind": "group", "group": true,
            "children": [ { "kind": "layer" }, { "kind": "mystery" } ]
        }"#;
        assert_eq!(
            tree.decode_json(json, &BasicFactory),
            Err(DecodeError::UnknownKind("mystery".into()))
        );
        assert_eq!(tree.live_count(), before);
        assert_eq!(tree.context().identity().live_count(), 0);
    }

    #[test]
    fn invalid_records_are_rejected() {
        let mut tree = isolated();
        assert!(matches!(
            tree.decode_json("{ not json", &BasicFactory),
            Err(DecodeError::Malformed(_))
        ));
        assert_eq!(
            tree.decode_json(r#"{ "version": 2 }"#, &BasicFactory),
            Err(DecodeError::UnsupportedVersion {
                found: 2,
                supported: SCHEMA_VERSION
            })
        );
        assert_eq!(
            tree.decode_json(r#"{ "alpha": 1.5 }"#, &BasicFactory),
            Err(DecodeError::AlphaOutOfRange(1.5))
        );
        assert_eq!(
            tree.decode_json(r#"{ "children": [ {} ] }"#, &BasicFactory),
            Err(DecodeError::ChildrenOnLeaf("layer".into()))
        );
        assert_eq!(
            tree.decode_json(
                r#"{ "selectionColor": { "r": 2.0, "g": 0.0, "b": 0.0, "a": 1.0 } }"#,
                &BasicFactory
            ),
            Err(DecodeError::InvalidColor)
        );
        assert_eq!(tree.live_count(), 0);
    }

    #[test]
    fn identity_key_kept_unless_live() {
        let mut tree = isolated();
        let original = tree.create_plain_layer();
        let key = tree.state(original).identity_key().to_string();
        let record = tree.encode_layer(original);

        let clash = tree.decode_layer(&record, &BasicFactory).unwrap();
        assert_ne!(tree.state(clash).identity_key(), key);

        tree.destroy_layer(original);
        let restored = tree.decode_layer(&record, &BasicFactory).unwrap();
        assert_eq!(tree.state(restored).identity_key(), key);
    }

    #[test]
    fn keys_from_another_context_are_regenerated() {
        let mut source = isolated();
        let original = source.create_plain_layer();
        let key = source.state(original).identity_key().to_string();
        let record = source.encode_layer(original);

        let mut target = isolated();
        let copy = target.decode_layer(&record, &BasicFactory).unwrap();
        assert_ne!(target.state(copy).identity_key(), key);
        assert!(source.is_alive(original));
    }

    #[test]
    fn duplicate_keys_within_one_record_are_regenerated() {
        let mut tree = isolated();
        let json = r#"{
            "kind": "group", "group": true,
            "children": [ { "identityKey": "k" }, { "identityKey": "k" } ]
        }"#;
        let group = tree.decode_json(json, &BasicFactory).unwrap();
        let keys: Vec<_> = tree
            .children(group)
            .map(|c| tree.state(c).identity_key().to_string())
            .collect();
        assert_eq!(keys[0], "k");
        assert_ne!(keys[1], "k");
    }

    struct Note(String);

    impl Layer for Note {
        fn kind(&self) -> &str {
            "note"
        }

        fn encode_payload(&self) -> Value {
            json!({ "text": self.0 })
        }
    }

    struct NoteFactory;

    impl LayerFactory for NoteFactory {
        fn create(
            &self,
            kind: &str,
            group: bool,
            payload: &Value,
        ) -> Result<Box<dyn Layer>, DecodeError> {
            if kind != "note" {
                return BasicFactory.create(kind, group, payload);
            }
            let text = payload["text"]
                .as_str()
                .ok_or_else(|| DecodeError::Factory {
                    kind: kind.to_string(),
                    message: "missing text".into(),
                })?;
            Ok(Box::new(Note(text.to_string())))
        }
    }

    #[test]
    fn custom_kinds_round_trip_their_payload() {
        let mut tree = isolated();
        let id = tree.create_layer(Box::new(Note("hello".into())));
        let json = tree.encode_json(id).unwrap();

        let mut other = isolated();
        let copy = other.decode_json(&json, &NoteFactory).unwrap();
        assert_eq!(other.layer::<Note>(copy).unwrap().0, "hello");

        assert!(matches!(
            other.decode_json(r#"{ "kind": "note" }"#, &NoteFactory),
            Err(DecodeError::Factory { .. })
        ));
    }
}
