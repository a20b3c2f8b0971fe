//! Path-addressed access to a YAML tree
//!
//! Keys are matched case-insensitively: the tree is stored with lower-case
//! keys and every lookup lower-cases its path.

use anyhow::{anyhow, Result};
use serde_yaml::{Mapping, Value};

/// Returns the node at `path`
pub(crate) fn lookup<'a>(tree: &'a Value, path: &[&str]) -> Result<&'a Value> {
    path.iter().enumerate().try_fold(tree, |node, (depth, key)| {
        let map = node
            .as_mapping()
            .ok_or_else(|| anyhow!("{} is not a section", path[..depth].join(".")))?;
        map.get(key.to_lowercase().as_str())
            .ok_or_else(|| anyhow!("{} is not set", path[..=depth].join(".")))
    })
}

/// Stores `value` at `path`, creating missing sections
pub(crate) fn insert(tree: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *tree = value;
        return Ok(());
    };

    let mut node = tree;
    for key in parents {
        node = node
            .as_mapping_mut()
            .ok_or_else(|| anyhow!("cannot set {}: {} is a value", path.join("."), key))?
            .entry(Value::String(key.to_lowercase()))
            .or_insert(Value::Mapping(Mapping::new()));
    }

    node.as_mapping_mut()
        .ok_or_else(|| anyhow!("cannot set {}: parent is a value", path.join(".")))?
        .insert(Value::String(last.to_lowercase()), value);
    Ok(())
}

/// Overlays `overlay` onto `base`
///
/// Sections merge key by key; any other overlay value replaces the base
/// one. A null overlay (empty file, `key: ~`) leaves the base untouched.
pub(crate) fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Recursively lower-cases string keys
pub(crate) fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, child)| {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (key, lowercase_keys(child))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}
