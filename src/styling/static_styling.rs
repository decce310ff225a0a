//! Static class/style buckets of a node.

use crate::engine::NodeDescriptor;
use super::TAttributes;

/// Compute the static class list and style map of `node` from `attrs`.
///
/// Recomputes from scratch, so calling it twice with the same attributes
/// leaves the node unchanged. Duplicate classes are dropped and a later
/// style declaration overrides an earlier one for the same property.
pub fn compute_static_styling(node: &mut NodeDescriptor, attrs: &TAttributes) {
    let mut class_list: Vec<String> = Vec::new();
    for class in attrs.classes() {
        if !class_list.iter().any(|existing| existing == class) {
            class_list.push(class.to_string());
        }
    }

    let mut style_map: Vec<(String, String)> = Vec::new();
    for (property, value) in attrs.styles() {
        match style_map.iter_mut().find(|(prop, _)| prop == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => style_map.push((property.to_string(), value.to_string())),
        }
    }

    node.classes = (!class_list.is_empty()).then(|| class_list.join(" "));
    node.styles = (!style_map.is_empty()).then(|| {
        style_map
            .iter()
            .map(|(prop, value)| format!("{prop}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    });
    node.class_list = class_list;
    node.style_map = style_map;
}
