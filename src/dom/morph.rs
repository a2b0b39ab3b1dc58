//! Element-to-element morph: mutates the current subtree to match the fetched one while
//! keeping the identity of untouched nodes, so focus, scroll positions and open popovers
//! survive a merge where possible.
//!
//! Fetched nodes come from a `DOMParser` document and are imported before insertion.
//! Failures are contained per node: a node that cannot be written is logged and skipped,
//! never escalated.

use tracing::{error, warn};
use wasm_bindgen::JsCast;
use web_sys::{CharacterData, Document, Element, Node};

/// Recursion cap; regions deeper than this are left as-is with a diagnostic.
pub const DEPTH_LIMIT: usize = 64;

pub fn morph_element(document: &Document, current: &Element, target: &Element, depth_limit: usize) {
	if depth_limit == 0 {
		return error!("depth limit reached; leaving subtree as-is");
	}
	sync_attributes(current, target);
	morph_children(document, current.as_ref(), target.as_ref(), depth_limit);
}

fn sync_attributes(current: &Element, target: &Element) {
	let current_attributes = current.attributes();
	let mut stale = Vec::new();
	for i in 0..current_attributes.length() {
		if let Some(attribute) = current_attributes.item(i) {
			if target.get_attribute(&attribute.name()).is_none() {
				stale.push(attribute.name());
			}
		}
	}
	for name in stale {
		if let Err(error) = current.remove_attribute(&name) {
			warn!(attribute = %name, ?error, "could not remove attribute");
		}
	}

	let target_attributes = target.attributes();
	for i in 0..target_attributes.length() {
		let Some(attribute) = target_attributes.item(i) else { continue };
		if current.get_attribute(&attribute.name()).as_deref() != Some(attribute.value().as_str()) {
			if let Err(error) = current.set_attribute(&attribute.name(), &attribute.value()) {
				warn!(attribute = %attribute.name(), ?error, "could not set attribute");
			}
		}
	}
}

fn morph_children(document: &Document, current: &Node, target: &Node, depth_limit: usize) {
	let current_children = current.child_nodes();
	let target_children = target.child_nodes();

	for i in 0..target_children.length() {
		let Some(target_child) = target_children.item(i) else { continue };
		match current_children.item(i) {
			None => {
				if let Some(imported) = import(document, &target_child) {
					if let Err(error) = current.append_child(&imported) {
						error!(?error, "could not append fetched node");
					}
				}
			}
			Some(current_child) if same_shape(&current_child, &target_child) => {
				if let (Some(current_element), Some(target_element)) = (current_child.dyn_ref::<Element>(), target_child.dyn_ref::<Element>()) {
					morph_element(document, current_element, target_element, depth_limit - 1);
				} else if let (Some(current_data), Some(target_data)) = (current_child.dyn_ref::<CharacterData>(), target_child.dyn_ref::<CharacterData>()) {
					if current_data.data() != target_data.data() {
						current_data.set_data(&target_data.data());
					}
				}
			}
			Some(current_child) => {
				// Shape mismatch: replace this node in place, keeping its siblings.
				if let Some(imported) = import(document, &target_child) {
					if let Err(error) = current.replace_child(&imported, &current_child) {
						error!(?error, "could not replace node");
					}
				}
			}
		}
	}

	// The child list is live; drop whatever the fetched document no longer has.
	loop {
		let length = current_children.length();
		if length <= target_children.length() {
			break;
		}
		let Some(extra) = current_children.item(length - 1) else { break };
		if let Err(error) = current.remove_child(&extra) {
			error!(?error, "could not remove stale node");
			break;
		}
	}
}

fn same_shape(current: &Node, target: &Node) -> bool {
	current.node_type() == target.node_type()
		&& match (current.dyn_ref::<Element>(), target.dyn_ref::<Element>()) {
			(Some(current), Some(target)) => current.tag_name() == target.tag_name(),
			_ => true,
		}
}

fn import(document: &Document, node: &Node) -> Option<Node> {
	match document.import_node_with_deep(node, true) {
		Ok(imported) => Some(imported),
		Err(error) => {
			error!(?error, "could not import fetched node");
			None
		}
	}
}
