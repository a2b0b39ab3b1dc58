//! Browser bindings: the DOM-backed host, the fetch transport, the element morph, and
//! the bootstrap that wires pickers to `<variant-picker>` elements.

pub mod host;
pub mod morph;
pub mod transport;

pub use host::DomHost;
pub use transport::FetchTransport;

use crate::context::Surface;
use crate::picker::VariantPicker;
use crate::registry::{self, COMPONENT_NAME};
use crate::selection::OptionValueId;
use std::rc::Rc;
use tracing::{trace, warn};
use wasm_bindgen::prelude::{wasm_bindgen, Closure};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event};

const SECTION_ID_ATTR: &str = "data-section-id";
const SOURCE_SELECTION_ATTR: &str = "data-source-selection";

/// Wires every `<variant-picker>` element in the document. Safe to call more than once:
/// registration is guarded through [`registry::define`].
pub fn register() -> Result<(), JsValue> {
	if !registry::define(COMPONENT_NAME) {
		return Ok(());
	}
	let document = web_sys::window()
		.and_then(|window| window.document())
		.ok_or_else(|| JsValue::from_str("no document to register against"))?;
	let pickers = document.query_selector_all(COMPONENT_NAME)?;
	for i in 0..pickers.length() {
		let Some(root) = pickers.item(i).and_then(|node| node.dyn_into::<Element>().ok()) else { continue };
		attach(root)?;
	}
	Ok(())
}

#[wasm_bindgen(js_name = "registerVariantPicker")]
pub fn register_variant_picker() -> Result<(), JsValue> {
	register()
}

/// Binds one picker element: a delegated `change` listener that runs the update
/// pipeline as a detached continuation per user-initiated selection.
pub fn attach(root: Element) -> Result<(), JsValue> {
	let surface = surface_of(&root);
	let host = DomHost::new(root.clone()).map_err(|error| JsValue::from_str(&error.to_string()))?;
	let picker = Rc::new(VariantPicker::new(host, FetchTransport::new(), surface));

	let handler = Closure::<dyn Fn(Event)>::new(move |event: Event| {
		let Some(id) = option_value_of(&event) else {
			return trace!("change event did not originate from a recognized control");
		};
		let picker = Rc::clone(&picker);
		spawn_local(async move {
			if let Err(error) = picker.on_option_change(&id).await {
				warn!(%error, option_value = %id, "variant update failed; keeping prior state");
			}
		});
	});
	root.add_event_listener_with_callback("change", handler.as_ref().unchecked_ref())?;
	// The listener lives for the page's life, like the element it serves.
	handler.forget();
	Ok(())
}

/// A picker rendered with a section id and its own product URL is an embedded card;
/// anything else is the product's canonical page.
fn surface_of(root: &Element) -> Surface {
	match (root.get_attribute(SECTION_ID_ATTR), root.get_attribute(host::PRODUCT_URL_ATTR)) {
		(Some(section_id), Some(product_url)) => Surface::Card {
			section_id,
			product_url,
			source_selection: root
				.get_attribute(SOURCE_SELECTION_ATTR)
				.map(|raw| raw.split(',').filter(|id| !id.is_empty()).map(OptionValueId::from).collect())
				.unwrap_or_default(),
		},
		_ => Surface::ProductPage,
	}
}

fn option_value_of(event: &Event) -> Option<OptionValueId> {
	event
		.target()?
		.dyn_into::<Element>()
		.ok()?
		.closest(&format!("[{}]", host::OPTION_VALUE_ATTR))
		.ok()??
		.get_attribute(host::OPTION_VALUE_ATTR)
		.map(OptionValueId::from)
}

pub(crate) fn js_error(error: &JsValue) -> String {
	format!("{error:?}")
}
