//! The DOM-backed [`Host`]: reads controls, merges fragments and publishes state for one
//! `<variant-picker>` element.

use crate::context::PageUrl;
use crate::dom::{js_error, morph};
use crate::error::Error;
use crate::picker::Host;
use crate::publisher::VariantChange;
use crate::registry::COMPONENT_NAME;
use crate::selection::{ControlKind, ControlSet, OptionValue, OptionValueId};
use tracing::{error, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Document, DomParser, Element, HtmlElement, HtmlInputElement, SupportedType, Window};

pub const OPTION_VALUE_ATTR: &str = "data-option-value-id";
pub const OPTION_INDEX_ATTR: &str = "data-option-index";
pub const VARIANT_ID_ATTR: &str = "data-variant-id";
pub const PRODUCT_URL_ATTR: &str = "data-product-url";
pub const PRODUCT_ID_ATTR: &str = "data-product-id";

/// Name of the bubbling `CustomEvent` carrying a [`VariantChange`] detail.
pub const CHANGE_EVENT: &str = "variant-picker:change";

const CONTROL_SELECTOR: &str = "[data-option-value-id]";
const PRIMARY_REGION_SELECTOR: &str = "main";
const PAYLOAD_SELECTOR: &str = "script[type='application/json'][data-variant-payload]";

#[derive(Debug)]
pub struct DomHost {
	root: Element,
	document: Document,
	window: Window,
}

impl DomHost {
	/// Binds to one picker element. Fails when the element is detached from a window.
	pub fn new(root: Element) -> Result<Self, Error> {
		let document = root.owner_document().ok_or_else(|| Error::NotFound("owner document".to_owned()))?;
		let window = document.default_view().ok_or_else(|| Error::NotFound("window".to_owned()))?;
		Ok(Self { root, document, window })
	}

	#[must_use]
	pub fn root(&self) -> &Element {
		&self.root
	}

	fn parse_fragment(&self, fragment: &str) -> Result<Document, Error> {
		let parser = DomParser::new().map_err(|error| Error::MalformedPayload(js_error(&error)))?;
		parser
			.parse_from_string(fragment, SupportedType::TextHtml)
			.map_err(|error| Error::MalformedPayload(js_error(&error)))
	}

	fn control(&self, id: &OptionValueId) -> Option<Element> {
		self.root.query_selector(&format!("[{OPTION_VALUE_ATTR}=\"{id}\"]")).ok().flatten()
	}

	fn focused_option_value(&self) -> Option<String> {
		self.document.active_element().and_then(|element| element.get_attribute(OPTION_VALUE_ATTR))
	}
}

impl Host for DomHost {
	fn read_controls(&self) -> ControlSet {
		let nodes = match self.root.query_selector_all(CONTROL_SELECTOR) {
			Ok(nodes) => nodes,
			Err(error) => {
				error!(?error, "control query failed");
				return ControlSet::default();
			}
		};

		let mut controls = Vec::new();
		for i in 0..nodes.length() {
			let Some(element) = nodes.item(i).and_then(|node| node.dyn_into::<Element>().ok()) else { continue };
			let Some(id) = element.get_attribute(OPTION_VALUE_ATTR) else { continue };
			let (kind, selected) = match element.dyn_ref::<HtmlInputElement>() {
				Some(input) if input.type_() == "radio" => (ControlKind::Radio, input.checked()),
				_ => (ControlKind::List, element.get_attribute("aria-selected").as_deref() == Some("true")),
			};
			controls.push(OptionValue {
				id: id.into(),
				option_index: element.get_attribute(OPTION_INDEX_ATTR).and_then(|raw| raw.parse().ok()).unwrap_or(0),
				kind,
				selected,
				variant_id: element.get_attribute(VARIANT_ID_ATTR).and_then(|raw| raw.parse().ok()),
				product_url: element.get_attribute(PRODUCT_URL_ATTR),
			});
		}
		ControlSet::new(controls)
	}

	fn apply_selection(&self, id: &OptionValueId) -> Result<(), Error> {
		let controls = self.read_controls();
		let control = controls.selected_option(id)?;
		let element = self.control(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
		match control.kind {
			// Radio groups clear their own siblings.
			ControlKind::Radio => match element.dyn_ref::<HtmlInputElement>() {
				Some(input) => input.set_checked(true),
				None => return Err(Error::NotFound(id.to_string())),
			},
			ControlKind::List => {
				let option_index = element.get_attribute(OPTION_INDEX_ATTR).unwrap_or_default();
				let siblings = self
					.root
					.query_selector_all(&format!("[{OPTION_INDEX_ATTR}=\"{option_index}\"]"))
					.map_err(|error| Error::NotFound(js_error(&error)))?;
				for i in 0..siblings.length() {
					let Some(sibling) = siblings.item(i).and_then(|node| node.dyn_into::<Element>().ok()) else { continue };
					let selected = sibling.is_same_node(Some(element.as_ref()));
					if let Err(error) = sibling.set_attribute("aria-selected", if selected { "true" } else { "false" }) {
						warn!(?error, "could not update list selection state");
					}
				}
			}
		}
		Ok(())
	}

	fn extract_payload(&self, fragment: &str) -> Option<String> {
		let fetched = self.parse_fragment(fragment).ok()?;
		fetched.query_selector(PAYLOAD_SELECTOR).ok().flatten()?.text_content()
	}

	fn merge_primary(&self, fragment: &str) -> Result<(), Error> {
		let fetched = self.parse_fragment(fragment)?;
		let target = fetched
			.query_selector(PRIMARY_REGION_SELECTOR)
			.ok()
			.flatten()
			.ok_or(Error::MissingRegion("fetched primary content"))?;
		let current = self
			.document
			.query_selector(PRIMARY_REGION_SELECTOR)
			.ok()
			.flatten()
			.ok_or(Error::MissingRegion("primary content"))?;
		morph::morph_element(&self.document, &current, &target, morph::DEPTH_LIMIT);
		Ok(())
	}

	fn merge_selector(&self, fragment: &str) -> Result<Option<String>, Error> {
		let fetched = self.parse_fragment(fragment)?;
		let target = fetched
			.query_selector(COMPONENT_NAME)
			.ok()
			.flatten()
			.ok_or(Error::MissingRegion("fetched variant selection"))?;

		let prior_product = self.root.get_attribute(PRODUCT_ID_ATTR);
		let focused = self.focused_option_value();

		morph::morph_element(&self.document, &self.root, &target, morph::DEPTH_LIMIT);

		// Card-level product identity is preserved unless the fragment declares one.
		if let (Some(prior), None) = (&prior_product, self.root.get_attribute(PRODUCT_ID_ATTR)) {
			if let Err(error) = self.root.set_attribute(PRODUCT_ID_ATTR, prior) {
				warn!(?error, "could not restore product identity attribute");
			}
		}

		// The morph may have replaced the focused control; give focus back to its
		// successor so keyboard shoppers keep their place.
		if let Some(id) = focused {
			if self.focused_option_value().as_deref() != Some(&id) {
				if let Some(control) = self.control(&OptionValueId::from(id)) {
					if let Some(html) = control.dyn_ref::<HtmlElement>() {
						let _ = html.focus();
					}
				}
			}
		}

		let next_product = self.root.get_attribute(PRODUCT_ID_ATTR);
		Ok(match next_product {
			Some(next) if prior_product.as_deref() != Some(next.as_str()) => Some(next),
			_ => None,
		})
	}

	fn current_url(&self) -> PageUrl {
		match self.window.location().href() {
			Ok(href) => PageUrl::parse(&href),
			Err(error) => {
				error!(?error, "could not read location");
				PageUrl::parse("")
			}
		}
	}

	fn replace_url(&self, url: &PageUrl) {
		let result = self
			.window
			.history()
			.and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(&url.to_string())));
		if let Err(error) = result {
			error!(?error, "could not replace history entry");
		}
	}

	fn publish(&self, change: &VariantChange) {
		let detail = match serde_wasm_bindgen::to_value(change) {
			Ok(detail) => detail,
			Err(error) => {
				return error!(%error, "could not serialize change notification");
			}
		};
		let init = CustomEventInit::new();
		init.set_bubbles(true);
		init.set_detail(&detail);
		match CustomEvent::new_with_event_init_dict(CHANGE_EVENT, &init) {
			Ok(event) => {
				if let Err(error) = self.root.dispatch_event(&event) {
					error!(?error, "could not dispatch change notification");
				}
			}
			Err(error) => error!(?error, "could not construct change notification"),
		}
	}
}
