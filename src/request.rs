//! Request Builder: turns a newly chosen option value plus the current context into the
//! canonical partial-update request.

use crate::context::{PageContext, PageUrl, Surface};
use crate::selection::{OptionValue, Selection};

pub const OPTION_VALUES_PARAM: &str = "option_values";
pub const SECTION_ID_PARAM: &str = "section_id";

/// A fragment request ready for the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRequest {
	pub url: String,
	/// Whether the response replaces the primary content region (true product
	/// navigation) rather than the variant-selection region alone.
	pub full_page: bool,
}

impl UpdateRequest {
	/// Base-path precedence: the option's own linked-product URL wins (cross-product
	/// values), then the still-pending target (rapid successive changes keep aiming at
	/// the product a started cross-product navigation chose), then the context default.
	#[must_use]
	pub fn build(option: &OptionValue, selection: &Selection, context: &PageContext, pending_target: Option<&str>) -> Self {
		let mut url = match (&option.product_url, pending_target) {
			(Some(linked), _) => PageUrl::parse(linked),
			(None, Some(pending)) => PageUrl::parse(pending),
			(None, None) => context.product_url.clone(),
		};

		match &context.surface {
			Surface::ProductPage => {
				url.set_query(OPTION_VALUES_PARAM, &selection.join());
			}
			Surface::Card { section_id, source_selection, .. } => {
				// Idempotent regardless of how often the builder runs on this context.
				url.clear_query();
				let values = if source_selection.is_empty() {
					option.id.to_string()
				} else {
					source_selection.iter().cloned().collect::<Selection>().join()
				};
				url.set_query(OPTION_VALUES_PARAM, &values);
				url.set_query(SECTION_ID_PARAM, section_id);
			}
		}

		let full_page = context.is_product_page() && url.path() != context.product_url.path();
		Self { url: url.to_string(), full_page }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::selection::{ControlKind, OptionValueId};

	fn option(id: &str, product_url: Option<&str>) -> OptionValue {
		OptionValue {
			id: id.into(),
			option_index: 1,
			kind: ControlKind::Radio,
			selected: true,
			variant_id: Some(987),
			product_url: product_url.map(str::to_owned),
		}
	}

	fn selection(ids: &[&str]) -> Selection {
		ids.iter().map(|id| OptionValueId::from(*id)).collect()
	}

	fn product_page(url: &str) -> PageContext {
		PageContext {
			surface: Surface::ProductPage,
			product_url: PageUrl::parse(url),
		}
	}

	fn card(source: &[&str]) -> PageContext {
		PageContext {
			surface: Surface::Card {
				section_id: "card-section".to_owned(),
				product_url: "/products/tee?from=collection".to_owned(),
				source_selection: source.iter().map(|id| OptionValueId::from(*id)).collect(),
			},
			product_url: PageUrl::parse("/products/tee?from=collection"),
		}
	}

	#[test]
	fn canonical_page_sends_the_full_selection() {
		let request = UpdateRequest::build(&option("M", None), &selection(&["red", "M"]), &product_page("/products/tee"), None);
		assert_eq!(request.url, "/products/tee?option_values=red,M");
		assert!(!request.full_page);
	}

	#[test]
	fn card_sends_the_changed_value_and_section_id() {
		let request = UpdateRequest::build(&option("M", None), &selection(&["red", "M"]), &card(&[]), None);
		assert_eq!(request.url, "/products/tee?option_values=M&section_id=card-section");
		assert!(!request.full_page);
	}

	#[test]
	fn card_prefers_its_source_selection() {
		let request = UpdateRequest::build(&option("M", None), &selection(&["red", "M"]), &card(&["blue", "M"]), None);
		assert_eq!(request.url, "/products/tee?option_values=blue,M&section_id=card-section");
	}

	#[test]
	fn card_base_query_is_stripped_every_time() {
		let context = card(&[]);
		let first = UpdateRequest::build(&option("M", None), &selection(&["M"]), &context, None);
		let again = UpdateRequest::build(&option("M", None), &selection(&["M"]), &context, Some(&first.url));
		assert_eq!(first.url, again.url);
	}

	#[test]
	fn linked_product_goes_full_page_on_the_canonical_page() {
		let request = UpdateRequest::build(
			&option("heather", Some("/products/heather-tee")),
			&selection(&["red", "heather"]),
			&product_page("/products/tee"),
			None,
		);
		assert_eq!(request.url, "/products/heather-tee?option_values=red,heather");
		assert!(request.full_page);
	}

	#[test]
	fn linked_product_never_goes_full_page_inside_a_card() {
		let request = UpdateRequest::build(&option("heather", Some("/products/heather-tee")), &selection(&["heather"]), &card(&[]), None);
		assert!(!request.full_page);
		assert_eq!(request.url, "/products/heather-tee?option_values=heather&section_id=card-section");
	}

	#[test]
	fn pending_target_outlives_the_change_that_started_it() {
		// A cross-product navigation is in flight; the next rapid change carries no
		// linked URL of its own but must keep targeting the same product.
		let request = UpdateRequest::build(
			&option("L", None),
			&selection(&["red", "L"]),
			&product_page("/products/tee"),
			Some("/products/heather-tee?option_values=red,heather"),
		);
		assert_eq!(request.url, "/products/heather-tee?option_values=red,L");
		assert!(request.full_page);
	}

	#[test]
	fn linked_url_beats_the_pending_target() {
		let request = UpdateRequest::build(
			&option("back", Some("/products/tee")),
			&selection(&["red", "back"]),
			&product_page("/products/tee"),
			Some("/products/heather-tee?option_values=red,heather"),
		);
		assert_eq!(request.url, "/products/tee?option_values=red,back");
		assert!(!request.full_page);
	}
}
