//! State Publisher: URL replacement and the change notification other surfaces consume.

use crate::context::PageContext;
use crate::picker::Host;
use crate::selection::OptionValueId;
use crate::snapshot::VariantSnapshot;
use serde::Serialize;
use tracing::trace;

pub const VARIANT_PARAM: &str = "variant";

/// The documented contract sibling surfaces (price, gallery, the click-routing link)
/// depend on. Their reactions are their own concern.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantChange {
	/// Absent when the selected combination resolves to no purchasable variant.
	pub variant_id: Option<u64>,
	pub snapshot: VariantSnapshot,
	/// The option value the shopper just interacted with.
	pub option_value_id: OptionValueId,
	/// Present when the merge moved this surface to a different product.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub new_product_id: Option<String>,
}

/// Propagates a successful merge: URL first, then the change notification.
///
/// URL writes happen only on the canonical product page, always replace (never push)
/// the history entry, and are skipped entirely when the computed URL equals the current
/// one. The change notification fires only for narrow merges; a full-page merge already
/// replaced the surfaces that would consume it.
pub fn publish<H: Host>(host: &H, context: &PageContext, snapshot: &VariantSnapshot, option_value_id: &OptionValueId, new_product_id: Option<String>, full_page: bool) {
	if context.is_product_page() {
		let current = host.current_url();
		let mut target = current.clone();
		match snapshot.id {
			Some(id) => target.set_query(VARIANT_PARAM, &id.to_string()),
			None => target.remove_query(VARIANT_PARAM),
		}
		if full_page || new_product_id.is_some() {
			if let Some(url) = &snapshot.url {
				target.set_path(url);
			}
		}
		if target == current {
			trace!(url = %current, "computed URL unchanged; skipping history write");
		} else {
			host.replace_url(&target);
		}
	}

	if !full_page {
		host.publish(&VariantChange {
			variant_id: snapshot.id,
			snapshot: snapshot.clone(),
			option_value_id: option_value_id.clone(),
			new_product_id,
		});
	}
}
