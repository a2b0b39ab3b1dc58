//! Content Merger: full-page versus narrow merge, decided only after the fragment's
//! structured payload parsed.

use crate::error::Error;
use crate::picker::Host;
use crate::snapshot::VariantSnapshot;
use tracing::warn;

/// What a merge attempt did to the page.
#[derive(Clone, Debug, PartialEq)]
pub enum MergeOutcome {
	/// Markup merged; the snapshot is ready for the publisher.
	Applied {
		snapshot: VariantSnapshot,
		/// Product id the fetched selector region declared, when it differs from the
		/// one currently on the page (narrow merges of combined listings).
		new_product_id: Option<String>,
	},
	/// Payload absent or malformed: the page stays on its prior state. Non-fatal by
	/// design; only a diagnostic is emitted.
	Skipped,
}

/// Applies the fetched fragment to the host document.
///
/// The payload is extracted and parsed first; without an authoritative snapshot no
/// markup is touched. A full-page merge replaces the primary content region (true
/// product navigation), a narrow merge replaces the variant-selection region only.
pub fn apply<H: Host>(host: &H, fragment: &str, full_page: bool) -> Result<MergeOutcome, Error> {
	let Some(payload) = host.extract_payload(fragment) else {
		warn!("fragment carries no variant payload; leaving the page untouched");
		return Ok(MergeOutcome::Skipped);
	};
	let snapshot = match VariantSnapshot::parse(&payload) {
		Ok(snapshot) => snapshot,
		Err(error) => {
			warn!(%error, "leaving the page untouched");
			return Ok(MergeOutcome::Skipped);
		}
	};

	let new_product_id = if full_page {
		host.merge_primary(fragment)?;
		None
	} else {
		host.merge_selector(fragment)?
	};

	Ok(MergeOutcome::Applied { snapshot, new_product_id })
}
