//! The structured payload the server embeds next to the markup: the authoritative
//! [`VariantSnapshot`] for the fetched selection.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Representative image of the resolved variant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedImage {
	pub src: String,
	#[serde(default)]
	pub alt: String,
}

/// One entry of the variant's media list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
	pub src: String,
	#[serde(default)]
	pub alt: String,
}

/// Resolved server data for one selection.
///
/// `id` is absent when the selected combination resolves to no purchasable variant.
/// Unknown payload fields are ignored so the server side can grow the payload without
/// breaking deployed storefronts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantSnapshot {
	#[serde(default)]
	pub id: Option<u64>,
	/// Canonical product URL for the resolved variant.
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub featured_image: Option<FeaturedImage>,
	#[serde(default)]
	pub media: Vec<MediaItem>,
}

impl VariantSnapshot {
	pub fn parse(json: &str) -> Result<Self, Error> {
		serde_json::from_str(json).map_err(|error| Error::MalformedPayload(error.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_a_full_payload() {
		let snapshot = VariantSnapshot::parse(
			r#"{
				"id": 987,
				"url": "/products/tee",
				"featured_image": { "src": "/img/blue-l.jpg", "alt": "Blue tee, size L" },
				"media": [{ "src": "/img/blue-l-back.jpg" }],
				"price": "not modelled here"
			}"#,
		)
		.unwrap();
		assert_eq!(snapshot.id, Some(987));
		assert_eq!(snapshot.featured_image.unwrap().src, "/img/blue-l.jpg");
		assert_eq!(snapshot.media.len(), 1);
		assert_eq!(snapshot.media[0].alt, "");
	}

	#[test]
	fn unresolved_combinations_have_no_id() {
		let snapshot = VariantSnapshot::parse("{}").unwrap();
		assert_eq!(snapshot.id, None);
		assert!(snapshot.media.is_empty());
	}

	#[test]
	fn malformed_payloads_are_reported() {
		assert!(matches!(VariantSnapshot::parse("not json"), Err(Error::MalformedPayload(_))));
	}
}
