//! Page context derivation and the small URL model the engine works on.
//!
//! [`PageUrl`] deliberately covers only what product URLs need: an optional origin, a
//! path, and ordered query pairs. Values are product handles and option-value ids, which
//! never require percent-encoding.

use crate::selection::OptionValueId;
use core::fmt;

/// Which surface a picker instance serves.
#[derive(Clone, Debug)]
pub enum Surface {
	/// The product's own canonical page.
	ProductPage,
	/// An embedded product card or quick-add surface on some other page.
	Card {
		/// Section rendered for card-only fragments (`section_id` parameter).
		section_id: String,
		/// The card's product URL; cards cannot derive it from the address bar.
		product_url: String,
		/// Pre-selected values the card was rendered with, if any.
		source_selection: Vec<OptionValueId>,
	},
}

/// Read-only per-interaction context: the surface kind plus the base URL (with query
/// parameters) in effect for it.
#[derive(Clone, Debug)]
pub struct PageContext {
	pub surface: Surface,
	pub product_url: PageUrl,
}

impl PageContext {
	#[must_use]
	pub fn is_product_page(&self) -> bool {
		matches!(self.surface, Surface::ProductPage)
	}
}

/// A product URL split into origin, path and ordered query pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageUrl {
	origin: String,
	path: String,
	query: Vec<(String, String)>,
}

impl PageUrl {
	/// Accepts absolute (`https://shop.example/p`) and site-relative (`/p?x=y`) forms.
	/// Fragment identifiers are dropped; they never survive a partial update.
	#[must_use]
	pub fn parse(raw: &str) -> Self {
		let raw = raw.split('#').next().unwrap_or("");
		let (base, query) = match raw.split_once('?') {
			Some((base, query)) => (base, query),
			None => (raw, ""),
		};
		let (origin, path) = match base.find("://") {
			Some(scheme_end) => match base[scheme_end + 3..].find('/') {
				Some(slash) => base.split_at(scheme_end + 3 + slash),
				None => (base, ""),
			},
			None => ("", base),
		};
		let query = query
			.split('&')
			.filter(|pair| !pair.is_empty())
			.map(|pair| match pair.split_once('=') {
				Some((key, value)) => (key.to_owned(), value.to_owned()),
				None => (pair.to_owned(), String::new()),
			})
			.collect();
		Self {
			origin: origin.to_owned(),
			path: path.to_owned(),
			query,
		}
	}

	#[must_use]
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Replaces the path, keeping origin and query. `path` may itself carry a query or
	/// origin (canonical product URLs do); only its path component is taken.
	pub fn set_path(&mut self, path: &str) {
		self.path = Self::parse(path).path;
	}

	#[must_use]
	pub fn query(&self, key: &str) -> Option<&str> {
		self.query.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
	}

	/// Replace-or-append, preserving the position of an existing key so repeated writes
	/// are idempotent.
	pub fn set_query(&mut self, key: &str, value: &str) {
		match self.query.iter_mut().find(|(existing, _)| existing == key) {
			Some((_, existing)) => *existing = value.to_owned(),
			None => self.query.push((key.to_owned(), value.to_owned())),
		}
	}

	pub fn remove_query(&mut self, key: &str) {
		self.query.retain(|(existing, _)| existing != key);
	}

	pub fn clear_query(&mut self) {
		self.query.clear();
	}
}

impl fmt::Display for PageUrl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.origin, self.path)?;
		for (i, (key, value)) in self.query.iter().enumerate() {
			let separator = if i == 0 { '?' } else { '&' };
			write!(f, "{separator}{key}={value}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_relative_and_absolute_forms() {
		let relative = PageUrl::parse("/products/tee?variant=1&x=y");
		assert_eq!(relative.path(), "/products/tee");
		assert_eq!(relative.query("variant"), Some("1"));
		assert_eq!(relative.to_string(), "/products/tee?variant=1&x=y");

		let absolute = PageUrl::parse("https://shop.example/products/tee?variant=1");
		assert_eq!(absolute.path(), "/products/tee");
		assert_eq!(absolute.to_string(), "https://shop.example/products/tee?variant=1");
	}

	#[test]
	fn set_query_replaces_in_place() {
		let mut url = PageUrl::parse("/p?a=1&b=2");
		url.set_query("a", "3");
		assert_eq!(url.to_string(), "/p?a=3&b=2");
		url.set_query("c", "4");
		assert_eq!(url.to_string(), "/p?a=3&b=2&c=4");
	}

	#[test]
	fn remove_and_clear() {
		let mut url = PageUrl::parse("/p?a=1&b=2");
		url.remove_query("a");
		assert_eq!(url.to_string(), "/p?b=2");
		url.remove_query("missing");
		assert_eq!(url.to_string(), "/p?b=2");
		url.clear_query();
		assert_eq!(url.to_string(), "/p");
	}

	#[test]
	fn set_path_keeps_origin_and_query() {
		let mut url = PageUrl::parse("https://shop.example/products/tee?variant=1");
		url.set_path("/products/other?ignored=1");
		assert_eq!(url.to_string(), "https://shop.example/products/other?variant=1");
	}

	#[test]
	fn fragment_identifiers_are_dropped() {
		let url = PageUrl::parse("/p?a=1#reviews");
		assert_eq!(url.to_string(), "/p?a=1");
	}
}
