//! The selection model and the Selection Reader over it.
//!
//! An [`OptionValue`] is one choice within one option dimension ("Color=Red"), rendered
//! server-side and immutable during a page's life except for which values are selected.
//! The reader side is a pure function of control state; mutation happens only through
//! [`ControlSet::apply_selection`].

use crate::error::Error;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable identifier of one [`OptionValue`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionValueId(pub String);

impl fmt::Display for OptionValueId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for OptionValueId {
	fn from(raw: &str) -> Self {
		Self(raw.to_owned())
	}
}

impl From<String> for OptionValueId {
	fn from(raw: String) -> Self {
		Self(raw)
	}
}

impl AsRef<str> for OptionValueId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Closed set of control kinds rendered for option values.
///
/// Dispatch on this tag replaces the source's runtime probing of node types: a control
/// is either a radio-style input or an entry in a single-choice list, decided once when
/// the controls are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
	Radio,
	List,
}

/// One selectable choice within one option dimension.
#[derive(Clone, Debug)]
pub struct OptionValue {
	pub id: OptionValueId,
	/// Index of the owning option dimension (0 = first dimension).
	pub option_index: usize,
	pub kind: ControlKind,
	pub selected: bool,
	/// The purchasable variant this value resolves to in combination with the current
	/// selection, when the combination resolves at all.
	pub variant_id: Option<u64>,
	/// Linked-product URL for cross-product values (combined listings). Selecting such
	/// a value navigates to a different product.
	pub product_url: Option<String>,
}

/// The ordered set of currently selected [`OptionValueId`]s, one per dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(Vec<OptionValueId>);

impl Selection {
	#[must_use]
	pub fn ids(&self) -> &[OptionValueId] {
		&self.0
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Comma-joined form used for the `option_values` query parameter.
	#[must_use]
	pub fn join(&self) -> String {
		let mut joined = String::new();
		for id in &self.0 {
			if !joined.is_empty() {
				joined.push(',');
			}
			joined.push_str(id.as_ref());
		}
		joined
	}
}

impl FromIterator<OptionValueId> for Selection {
	fn from_iter<I: IntoIterator<Item = OptionValueId>>(ids: I) -> Self {
		Self(ids.into_iter().collect())
	}
}

/// All option-value controls of one picker instance, in rendered order.
#[derive(Clone, Debug, Default)]
pub struct ControlSet {
	controls: Vec<OptionValue>,
}

impl ControlSet {
	#[must_use]
	pub fn new(controls: Vec<OptionValue>) -> Self {
		Self { controls }
	}

	/// The selected value of every dimension, ordered by dimension index.
	#[must_use]
	pub fn current_selection(&self) -> Selection {
		let mut selected: Vec<&OptionValue> = self.controls.iter().filter(|control| control.selected).collect();
		selected.sort_by_key(|control| control.option_index);
		selected.iter().map(|control| control.id.clone()).collect()
	}

	/// The control the interaction originated from.
	pub fn selected_option(&self, id: &OptionValueId) -> Result<&OptionValue, Error> {
		self.controls.iter().find(|control| &control.id == id).ok_or_else(|| Error::NotFound(id.to_string()))
	}

	/// Marks exactly one control selected within its dimension; all siblings of that
	/// dimension are cleared, every other dimension is retained.
	pub fn apply_selection(&mut self, id: &OptionValueId) -> Result<(), Error> {
		let option_index = self.selected_option(id)?.option_index;
		for control in &mut self.controls {
			if control.option_index == option_index {
				control.selected = &control.id == id;
			}
		}
		Ok(())
	}

	#[must_use]
	pub fn controls(&self) -> &[OptionValue] {
		&self.controls
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn control(id: &str, option_index: usize, selected: bool) -> OptionValue {
		OptionValue {
			id: id.into(),
			option_index,
			kind: ControlKind::Radio,
			selected,
			variant_id: None,
			product_url: None,
		}
	}

	fn controls() -> ControlSet {
		ControlSet::new(vec![
			control("red", 0, true),
			control("blue", 0, false),
			control("S", 1, false),
			control("M", 1, true),
		])
	}

	#[test]
	fn selection_is_ordered_by_dimension() {
		let set = ControlSet::new(vec![control("M", 1, true), control("red", 0, true)]);
		let selection = set.current_selection();
		assert_eq!(selection.ids(), &[OptionValueId::from("red"), OptionValueId::from("M")]);
		assert_eq!(selection.join(), "red,M");
	}

	#[test]
	fn apply_selection_clears_only_sibling_dimension() {
		let mut set = controls();
		set.apply_selection(&"blue".into()).unwrap();
		assert_eq!(set.current_selection().join(), "blue,M");
		set.apply_selection(&"S".into()).unwrap();
		assert_eq!(set.current_selection().join(), "blue,S");
	}

	#[test]
	fn unknown_ids_are_not_found() {
		let mut set = controls();
		assert!(matches!(set.selected_option(&"nope".into()), Err(Error::NotFound(_))));
		assert!(matches!(set.apply_selection(&"nope".into()), Err(Error::NotFound(_))));
		// A failed apply leaves the selection untouched.
		assert_eq!(set.current_selection().join(), "red,M");
	}

	#[test]
	fn empty_set_has_empty_selection() {
		let set = ControlSet::default();
		assert!(set.current_selection().is_empty());
		assert_eq!(set.current_selection().join(), "");
	}
}
