//! Explicit component registry.
//!
//! Replaces global singleton registration: callers ask once per component name and get
//! told whether they are the first. Re-registration is an explicitly guarded no-op.

use core::cell::RefCell;
use hashbrown::HashSet;
use tracing::debug;

/// Element/component name of the variant picker.
pub const COMPONENT_NAME: &str = "variant-picker";

thread_local! {
	static DEFINED: RefCell<HashSet<&'static str>> = RefCell::new(HashSet::new());
}

/// Returns whether `name` was newly defined. Idempotent: repeated calls for the same
/// name return `false` and emit a debug-level diagnostic only.
pub fn define(name: &'static str) -> bool {
	DEFINED.with(|defined| {
		let newly_defined = defined.borrow_mut().insert(name);
		if !newly_defined {
			debug!(component = name, "already defined; ignoring re-registration");
		}
		newly_defined
	})
}

#[must_use]
pub fn is_defined(name: &'static str) -> bool {
	DEFINED.with(|defined| defined.borrow().contains(name))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn re_registration_is_a_guarded_no_op() {
		assert!(!is_defined("test-picker"));
		assert!(define("test-picker"));
		assert!(is_defined("test-picker"));
		assert!(!define("test-picker"));
		assert!(is_defined("test-picker"));
	}

	#[test]
	fn names_are_independent() {
		assert!(define("picker-a"));
		assert!(define("picker-b"));
		assert!(!define("picker-a"));
	}
}
