//! The picker itself: pipeline orchestration over a [`Host`].
//!
//! One user-initiated change runs Selection Reader → Request Builder → Fetch
//! Coordinator → Content Merger → State Publisher, in that order, as a single
//! asynchronous continuation. The only suspension point is the fetch; everything around
//! it is synchronous, so there is exactly one writer context at a time and no locking.

use crate::context::{PageContext, PageUrl, Surface};
use crate::coordinator::{FetchCoordinator, FragmentTransport};
use crate::error::Error;
use crate::merge::{self, MergeOutcome};
use crate::publisher::{self, VariantChange};
use crate::request::UpdateRequest;
use crate::selection::{ControlSet, OptionValueId, Selection};
use tracing::trace;

/// The browser touchpoints the engine needs, kept behind a trait so the pipeline is
/// testable without a DOM. The `wasm32` implementation lives in [`crate::dom`].
///
/// All methods take `&self`: the engine is single-threaded and hosts use interior
/// mutability, which keeps the picker shareable as `Rc<VariantPicker<_, _>>` across
/// overlapping event continuations.
pub trait Host {
	/// Reads the rendered option controls. Pure; never mutates.
	fn read_controls(&self) -> ControlSet;
	/// Marks exactly one control selected within its dimension.
	fn apply_selection(&self, id: &OptionValueId) -> Result<(), Error>;

	/// The embedded JSON payload of the fragment's variant-selection region, if any.
	fn extract_payload(&self, fragment: &str) -> Option<String>;
	/// Morphs the primary content region to match the fragment's.
	fn merge_primary(&self, fragment: &str) -> Result<(), Error>;
	/// Morphs the variant-selection region only; resolves to the fragment's product id
	/// when it declares a different linked product.
	fn merge_selector(&self, fragment: &str) -> Result<Option<String>, Error>;

	fn current_url(&self) -> PageUrl;
	/// Replaces the current history entry; never pushes a new one.
	fn replace_url(&self, url: &PageUrl);
	/// Emits the change notification sibling surfaces consume.
	fn publish(&self, change: &VariantChange);
}

/// One variant-selection surface, bound to its host and transport for the page's life.
#[derive(Debug)]
pub struct VariantPicker<H, T> {
	host: H,
	coordinator: FetchCoordinator<T>,
	surface: Surface,
}

impl<H: Host, T: FragmentTransport> VariantPicker<H, T> {
	pub fn new(host: H, transport: T, surface: Surface) -> Self {
		Self {
			host,
			coordinator: FetchCoordinator::new(transport),
			surface,
		}
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	/// `true` while a fragment request is in flight (the Requesting state).
	#[must_use]
	pub fn is_requesting(&self) -> bool {
		self.coordinator.is_requesting()
	}

	#[must_use]
	pub fn current_selection(&self) -> Selection {
		self.host.read_controls().current_selection()
	}

	/// Runs the full pipeline for one user-initiated change.
	///
	/// A selection arriving while a request is in flight cancels it and restarts the
	/// pipeline; the superseded continuation resolves without side effects. Errors
	/// returned here are already logged and carry no user-visible consequence beyond
	/// "nothing changed".
	pub async fn on_option_change(&self, id: &OptionValueId) -> Result<(), Error> {
		let mut controls = self.host.read_controls();
		let option = controls.selected_option(id)?.clone();
		controls.apply_selection(id)?;
		self.host.apply_selection(id)?;
		let selection = controls.current_selection();

		let context = self.page_context();
		let pending = self.coordinator.pending_target();
		let request = UpdateRequest::build(&option, &selection, &context, pending.as_deref());
		trace!(url = %request.url, full_page = request.full_page, "variant update");

		let body = match self.coordinator.update(request.url.clone(), request.full_page).await {
			Ok(body) => body,
			Err(error) if error.is_cancellation() => return Ok(()),
			Err(error) => return Err(error),
		};

		match merge::apply(&self.host, &body, request.full_page)? {
			MergeOutcome::Skipped => Ok(()),
			MergeOutcome::Applied { snapshot, new_product_id } => {
				publisher::publish(&self.host, &context, &snapshot, id, new_product_id, request.full_page);
				Ok(())
			}
		}
	}

	/// Derived fresh per interaction; the canonical page reads the address bar, a card
	/// carries its own product URL.
	fn page_context(&self) -> PageContext {
		let product_url = match &self.surface {
			Surface::ProductPage => self.host.current_url(),
			Surface::Card { product_url, .. } => PageUrl::parse(product_url),
		};
		PageContext {
			surface: self.surface.clone(),
			product_url,
		}
	}
}
