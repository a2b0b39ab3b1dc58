#![warn(clippy::pedantic)]

//! Variant-selection synchronization for storefront product pages.
//!
//! As a shopper toggles options (size, color, …) this engine keeps three things
//! consistent without a full page reload: the rendered option controls, the
//! server-rendered product markup, and the browser address bar. One picker instance owns
//! one selection surface; a single authoritative server maps variants to price, image
//! and URL.
//!
//! The engine core is target-independent; the browser bindings (DOM host, fetch
//! transport, element morph) are compiled for `wasm32` only and live in [`dom`].

pub mod context;
pub mod coordinator;
pub mod error;
pub mod merge;
pub mod picker;
pub mod publisher;
pub mod registry;
pub mod request;
pub mod selection;
pub mod snapshot;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use context::{PageContext, PageUrl, Surface};
pub use coordinator::{CancelToken, FetchCoordinator, FragmentTransport, PendingRequest};
pub use error::Error;
pub use merge::MergeOutcome;
pub use picker::{Host, VariantPicker};
pub use publisher::VariantChange;
pub use request::UpdateRequest;
pub use selection::{ControlKind, ControlSet, OptionValue, OptionValueId, Selection};
pub use snapshot::{FeaturedImage, MediaItem, VariantSnapshot};
