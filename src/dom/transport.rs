//! Browser fetch transport with advisory abort.

use crate::coordinator::{CancelToken, FragmentTransport};
use crate::dom::js_error;
use crate::error::Error;
use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, RequestInit, Response};

/// Fragment GETs through `window.fetch`, wired to an `AbortController` so a superseded
/// request is torn down at the network layer too. Abort is advisory only; the
/// coordinator's token remains the authority on whether a response may be applied.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl FetchTransport {
	#[must_use]
	pub fn new() -> Self {
		Self
	}
}

#[async_trait(?Send)]
impl FragmentTransport for FetchTransport {
	async fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<String, Error> {
		let controller = AbortController::new().map_err(|error| Error::Transport(js_error(&error)))?;
		let signal = controller.signal();
		cancel.on_cancel(move || controller.abort());

		let init = RequestInit::new();
		init.set_method("GET");
		init.set_signal(Some(&signal));

		let window = web_sys::window().ok_or_else(|| Error::Transport("no window".to_owned()))?;
		let response = JsFuture::from(window.fetch_with_str_and_init(url, &init))
			.await
			.map_err(|error| classify(cancel, &error))?;
		let response: Response = response.dyn_into().map_err(|_| Error::Transport("fetch resolved to a non-Response value".to_owned()))?;
		if !response.ok() {
			return Err(Error::Transport(format!("HTTP {}", response.status())));
		}

		let body = JsFuture::from(response.text().map_err(|error| Error::Transport(js_error(&error)))?)
			.await
			.map_err(|error| classify(cancel, &error))?;
		body.as_string().ok_or_else(|| Error::Transport("response body is not text".to_owned()))
	}
}

/// An aborted fetch rejects with an `AbortError`; report it as the cancellation it is
/// rather than as a transport failure.
fn classify(cancel: &CancelToken, error: &wasm_bindgen::JsValue) -> Error {
	if cancel.is_cancelled() {
		Error::Cancelled
	} else {
		Error::Transport(js_error(error))
	}
}
