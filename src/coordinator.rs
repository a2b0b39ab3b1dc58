//! Fetch Coordinator: at most one in-flight fragment request per picker instance.
//!
//! Cancellation is advisory to the transport (the abort hook) and authoritative at the
//! application level: every continuation re-checks its [`CancelToken`] when it resumes
//! and short-circuits before touching shared state if it was superseded.

use crate::error::Error;
use async_trait::async_trait;
use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;
use tracing::{trace, warn};

/// The transport that actually performs the fragment GET.
///
/// Implementations should install an abort hook on `cancel` so a superseded request can
/// be torn down early; the coordinator treats the outcome of an aborted transport as
/// [`Error::Cancelled`] regardless of what the transport reports.
#[async_trait(?Send)]
pub trait FragmentTransport {
	async fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<String, Error>;
}

#[derive(Default)]
struct TokenInner {
	cancelled: Cell<bool>,
	abort: RefCell<Option<Box<dyn Fn()>>>,
}

/// Cancellation token bound to one request. Cloned into the transport; the coordinator
/// replaces it wholesale on every new request, so "is my token still current" is the
/// resumption guard.
#[derive(Clone, Default)]
pub struct CancelToken(Rc<TokenInner>);

impl CancelToken {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		if !self.0.cancelled.replace(true) {
			if let Some(abort) = &*self.0.abort.borrow() {
				abort();
			}
		}
	}

	#[must_use]
	pub fn is_cancelled(&self) -> bool {
		self.0.cancelled.get()
	}

	/// Installs the transport's abort hook. Runs the hook immediately if the token was
	/// cancelled before the transport got this far.
	pub fn on_cancel(&self, hook: impl Fn() + 'static) {
		if self.is_cancelled() {
			hook();
		} else {
			*self.0.abort.borrow_mut() = Some(Box::new(hook));
		}
	}

	fn same(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for CancelToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CancelToken").field("cancelled", &self.is_cancelled()).finish()
	}
}

/// The single in-flight request a picker owns at any time: a cancellable handle plus
/// its target URL.
#[derive(Debug)]
pub struct PendingRequest {
	url: String,
	token: CancelToken,
}

impl PendingRequest {
	#[must_use]
	pub fn url(&self) -> &str {
		&self.url
	}
}

/// Issues fragment requests and sequences overlapping ones.
#[derive(Debug)]
pub struct FetchCoordinator<T> {
	transport: T,
	pending: RefCell<Option<PendingRequest>>,
}

impl<T: FragmentTransport> FetchCoordinator<T> {
	pub fn new(transport: T) -> Self {
		Self {
			transport,
			pending: RefCell::new(None),
		}
	}

	/// Target URL of the request still in flight, if any.
	#[must_use]
	pub fn pending_target(&self) -> Option<String> {
		self.pending.borrow().as_ref().map(|pending| pending.url().to_owned())
	}

	#[must_use]
	pub fn is_requesting(&self) -> bool {
		self.pending.borrow().is_some()
	}

	/// Cancels any pending request, issues a new one and resolves to its body.
	///
	/// If a newer `update` begins before this one resolves, this one's result is
	/// discarded even when its response arrives later; the caller sees
	/// [`Error::Cancelled`] and must not mutate visible state.
	pub async fn update(&self, url: String, full_page: bool) -> Result<String, Error> {
		let token = CancelToken::new();
		trace!(%url, full_page, "issuing fragment request");
		let superseded = self.pending.borrow_mut().replace(PendingRequest {
			url: url.clone(),
			token: token.clone(),
		});
		if let Some(superseded) = superseded {
			trace!(url = %superseded.url, "cancelling superseded request");
			superseded.token.cancel();
		}

		let result = self.transport.fetch(&url, &token).await;

		// Resumption guard: only the most recent request's continuation may proceed.
		if token.is_cancelled() {
			trace!(%url, "discarding response of a superseded request");
			return Err(Error::Cancelled);
		}
		{
			let mut pending = self.pending.borrow_mut();
			if pending.as_ref().is_some_and(|current| current.token.same(&token)) {
				*pending = None;
			}
		}

		match result {
			Ok(body) => Ok(body),
			Err(error) => {
				warn!(%url, %error, "fragment request failed; keeping prior state");
				Err(error)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::channel::oneshot;
	use futures::executor::{block_on, LocalPool};
	use futures::task::LocalSpawnExt;

	/// Hands out scripted responses in call order and records each request's token.
	struct Scripted {
		responses: RefCell<Vec<oneshot::Receiver<Result<String, Error>>>>,
		tokens: RefCell<Vec<CancelToken>>,
	}

	impl Scripted {
		fn new(count: usize) -> (Rc<Self>, Vec<oneshot::Sender<Result<String, Error>>>) {
			let (senders, receivers) = (0..count).map(|_| oneshot::channel()).unzip::<_, _, Vec<_>, Vec<_>>();
			(
				Rc::new(Self {
					responses: RefCell::new(receivers.into_iter().rev().collect()),
					tokens: RefCell::new(Vec::new()),
				}),
				senders,
			)
		}
	}

	#[async_trait(?Send)]
	impl FragmentTransport for Rc<Scripted> {
		async fn fetch(&self, _url: &str, cancel: &CancelToken) -> Result<String, Error> {
			self.tokens.borrow_mut().push(cancel.clone());
			let receiver = self.responses.borrow_mut().pop().expect("unscripted fetch");
			receiver.await.unwrap_or(Err(Error::Cancelled))
		}
	}

	#[test]
	fn resolves_a_single_update() {
		let (transport, mut senders) = Scripted::new(1);
		let coordinator = FetchCoordinator::new(Rc::clone(&transport));
		senders.remove(0).send(Ok("<html>".to_owned())).unwrap();
		let body = block_on(coordinator.update("/p?option_values=a".to_owned(), false)).unwrap();
		assert_eq!(body, "<html>");
		assert!(!coordinator.is_requesting());
	}

	#[test]
	fn a_newer_update_supersedes_the_pending_one() {
		let (transport, mut senders) = Scripted::new(2);
		let coordinator = Rc::new(FetchCoordinator::new(Rc::clone(&transport)));
		let mut pool = LocalPool::new();
		let spawner = pool.spawner();

		let first = Rc::new(RefCell::new(None));
		{
			let coordinator = Rc::clone(&coordinator);
			let first = Rc::clone(&first);
			spawner
				.spawn_local(async move {
					*first.borrow_mut() = Some(coordinator.update("/p?option_values=L".to_owned(), false).await);
				})
				.unwrap();
		}
		pool.run_until_stalled();
		assert_eq!(coordinator.pending_target().as_deref(), Some("/p?option_values=L"));

		let second = Rc::new(RefCell::new(None));
		{
			let coordinator = Rc::clone(&coordinator);
			let second = Rc::clone(&second);
			spawner
				.spawn_local(async move {
					*second.borrow_mut() = Some(coordinator.update("/p?option_values=XL".to_owned(), false).await);
				})
				.unwrap();
		}
		pool.run_until_stalled();

		// The first request's token was cancelled the moment the second arrived.
		assert!(transport.tokens.borrow()[0].is_cancelled());

		// Resolve out of order: newest first, the superseded one later.
		let late = senders.remove(0);
		senders.remove(0).send(Ok("XL body".to_owned())).unwrap();
		pool.run_until_stalled();
		late.send(Ok("L body".to_owned())).unwrap();
		pool.run_until_stalled();

		assert!(matches!(&*first.borrow(), Some(Err(Error::Cancelled))));
		assert!(matches!(&*second.borrow(), Some(Ok(body)) if body == "XL body"));
		assert!(!coordinator.is_requesting());
	}

	#[test]
	fn transport_failures_leave_idle_state() {
		let (transport, mut senders) = Scripted::new(1);
		let coordinator = FetchCoordinator::new(Rc::clone(&transport));
		senders.remove(0).send(Err(Error::Transport("HTTP 500".to_owned()))).unwrap();
		let result = block_on(coordinator.update("/p".to_owned(), false));
		assert!(matches!(result, Err(Error::Transport(_))));
		assert!(!coordinator.is_requesting());
	}

	#[test]
	fn abort_hooks_fire_even_when_installed_late() {
		let token = CancelToken::new();
		token.cancel();
		let fired = Rc::new(Cell::new(false));
		let observed = Rc::clone(&fired);
		token.on_cancel(move || observed.set(true));
		assert!(fired.get());
	}
}
