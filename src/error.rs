use thiserror::Error;

/// Failure taxonomy of one pipeline invocation.
///
/// None of these escape the invocation that produced them: the picker's visible state is
/// only ever mutated by a run that completed without error, so the shopper keeps seeing
/// the previously applied variant on any failure.
#[derive(Debug, Error)]
pub enum Error {
	/// A referenced control, option or region is absent. Indicates a markup/state
	/// mismatch; the operation aborts.
	#[error("no control or region matches {0:?}")]
	NotFound(String),

	/// The request was superseded by a newer selection. Recoverable and silent by
	/// design: diagnostics stay at trace level and nothing user-visible happens.
	#[error("request superseded by a newer selection")]
	Cancelled,

	/// Network or HTTP failure. Logged; the prior state is retained and no retry is
	/// attempted.
	#[error("fragment request failed: {0}")]
	Transport(String),

	/// The structured variant payload is absent or unparseable.
	#[error("variant payload missing or malformed: {0}")]
	MalformedPayload(String),

	/// The current or fetched document lacks the region a merge needs.
	#[error("document lacks the {0} region")]
	MissingRegion(&'static str),
}

impl Error {
	/// `true` for failures that are silent by design.
	#[must_use]
	pub fn is_cancellation(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}
