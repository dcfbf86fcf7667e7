//! Invocation outcomes

use funcstack_core::{HandlerError, InvocationId, LogRecord};
use thiserror::Error;

use crate::context::DoubleResponseError;
use crate::response::{CanonicalResponse, RawResult};

/// Fatal invocation errors surfaced to the host
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("handler delivered more than one result: {0}")]
    DoubleResponse(#[from] DoubleResponseError),
}

/// The first of {return, raised error, delivered result} observed for an
/// invocation; determines the invocation's outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalEvent {
    /// The handler returned a value
    Returned(RawResult),
    /// The handler delivered its result through the context; takes
    /// precedence over a returned value
    Delivered(RawResult),
    /// The handler raised an error
    Failed(HandlerError),
}

/// Outcome of one complete invocation
#[derive(Debug)]
pub struct InvocationRecord {
    pub id: InvocationId,
    /// `Err` only on protocol violations; every other outcome, including
    /// handler errors and malformed results, carries a complete response.
    pub result: Result<CanonicalResponse, InvocationError>,
    /// Records captured up to the terminal event, in emission order
    pub logs: Vec<LogRecord>,
    pub dropped_log_records: u64,
}
