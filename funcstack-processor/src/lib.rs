//! Invocation processing engine for FuncStack
//!
//! Runs user handlers against inbound events and normalizes whatever they
//! produce (a return value, a result delivered through the invocation
//! context, or a raised error) into one canonical wire response, capturing
//! the handler's log records along the way.

pub mod context;
pub mod event;
pub mod invocation;
pub mod processor;
pub mod response;

pub use context::{DoubleResponseError, InvocationContext};
pub use event::Event;
pub use invocation::{InvocationError, InvocationRecord, TerminalEvent};
pub use processor::{handler_fn, Handler, HandlerFn, Processor, ProcessorConfig};
pub use response::{
    normalize, CanonicalResponse, MalformedResultError, RawResult, Response, ResponseBody,
};
