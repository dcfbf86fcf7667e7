//! Invocation processor
//!
//! Executes one handler invocation end to end: build a fresh context, run
//! the handler, resolve the terminal event, normalize the response and
//! drain the captured logs.

use funcstack_core::{HandlerError, LogLevel};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

use crate::context::{InvocationContext, DEFAULT_MAX_LOG_RECORDS};
use crate::event::Event;
use crate::invocation::{InvocationError, InvocationRecord, TerminalEvent};
use crate::response::{normalize, RawResult};

/// A user handler invoked once per event
pub trait Handler {
    /// Process the event. The handler may also log through the context and
    /// deliver its result via [`InvocationContext::deliver_result`] instead
    /// of returning it.
    fn handle(
        &self,
        ctx: &mut InvocationContext,
        event: &Event,
    ) -> Result<RawResult, HandlerError>;
}

/// Returns a new [`HandlerFn`] wrapping the given closure
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut InvocationContext, &Event) -> Result<RawResult, HandlerError>,
{
    HandlerFn { f }
}

/// A [`Handler`] implemented by a closure
#[derive(Clone, Copy, Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut InvocationContext, &Event) -> Result<RawResult, HandlerError>,
{
    fn handle(
        &self,
        ctx: &mut InvocationContext,
        event: &Event,
    ) -> Result<RawResult, HandlerError> {
        (self.f)(ctx, event)
    }
}

/// Processor configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Minimum level a record must have to enter the context sink
    pub log_level: LogLevel,
    /// Cap on captured records per invocation
    pub max_log_records: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Debug,
            max_log_records: DEFAULT_MAX_LOG_RECORDS,
        }
    }
}

/// Executes handler invocations.
///
/// Stateless across invocations; a single processor may be shared by any
/// number of concurrent invocations.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    config: ProcessorConfig,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Run one invocation end to end.
    ///
    /// Every outcome except a protocol violation produces a complete
    /// canonical response; handler errors and panics become error
    /// responses instead of propagating. Captured logs are returned in
    /// emission order regardless of the outcome.
    pub fn invoke<H: Handler + ?Sized>(&self, handler: &H, event: Event) -> InvocationRecord {
        let id = event.id().clone();
        let mut ctx = InvocationContext::new(id.clone())
            .with_capture_level(self.config.log_level)
            .with_max_log_records(self.config.max_log_records);

        debug!(
            invocation_id = %id,
            method = %event.method(),
            path = %event.path(),
            "Invoking handler"
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&mut ctx, &event)));
        let returned = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(invocation_id = %id, error = %message, "Handler panicked");
                Err(HandlerError::new(message))
            }
        };

        if let Some(violation) = ctx.take_violation() {
            error!(invocation_id = %id, "Handler delivered more than one result");
            let logs = ctx.drain_logs();
            return InvocationRecord {
                id,
                result: Err(InvocationError::DoubleResponse(violation)),
                logs,
                dropped_log_records: ctx.dropped_log_records(),
            };
        }

        // A result delivered through the context happened during handler
        // execution, so it precedes the handler's own return or failure.
        let terminal = match ctx.take_delivered_result() {
            Some(delivered) => TerminalEvent::Delivered(delivered),
            None => match returned {
                Ok(raw) => TerminalEvent::Returned(raw),
                Err(err) => TerminalEvent::Failed(err),
            },
        };

        let response = normalize(terminal);
        debug!(
            invocation_id = %id,
            status_code = response.status_code,
            "Invocation completed"
        );

        InvocationRecord {
            id,
            result: Ok(response),
            logs: ctx.drain_logs(),
            dropped_log_records: ctx.dropped_log_records(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
