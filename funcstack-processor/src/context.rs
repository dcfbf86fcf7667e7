//! Per-invocation context
//!
//! Mediates all communication from handler code back to the host for
//! exactly one invocation: an ordered log sink and a write-once result
//! cell. The context is exclusively owned by the invocation that created
//! it, so no locking is involved.

use funcstack_core::{HandlerError, InvocationId, LogLevel, LogRecord};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::response::RawResult;

/// Default cap on captured log records per invocation
pub const DEFAULT_MAX_LOG_RECORDS: usize = 1024;

/// The result cell was written more than once
#[derive(Debug, Clone, Error)]
#[error("result already delivered for invocation {invocation_id}")]
pub struct DoubleResponseError {
    pub invocation_id: String,
}

impl From<DoubleResponseError> for HandlerError {
    fn from(err: DoubleResponseError) -> Self {
        Self::new(err.to_string())
    }
}

/// Context scoped to a single invocation
#[derive(Debug)]
pub struct InvocationContext {
    id: InvocationId,
    capture_level: LogLevel,
    max_log_records: usize,
    logs: Vec<LogRecord>,
    dropped_log_records: u64,
    result: Option<RawResult>,
    violation: Option<DoubleResponseError>,
}

impl InvocationContext {
    pub fn new(id: InvocationId) -> Self {
        Self {
            id,
            capture_level: LogLevel::Debug,
            max_log_records: DEFAULT_MAX_LOG_RECORDS,
            logs: Vec::new(),
            dropped_log_records: 0,
            result: None,
            violation: None,
        }
    }

    /// Minimum level a record must have to enter the sink
    pub fn with_capture_level(mut self, level: LogLevel) -> Self {
        self.capture_level = level;
        self
    }

    pub fn with_max_log_records(mut self, max: usize) -> Self {
        self.max_log_records = max;
        self
    }

    pub fn id(&self) -> &InvocationId {
        &self.id
    }

    /// Append a log record.
    ///
    /// Never fails toward handler code: records below the capture level are
    /// discarded, and records the sink cannot hold are dropped and counted.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push_record(LogRecord::new(level, message));
    }

    /// Append a log record with structured attributes
    pub fn log_with(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        attributes: Map<String, Value>,
    ) {
        self.push_record(LogRecord::new(level, message).with_attributes(attributes));
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn debug_with(&mut self, message: impl Into<String>, attributes: Map<String, Value>) {
        self.log_with(LogLevel::Debug, message, attributes);
    }

    pub fn info_with(&mut self, message: impl Into<String>, attributes: Map<String, Value>) {
        self.log_with(LogLevel::Info, message, attributes);
    }

    pub fn warn_with(&mut self, message: impl Into<String>, attributes: Map<String, Value>) {
        self.log_with(LogLevel::Warn, message, attributes);
    }

    pub fn error_with(&mut self, message: impl Into<String>, attributes: Map<String, Value>) {
        self.log_with(LogLevel::Error, message, attributes);
    }

    fn push_record(&mut self, record: LogRecord) {
        if record.level < self.capture_level {
            return;
        }
        if self.logs.len() >= self.max_log_records {
            if self.dropped_log_records == 0 {
                tracing::debug!(invocation_id = %self.id, "Log sink full, dropping records");
            }
            self.dropped_log_records += 1;
            return;
        }
        self.logs.push(record);
    }

    /// Deliver the invocation result without relying on the handler's
    /// return value. At most one delivery per invocation; a second write
    /// fails and marks the invocation as faulted.
    pub fn deliver_result(&mut self, result: RawResult) -> Result<(), DoubleResponseError> {
        if self.result.is_some() || self.violation.is_some() {
            let err = DoubleResponseError {
                invocation_id: self.id.to_string(),
            };
            self.violation = Some(err.clone());
            return Err(err);
        }
        self.result = Some(result);
        Ok(())
    }

    /// Take the delivered result, if any. Called by the host once the
    /// handler has finished.
    pub fn take_delivered_result(&mut self) -> Option<RawResult> {
        self.result.take()
    }

    /// Take the protocol violation, if one occurred during the invocation
    pub fn take_violation(&mut self) -> Option<DoubleResponseError> {
        self.violation.take()
    }

    /// Drain accumulated records in emission order, clearing the sink
    pub fn drain_logs(&mut self) -> Vec<LogRecord> {
        std::mem::take(&mut self.logs)
    }

    /// Number of records dropped because the sink could not hold them
    pub fn dropped_log_records(&self) -> u64 {
        self.dropped_log_records
    }
}
