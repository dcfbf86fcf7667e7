//! Core types for FuncStack
//!
//! This crate provides the types shared between the FuncStack processor and
//! any embedding host: invocation ids, the handler-facing error type, and
//! the log record model.

pub mod error;
pub mod invocation_id;
pub mod logs;

pub use error::HandlerError;
pub use invocation_id::InvocationId;
pub use logs::{LogLevel, LogRecord};
