//! Log record model
//!
//! Records emitted by handler code through the invocation context. The
//! attributes map is serialized under the key `with`, matching the record
//! shape the log-shipping layer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Log severity levels, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log record emitted during an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub datetime: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Structured attributes; values are opaque at this layer and may nest
    #[serde(rename = "with", default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            datetime: Utc::now(),
            level,
            message: message.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(LogLevel::from_str("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("fatal"), None);
    }

    #[test]
    fn test_record_serialization() {
        let mut attributes = Map::new();
        attributes.insert("source".to_string(), json!("rabbit"));
        attributes.insert("weight".to_string(), json!(7));

        let record = LogRecord::new(LogLevel::Error, "Error message").with_attributes(attributes);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["level"], "error");
        assert_eq!(value["message"], "Error message");
        assert_eq!(value["with"]["source"], "rabbit");
        assert_eq!(value["with"]["weight"], 7);
    }

    #[test]
    fn test_record_serialization_omits_empty_attributes() {
        let record = LogRecord::new(LogLevel::Info, "Info message");
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("with").is_none());
    }
}
