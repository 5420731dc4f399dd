//! Error taxonomy (§7) and the per-instance error/message log.
//!
//! The engine's query surface never panics and never returns `Err`: invalid
//! input yields a documented sentinel (NaN, -1, an empty interval, ...) and
//! a message is appended to the caller's [`ErrorLog`]. `DaidalusError` is
//! the payload of those messages and is also the `Err` type of the small
//! set of operations that are genuinely fallible: parameter setters and
//! config file I/O.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DaidalusError {
    #[error("aircraft index {0} is invalid")]
    InvalidAircraftIndex(isize),
    #[error("aircraft states use inconsistent position frames")]
    InvalidFrame,
    #[error("non-finite numeric input in field `{0}`")]
    NonFiniteInput(&'static str),
    #[error("parameter `{key}` rejected: {reason}")]
    InvalidParameter { key: String, reason: String },
    #[error("no horizontal solution for the requested conflict geometry")]
    NoHorizontalSolution,
    #[error("no vertical solution for the requested conflict geometry")]
    NoVerticalSolution,
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Severity a logged message was raised at. Mirrors the distinction in §7
/// between silently-recoverable conditions and ones worth surfacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMessage {
    pub severity: Severity,
    pub error: DaidalusError,
}

/// A per-instance, append-only error/message log. There is no process-wide
/// mutable state: every [`crate::coordinator::Daidalus`] owns one.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    messages: Vec<LoggedMessage>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, error: DaidalusError) {
        log::warn!("{error}");
        self.messages.push(LoggedMessage {
            severity: Severity::Warning,
            error,
        });
    }

    pub fn error(&mut self, error: DaidalusError) {
        log::error!("{error}");
        self.messages.push(LoggedMessage {
            severity: Severity::Error,
            error,
        });
    }

    pub fn has_message(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    pub fn messages(&self) -> &[LoggedMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_tracks_errors_and_warnings_separately() {
        let mut log = ErrorLog::new();
        assert!(!log.has_message());
        log.warn(DaidalusError::NoHorizontalSolution);
        assert!(log.has_message());
        assert!(!log.has_error());
        log.error(DaidalusError::InvalidFrame);
        assert!(log.has_error());
        assert_eq!(log.messages().len(), 2);
    }
}
