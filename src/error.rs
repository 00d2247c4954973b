use thiserror::Error;

/// Failures surfaced by collaborators and by signal construction.
///
/// None of these are fatal once the scheduler runs: callers log them and treat
/// the affected data point as unavailable.
#[derive(Debug, Error)]
pub enum Error {
    /// A provider returned an empty, malformed or error payload.
    #[error("Data unavailable ({source_name}): {reason}")]
    DataUnavailable { source_name: String, reason: String },

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Log write failed: {0}")]
    LogWrite(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid signal levels: {0}")]
    InvalidSignal(String),
}

impl Error {
    pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::DataUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// True for the signal-path failures that trigger a degraded-mode notice
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Error::DataUnavailable { .. } | Error::Http(_))
    }
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
