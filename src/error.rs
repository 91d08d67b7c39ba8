use thiserror::Error;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Failure to obtain one module's raw text from its source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("response is HTML, not delimited text (is the sheet published?)")]
    NotDelimited,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

impl SourceError {
    /// Transient failures are worth another attempt; client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Status(code) => *code == 429 || (500..600).contains(code),
            Self::NotDelimited | Self::Csv(_) => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Recoverable problems found while loading modules. None of these abort a
/// run; each one narrows what a single module contributes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadIssue {
    #[error("module '{module}': source unavailable ({reason})")]
    SourceUnavailable { module: String, reason: String },

    #[error("module '{module}': missing column '{column}', {effect}")]
    SchemaMissing {
        module: String,
        column: String,
        effect: &'static str,
    },

    #[error("module '{module}': {count} unparseable score(s), first was '{sample}'")]
    ScoreUnparseable {
        module: String,
        count: usize,
        sample: String,
    },
}
