//! Domain error types.

/// Top-level error type for stratscan.
#[derive(Debug, thiserror::Error)]
pub enum StratscanError {
    #[error("insufficient data for {strategy}: have {bars} bars, need {minimum}")]
    InsufficientData {
        strategy: String,
        bars: usize,
        minimum: usize,
    },

    #[error("no viable strategy for {instrument}: all {skipped} candidates failed")]
    NoViableStrategy { instrument: String, skipped: usize },

    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    #[error("no data for {instrument}")]
    NoData { instrument: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("scan deadline exceeded before instrument started")]
    DeadlineExceeded,

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratscanError> for std::process::ExitCode {
    fn from(err: &StratscanError) -> Self {
        let code: u8 = match err {
            StratscanError::Io(_)
            | StratscanError::Report { .. }
            | StratscanError::DeadlineExceeded => 1,
            StratscanError::ConfigParse { .. }
            | StratscanError::ConfigMissing { .. }
            | StratscanError::ConfigInvalid { .. } => 2,
            StratscanError::UnknownStrategy { .. } => 4,
            StratscanError::InsufficientData { .. }
            | StratscanError::NoViableStrategy { .. }
            | StratscanError::MalformedBar { .. }
            | StratscanError::NoData { .. }
            | StratscanError::DataSource { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
