use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] stockpulse_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("no quotes returned for {requested} requested code(s)")]
    NoQuotes { requested: usize },

    #[error(transparent)]
    Cache(#[from] stockpulse_core::CacheError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::NoQuotes { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Cache(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_exit_with_two() {
        let error = CliError::Command(String::from("--limit must be greater than zero"));
        assert_eq!(error.exit_code(), 2);
        assert_eq!(CliError::NoQuotes { requested: 3 }.exit_code(), 3);
    }
}
