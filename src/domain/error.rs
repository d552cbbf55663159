//! Domain error types and their process exit codes.

use super::symbol_table::TableFull;

/// Top-level error type for stockfolio.
#[derive(Debug, thiserror::Error)]
pub enum StockfolioError {
    #[error("symbol {symbol} not found in {store}")]
    NotFound { symbol: String, store: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("cannot sell {requested} {symbol}: only {held} held")]
    InsufficientHoldings {
        symbol: String,
        requested: u32,
        held: u32,
    },

    #[error(transparent)]
    Full(#[from] TableFull),

    #[error("failed to persist {target}: {reason}")]
    Persistence { target: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockfolioError> for std::process::ExitCode {
    fn from(err: &StockfolioError) -> Self {
        let code: u8 = match err {
            StockfolioError::Io(_) => 1,
            StockfolioError::ConfigParse { .. } | StockfolioError::ConfigInvalid { .. } => 2,
            StockfolioError::Persistence { .. } => 3,
            StockfolioError::InvalidInput { .. } => 4,
            StockfolioError::NotFound { .. }
            | StockfolioError::InsufficientHoldings { .. }
            | StockfolioError::Full(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
