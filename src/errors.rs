use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Chain query error: {0}")]
    ChainQuery(String),

    #[error("Transaction {digest} rejected: {reason}")]
    TransactionRejected { digest: String, reason: String },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Swap output too small: {0}")]
    SwapShortfall(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<bigdecimal::ParseBigDecimalError> for AppError {
    fn from(e: bigdecimal::ParseBigDecimalError) -> Self {
        AppError::Parse(e.to_string())
    }
}
