use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZenithError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unable to parse TOML configuration: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Unable to serialize TOML configuration: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),

    #[error("CSV log error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Result logger is stopped")]
    LoggerStopped,

    #[error("Background worker panicked: {0}")]
    WorkerPanicked(String),
}

impl PartialEq for ZenithError {
    fn eq(&self, other: &Self) -> bool {
        use ZenithError::*;
        match (self, other) {
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (LocationUnavailable(a), LocationUnavailable(b)) => a == b,
            (CatalogUnavailable(a), CatalogUnavailable(b)) => a == b,
            (WorkerPanicked(a), WorkerPanicked(b)) => a == b,

            // Wrapped library errors are not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (ConfigParseError(_), ConfigParseError(_)) => true,
            (ConfigSerializeError(_), ConfigSerializeError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (LoggerStopped, LoggerStopped) => true,

            _ => false,
        }
    }
}
