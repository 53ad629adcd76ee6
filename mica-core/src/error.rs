/// Error types for the dashboard core
use thiserror::Error;

/// Main error type for dashboard operations
#[derive(Error, Debug)]
pub enum DashboardError {
    /// HTTP request could not be sent or completed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("Server returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No data layer with that name exists
    #[error("Unknown data layer: {0}")]
    UnknownLayer(String),

    /// Requested page lies outside the known page window
    #[error("Page {requested} is outside 1..={last}")]
    PageOutOfRange { requested: u32, last: u32 },

    /// Geometry document could not be interpreted
    #[error("Invalid geometry: {0}")]
    Geometry(String),
}

#[cfg(feature = "api")]
impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Http(err.to_string())
    }
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
