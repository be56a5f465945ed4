use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a measurement session. All variants are fatal at
/// this scope; there are no retries.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed input table {path}: {reason}")]
    MalformedInput { path: PathBuf, reason: String },
    #[error("failed to open serial port {port}: {source}")]
    TransportOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("transport failed during {phase}: {source}")]
    TransportIo {
        phase: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write output table {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for SessionError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        SessionError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for SessionError {
    fn from(value: image::ImageError) -> Self {
        SessionError::Plot(value.to_string())
    }
}
