//! Error types for the export engine

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a layout
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize a browser session
    #[error("Session initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load the rendered document
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// Failed to execute JavaScript in the page
    #[error("Script execution failed: {0}")]
    ScriptError(String),

    /// Failed to capture rendered output
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The plot runtime never signalled that it initialized
    #[error("Plot runtime was not loaded within {0}ms. Something may have gone wrong.")]
    RuntimeNotLoaded(u64),

    /// The captured screenshot decoded to an image with a zero dimension
    #[error("unable to save an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Screenshot bytes could not be decoded or encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}
