use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Errors originating from the core fepbar library.
    #[error("Analysis error: {0}")]
    Analysis(#[from] fepbar::FepBarError),

    /// I/O errors associated with a specific file path.
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not tied to a specific file.
    #[error("I/O error: {0}")]
    GenericIo(#[from] std::io::Error),

    /// Errors serialising the profile to JSON.
    #[error("Failed to serialise profile as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Histogram output requested without a bin count.
    #[error("--histograms requires --bins to set the number of bins per window")]
    HistogramsWithoutBins,
}
