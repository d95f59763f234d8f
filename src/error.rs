//! Error types for schema generation

use crate::writer::WriteReport;
use openapischema_crd::CrdError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the generator's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while fetching a manifest over HTTP
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be built
    #[error("failed to create request: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection or transport failure
    #[error("failed to execute request: {0}")]
    Request(#[source] reqwest::Error),

    /// Any response other than 200, carrying the status line (e.g. "404 Not Found")
    #[error("{0}")]
    Status(String),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Generator error types
#[derive(Error, Debug)]
pub enum Error {
    /// Local manifest path does not exist
    #[error("{} was not found", .0.display())]
    NotFound(PathBuf),

    /// Local manifest exists but could not be read
    #[error("failed to read file: {0}")]
    Read(#[source] std::io::Error),

    /// Remote manifest could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Decoding, extraction or serialization failure
    #[error(transparent)]
    Crd(#[from] CrdError),

    /// Relative output directory could not be resolved
    #[error("failed to get workdir for relative outputdir: {0}")]
    OutputDir(#[source] std::io::Error),

    /// One or more schema files could not be written
    #[error("{0}")]
    Write(WriteReport),

    /// Any of the above, prefixed with the CRD it happened on
    #[error("error on crd '{crd}': {source}")]
    Context {
        crd: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the CRD reference to an error
    pub fn context(self, crd: impl Into<String>) -> Self {
        Error::Context {
            crd: crd.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with any context wrapping removed
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Files written before the failure, if this is a write failure
    pub fn written_files(&self) -> &[PathBuf] {
        match self.root() {
            Error::Write(report) => &report.written,
            _ => &[],
        }
    }
}
