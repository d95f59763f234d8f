//! Schema file writer

use crate::error::{Error, Result};
use crate::utils;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A schema file that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of writing a set of schema files. Every file is attempted, so both
/// lists can be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files written successfully, in the order they were attempted
    pub written: Vec<PathBuf>,

    /// Files that failed, with the reason
    pub failures: Vec<WriteFailure>,
}

impl WriteReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Written files, or a single error listing every failed file
    pub fn into_result(self) -> Result<Vec<PathBuf>> {
        if self.is_success() {
            Ok(self.written)
        } else {
            Err(Error::Write(self))
        }
    }
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to write following files:")?;
        for failure in &self.failures {
            write!(f, "\n\t{}: {}", failure.path.display(), failure.message)?;
        }
        Ok(())
    }
}

/// Writes serialized schemas below an output directory
pub struct SchemaWriter {
    output_dir: PathBuf,
}

impl SchemaWriter {
    /// Create a writer for `output_dir`, resolved against the working directory if relative
    pub fn new(output_dir: &Path) -> Result<Self> {
        let output_dir = utils::absolute_path(output_dir).map_err(Error::OutputDir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every schema, replacing existing files. Failures do not stop the
    /// remaining writes.
    pub fn write_all(&self, schemas: &BTreeMap<String, Vec<u8>>) -> WriteReport {
        let mut report = WriteReport::default();

        for (name, contents) in schemas {
            let path = self.output_dir.join(name);
            match self.write_file(&path, contents) {
                Ok(()) => {
                    debug!("Wrote {}", path.display());
                    report.written.push(path);
                }
                Err(message) => {
                    warn!("Failed to write {}: {}", path.display(), message);
                    report.failures.push(WriteFailure { path, message });
                }
            }
        }

        report
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> std::result::Result<(), String> {
        utils::remove_existing_file(path).map_err(|e| format!("failed to remove file: {e}"))?;

        if let Some(parent) = path.parent() {
            utils::ensure_directory(parent).map_err(|e| format!("failed to mkdir: {e}"))?;
        }

        write_contents(path, contents).map_err(|e| format!("failed to write file: {e}"))
    }
}

fn write_contents(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()
}
