//! Configuration for schema generation
//!
//! The core only ever sees a [`GeneratorConfig`] value. Binding flags and
//! environment variables to it is the CLI's job.

use std::path::{Path, PathBuf};


/// Prefix of every environment variable the CLI reads
pub const ENV_PREFIX: &str = "CRDTOOPENAPISCHEMA";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "./";

/// User-Agent sent when fetching a remote manifest
pub const DEFAULT_USER_AGENT: &str = "Replicated_CRDToOpenApiSchema/v1alpha1";

/// Environment variable name for a command-line option (`output-dir` -> `CRDTOOPENAPISCHEMA_OUTPUT_DIR`)
pub fn env_key(option: &str) -> String {
    format!("{ENV_PREFIX}_{}", option.replace('-', "_").to_uppercase())
}

/// Settings passed into the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Directory schema files are written to. Relative paths are resolved
    /// against the current working directory at generation time.
    pub output_dir: PathBuf,

    /// User-Agent header for remote manifests
    pub user_agent: String,
}

impl GeneratorConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
