//! CRD to OpenAPI schema extraction
//!
//! Reads a Kubernetes CustomResourceDefinition from a local path or URL, pulls
//! out the OpenAPI v3 schema of every version that declares one and writes each
//! schema as an indented JSON file named the way schema validators look them up
//! (`{kind}-{version}-{group}.json`).

pub mod cli;
pub mod config;
pub mod error;
pub mod source;
pub mod utils;
pub mod writer;

pub use config::GeneratorConfig;
pub use error::{Error, FetchError, Result};
pub use openapischema_crd::{
    schema_filename, CrdDecoder, CrdError, CustomResourceDefinition, SchemaExtractor, SchemaSet,
};
pub use source::{CrdSource, LocalFile, RemoteUrl};
pub use writer::{SchemaWriter, WriteFailure, WriteReport};

use std::path::PathBuf;
use tracing::info;

/// Coordinates reading, decoding, extraction and writing for one CRD
pub struct Generator {
    config: GeneratorConfig,
    decoder: CrdDecoder,
    extractor: SchemaExtractor,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            decoder: CrdDecoder::new(),
            extractor: SchemaExtractor::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Extract the schemas of the CRD at `crd` (path or URL) and write them to
    /// the configured output directory. Returns the written files.
    pub async fn generate(&self, crd: &str) -> Result<Vec<PathBuf>> {
        let writer = SchemaWriter::new(self.config.output_dir())?;
        let schemas = self
            .generate_schemas(crd)
            .await?
            .into_result()
            .map_err(|e| Error::from(e).context(crd))?;

        info!(
            "Writing {} schema(s) to {}",
            schemas.len(),
            writer.output_dir().display()
        );
        writer.write_all(&schemas).into_result()
    }

    /// Extract the schemas of the CRD at `crd` without writing anything.
    ///
    /// The returned set maps output file names to indented JSON documents and
    /// also lists any schema that failed to serialize, so the successful ones
    /// are available even when some fail.
    pub async fn generate_schemas(&self, crd: &str) -> Result<SchemaSet> {
        self.extract(crd).await.map_err(|e| e.context(crd))
    }

    async fn extract(&self, crd: &str) -> Result<SchemaSet> {
        let source = source::resolve(crd, &self.config.user_agent);
        info!("Reading CRD from {}", source.location());
        let raw = source.read().await?;

        let definition = self.decoder.decode(&raw)?;
        info!(
            "Extracting schemas for {} ({})",
            definition.kind(),
            definition.group()
        );

        Ok(self.extractor.extract(&definition)?)
    }
}

/// Extract the schemas of `crd` into `output_dir` with the default settings
pub async fn generate(crd: &str, output_dir: impl Into<PathBuf>) -> Result<Vec<PathBuf>> {
    Generator::new(GeneratorConfig::new(output_dir))
        .generate(crd)
        .await
}
