//! CRD decoder implementation

use crate::error::CrdError;
use crate::types::{
    CustomResourceDefinition, LegacyCrd, StableCrd, TypeMeta, CRD_KIND, LEGACY_API_VERSION,
    STABLE_API_VERSION,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Serialization format of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    /// Guess the format from the first non-whitespace byte
    pub fn detect(raw: &[u8]) -> Self {
        match raw.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => ManifestFormat::Json,
            _ => ManifestFormat::Yaml,
        }
    }
}

/// Decodes raw manifest bytes into one of the known CRD layouts
pub struct CrdDecoder;

impl Default for CrdDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CrdDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a YAML or JSON manifest into a typed CRD
    pub fn decode(&self, raw: &[u8]) -> Result<CustomResourceDefinition, CrdError> {
        let format = ManifestFormat::detect(raw);
        debug!("Decoding {} byte manifest as {:?}", raw.len(), format);

        let document = match format {
            ManifestFormat::Json => serde_json::from_slice::<Value>(raw)?,
            ManifestFormat::Yaml => self.first_yaml_document(raw)?,
        };

        let crd = self.decode_document(document)?;
        self.validate(&crd)?;

        debug!(
            "Decoded {} {} (group {}, kind {})",
            crd.api_version(),
            crd.name().unwrap_or("<unnamed>"),
            crd.group(),
            crd.kind()
        );
        Ok(crd)
    }

    /// Pick the first non-empty document of a (possibly multi-document) YAML stream.
    /// Merge keys (`<<: *anchor`) are resolved; later documents are only counted.
    fn first_yaml_document(&self, raw: &[u8]) -> Result<Value, CrdError> {
        let mut documents = serde_yaml::Deserializer::from_slice(raw);
        let mut first = None;

        for document in documents.by_ref() {
            let mut value = serde_yaml::Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            value.apply_merge()?;
            first = Some(serde_yaml::from_value::<Value>(value)?);
            break;
        }

        let first = first.ok_or(CrdError::Empty)?;

        let ignored = documents
            .map(serde_yaml::Value::deserialize)
            .filter(|value| value.as_ref().map_or(true, |value| !value.is_null()))
            .count();
        if ignored > 0 {
            warn!(
                "Manifest contains {} more document(s), only the first one is used",
                ignored
            );
        }

        Ok(first)
    }

    /// Dispatch on the declared apiVersion/kind
    fn decode_document(&self, document: Value) -> Result<CustomResourceDefinition, CrdError> {
        let meta = TypeMeta::deserialize(&document)?;

        match (meta.api_version.as_str(), meta.kind.as_str()) {
            (STABLE_API_VERSION, CRD_KIND) => Ok(CustomResourceDefinition::Stable(
                serde_json::from_value::<StableCrd>(document)?,
            )),
            (LEGACY_API_VERSION, CRD_KIND) => Ok(CustomResourceDefinition::Legacy(
                serde_json::from_value::<LegacyCrd>(document)?,
            )),
            _ => Err(CrdError::UnsupportedType {
                api_version: meta.api_version,
                kind: meta.kind,
            }),
        }
    }

    fn validate(&self, crd: &CustomResourceDefinition) -> Result<(), CrdError> {
        if crd.group().is_empty() {
            return Err(CrdError::MissingField("spec.group"));
        }
        if crd.kind().is_empty() {
            return Err(CrdError::MissingField("spec.names.kind"));
        }
        if let CustomResourceDefinition::Legacy(legacy) = crd {
            if legacy.version().is_none() {
                return Err(CrdError::MissingField("spec.version"));
            }
        }
        Ok(())
    }
}
