//! Errors raised while decoding a CRD manifest or extracting its schemas

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrdError {
    /// The manifest is not well-formed YAML
    #[error("failed to decode YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The manifest is well-formed but does not match the expected object shape
    #[error("failed to decode manifest: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The manifest contains no document at all
    #[error("manifest is empty")]
    Empty,

    /// The manifest declares a type other than the two known CRD layouts
    #[error("no kind \"{kind}\" is registered for version \"{api_version}\"")]
    UnsupportedType { api_version: String, kind: String },

    /// A field every CRD must carry is absent or empty
    #[error("CRD is missing required field {0}")]
    MissingField(&'static str),

    /// The CRD decoded fine but no version carries an OpenAPI schema
    #[error("no validation specified")]
    NoSchema,

    /// One or more schemas could not be marshalled to JSON
    #[error("failed to marshal schemas:\n{}", format_failures(.0))]
    Serialize(Vec<String>),
}

impl CrdError {
    /// Whether the manifest itself could not be decoded into a known CRD shape
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            CrdError::Yaml(_)
                | CrdError::Malformed(_)
                | CrdError::Empty
                | CrdError::UnsupportedType { .. }
                | CrdError::MissingField(_)
        )
    }
}

fn format_failures(failures: &[String]) -> String {
    failures
        .iter()
        .map(|failure| format!("\t{failure}"))
        .collect::<Vec<_>>()
        .join("\n")
}
