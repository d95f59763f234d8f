//! Schema extraction and output file naming

use crate::error::CrdError;
use crate::types::CustomResourceDefinition;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Compute the schema file name for a kind and a `group/version` string.
///
/// Schema validators look files up as `{kind}-{version}-{group}.json`, or
/// `{kind}-{version}.json` when there is no group, so this must stay in sync
/// with that convention.
pub fn schema_filename(kind: &str, group_version: &str) -> String {
    let (group, version) = match group_version.split_once('/') {
        Some((group, version)) => (Some(group), version),
        None => (None, group_version),
    };

    let version_head = version.split('.').next().unwrap_or_default();
    let mut kind_suffix = format!("-{}", version_head.to_lowercase());
    if let Some(group) = group {
        kind_suffix.push('-');
        kind_suffix.push_str(&group.to_lowercase());
    }

    format!("{}{kind_suffix}.json", kind.to_lowercase())
}

/// Serialized schemas keyed by output file name, along with the schemas that
/// failed to serialize
#[derive(Debug, Default)]
pub struct SchemaSet {
    schemas: BTreeMap<String, Vec<u8>>,
    failures: Vec<String>,
}

impl SchemaSet {
    /// Successfully serialized schemas
    pub fn schemas(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.schemas
    }

    /// One message per schema that could not be serialized
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Split into the serialized schemas and the failure messages
    pub fn into_parts(self) -> (BTreeMap<String, Vec<u8>>, Vec<String>) {
        (self.schemas, self.failures)
    }

    /// All schemas, or a single error naming every schema that failed
    pub fn into_result(self) -> Result<BTreeMap<String, Vec<u8>>, CrdError> {
        if self.failures.is_empty() {
            Ok(self.schemas)
        } else {
            Err(CrdError::Serialize(self.failures))
        }
    }
}

/// Serialize each schema as indented JSON. A failing schema is recorded and
/// the rest are still serialized.
fn marshal<'a, S>(schemas: impl IntoIterator<Item = (String, &'a S)>) -> SchemaSet
where
    S: Serialize + ?Sized + 'a,
{
    let mut set = SchemaSet::default();
    for (name, schema) in schemas {
        match serde_json::to_vec_pretty(schema) {
            Ok(bytes) => {
                debug!("Serialized schema {} ({} bytes)", name, bytes.len());
                set.schemas.insert(name, bytes);
            }
            Err(e) => set
                .failures
                .push(format!("failed to marshal schema {name}: {e}")),
        }
    }
    set
}

/// Pulls the OpenAPI schemas out of a decoded CRD
pub struct SchemaExtractor;

impl Default for SchemaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every declared schema and serialize it as indented JSON
    pub fn extract(&self, crd: &CustomResourceDefinition) -> Result<SchemaSet, CrdError> {
        let schemas = self.collect(crd);
        if schemas.is_empty() {
            return Err(CrdError::NoSchema);
        }

        Ok(marshal(schemas))
    }

    /// File name and schema for each version that declares one, in declaration order
    fn collect<'a>(&self, crd: &'a CustomResourceDefinition) -> Vec<(String, &'a Value)> {
        let kind = crd.kind();
        let group = crd.group();

        match crd {
            CustomResourceDefinition::Stable(stable) => stable
                .spec
                .versions
                .iter()
                .filter_map(|version| match version.open_api_schema() {
                    Some(schema) => Some((
                        schema_filename(kind, &format!("{group}/{}", version.name)),
                        schema,
                    )),
                    None => {
                        debug!("Version {} of {} has no schema, skipping", version.name, kind);
                        None
                    }
                })
                .collect(),
            CustomResourceDefinition::Legacy(legacy) => {
                match (legacy.version(), legacy.open_api_schema()) {
                    (Some(version), Some(schema)) => vec![(
                        schema_filename(kind, &format!("{group}/{version}")),
                        schema,
                    )],
                    _ => Vec::new(),
                }
            }
        }
    }
}
