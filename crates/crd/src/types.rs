//! CRD types and data structures
//!
//! Only the fields needed to locate the OpenAPI schemas are modelled. Everything
//! else in the manifest is ignored during deserialization.

use serde::Deserialize;
use serde_json::Value;

/// Kind shared by both supported CRD layouts
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// apiVersion of the stable layout (per-version schemas)
pub const STABLE_API_VERSION: &str = "apiextensions.k8s.io/v1";

/// apiVersion of the legacy layout (one schema for the single version)
pub const LEGACY_API_VERSION: &str = "apiextensions.k8s.io/v1beta1";

/// The `apiVersion`/`kind` header every Kubernetes manifest starts with
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,
}

/// Subset of `metadata` that is useful in log output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: Option<String>,
}

/// Resource names (`spec.names`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrdNames {
    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub plural: Option<String>,
}

/// Wrapper around the embedded schema (`schema` in v1, `validation` in v1beta1)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomResourceValidation {
    #[serde(rename = "openAPIV3Schema", default)]
    pub open_api_v3_schema: Option<Value>,
}

/// A version entry of a stable CRD
#[derive(Debug, Clone, Deserialize)]
pub struct CrdVersion {
    pub name: String,

    #[serde(default)]
    pub schema: Option<CustomResourceValidation>,
}

impl CrdVersion {
    /// OpenAPI schema declared for this version, if any
    pub fn open_api_schema(&self) -> Option<&Value> {
        self.schema
            .as_ref()
            .and_then(|validation| validation.open_api_v3_schema.as_ref())
    }
}

/// `apiextensions.k8s.io/v1` CustomResourceDefinition
#[derive(Debug, Clone, Deserialize)]
pub struct StableCrd {
    #[serde(default)]
    pub metadata: ObjectMeta,

    pub spec: StableCrdSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StableCrdSpec {
    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub names: CrdNames,

    #[serde(default)]
    pub versions: Vec<CrdVersion>,
}

/// Name-only version entry of a legacy CRD
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyVersionName {
    pub name: String,
}

/// `apiextensions.k8s.io/v1beta1` CustomResourceDefinition
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyCrd {
    #[serde(default)]
    pub metadata: ObjectMeta,

    pub spec: LegacyCrdSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyCrdSpec {
    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub names: CrdNames,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub versions: Vec<LegacyVersionName>,

    #[serde(default)]
    pub validation: Option<CustomResourceValidation>,
}

impl LegacyCrd {
    /// The single served version. Falls back to the first `versions` entry when
    /// `spec.version` is not set, the same way the API server defaults it.
    pub fn version(&self) -> Option<&str> {
        self.spec
            .version
            .as_deref()
            .filter(|version| !version.is_empty())
            .or_else(|| self.spec.versions.first().map(|v| v.name.as_str()))
    }

    /// OpenAPI schema shared by the single version, if any
    pub fn open_api_schema(&self) -> Option<&Value> {
        self.spec
            .validation
            .as_ref()
            .and_then(|validation| validation.open_api_v3_schema.as_ref())
    }
}

/// A decoded CRD in one of the two known layouts
#[derive(Debug, Clone)]
pub enum CustomResourceDefinition {
    Stable(StableCrd),
    Legacy(LegacyCrd),
}

impl CustomResourceDefinition {
    /// API group (`spec.group`)
    pub fn group(&self) -> &str {
        match self {
            CustomResourceDefinition::Stable(crd) => &crd.spec.group,
            CustomResourceDefinition::Legacy(crd) => &crd.spec.group,
        }
    }

    /// Resource kind (`spec.names.kind`)
    pub fn kind(&self) -> &str {
        match self {
            CustomResourceDefinition::Stable(crd) => &crd.spec.names.kind,
            CustomResourceDefinition::Legacy(crd) => &crd.spec.names.kind,
        }
    }

    /// CRD object name (`metadata.name`)
    pub fn name(&self) -> Option<&str> {
        match self {
            CustomResourceDefinition::Stable(crd) => crd.metadata.name.as_deref(),
            CustomResourceDefinition::Legacy(crd) => crd.metadata.name.as_deref(),
        }
    }

    /// apiVersion of the manifest layout this CRD was decoded from
    pub fn api_version(&self) -> &'static str {
        match self {
            CustomResourceDefinition::Stable(_) => STABLE_API_VERSION,
            CustomResourceDefinition::Legacy(_) => LEGACY_API_VERSION,
        }
    }
}
