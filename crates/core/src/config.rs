//! Assembly configuration.
//!
//! Resolved once at process startup and then passed into the assembler. The library never
//! reads environment variables itself; the binary reads them and hands the raw values to the
//! pure parsing helpers below.

use crate::constants::{
    DEFAULT_CONFIDENTIALITY_CODE, DEFAULT_DOCUMENT_ID_ROOT, DEFAULT_LANGUAGE_CODE,
};
use crate::error::{CcdaError, CcdaResult};
use crate::records::PersistentId;
use crate::templates::Version;
use ccda_types::Oid;

/// Document-wide settings that do not come from the records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyConfig {
    version: Version,
    language_code: String,
    confidentiality_code: String,
    document_id_root: Oid,
}

impl AssemblyConfig {
    pub fn new(
        version: Version,
        language_code: String,
        confidentiality_code: String,
        document_id_root: Oid,
    ) -> CcdaResult<Self> {
        if language_code.trim().is_empty() {
            return Err(CcdaError::InvalidConfig(
                "language_code cannot be empty".into(),
            ));
        }
        if !matches!(confidentiality_code.as_str(), "N" | "R" | "V") {
            return Err(CcdaError::InvalidConfig(format!(
                "confidentiality_code must be N, R or V (got '{confidentiality_code}')"
            )));
        }

        Ok(Self {
            version,
            language_code,
            confidentiality_code,
            document_id_root,
        })
    }

    /// Defaults for everything except the version.
    pub fn for_version(version: Version) -> CcdaResult<Self> {
        Self::new(
            version,
            DEFAULT_LANGUAGE_CODE.into(),
            DEFAULT_CONFIDENTIALITY_CODE.into(),
            Oid::parse(DEFAULT_DOCUMENT_ID_ROOT)?,
        )
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn confidentiality_code(&self) -> &str {
        &self.confidentiality_code
    }

    pub fn document_id_root(&self) -> &Oid {
        &self.document_id_root
    }

    /// Copy of this configuration targeting another release.
    pub fn with_version(&self, version: Version) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    /// Fresh document id under the configured root, with a random UUID extension.
    pub fn generate_document_id(&self) -> PersistentId {
        PersistentId::new(
            self.document_id_root.as_str(),
            Some(uuid::Uuid::new_v4().to_string()),
        )
    }
}

/// Parse the configured release, defaulting to [`Version::LATEST`] when unset or blank.
pub fn version_from_env_value(value: Option<String>) -> CcdaResult<Version> {
    match value {
        Some(raw) if !raw.trim().is_empty() => raw.parse(),
        _ => Ok(Version::LATEST),
    }
}

/// Parse the document id root, defaulting to an example root when unset or blank.
pub fn document_id_root_from_env_value(value: Option<String>) -> CcdaResult<Oid> {
    let raw = match value {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => DEFAULT_DOCUMENT_ID_ROOT.to_string(),
    };
    Oid::parse(raw.trim()).map_err(|err| {
        CcdaError::InvalidConfig(format!("document id root '{raw}' is not a valid OID: {err}"))
    })
}

/// Language code, defaulting to `en-US` when unset or blank.
pub fn language_code_from_env_value(value: Option<String>) -> String {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string())
}
