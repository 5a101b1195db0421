use crate::templates::{TemplateKind, Version};

#[derive(Debug, thiserror::Error)]
pub enum CcdaError {
    #[error("no templates registered for {kind} at {version}")]
    UnregisteredTemplate { kind: TemplateKind, version: Version },
    #[error("unsupported C-CDA version '{0}' (expected R1.1, R2.0 or R2.1)")]
    UnsupportedVersion(String),
    #[error("unknown document variant '{0}'")]
    UnknownVariant(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("encounter file schema mismatch at {path}: {message}")]
    EncounterSchema { path: String, message: String },

    #[error("{record} is missing required {field}")]
    MissingRequiredData { record: String, field: &'static str },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text value: {0}")]
    Text(#[from] ccda_types::TextError),

    #[error("failed to write XML: {0}")]
    Serialization(String),
    #[error("serialized XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl CcdaError {
    /// Returns `true` for errors that indicate a programming or setup mistake (an
    /// unregistered template, an unknown variant or section kind, bad configuration) rather
    /// than a problem with one record's data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CcdaError::UnregisteredTemplate { .. }
                | CcdaError::UnsupportedVersion(_)
                | CcdaError::UnknownVariant(_)
                | CcdaError::InvalidConfig(_)
                | CcdaError::EncounterSchema { .. }
        )
    }
}

pub type CcdaResult<T> = std::result::Result<T, CcdaError>;
