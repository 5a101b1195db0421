//! Document variants as data.
//!
//! A variant only overrides the document-type code, appends template identifiers to the US
//! Realm Header list and adds header blocks. Everything else is shared by the single
//! assembler in [`super`].

use crate::error::CcdaError;
use crate::templates::{
    TemplateSpec, CCD_DOCUMENT, DISCHARGE_SUMMARY_DOCUMENT, PROGRESS_NOTE_DOCUMENT,
};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentVariant {
    /// US Realm Header only.
    Generic,
    ContinuityOfCare,
    DischargeSummary,
    ProgressNote,
}

impl DocumentVariant {
    pub const ALL: [DocumentVariant; 4] = [
        DocumentVariant::Generic,
        DocumentVariant::ContinuityOfCare,
        DocumentVariant::DischargeSummary,
        DocumentVariant::ProgressNote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentVariant::Generic => "generic",
            DocumentVariant::ContinuityOfCare => "ccd",
            DocumentVariant::DischargeSummary => "discharge_summary",
            DocumentVariant::ProgressNote => "progress_note",
        }
    }

    pub fn profile(self) -> &'static VariantProfile {
        match self {
            DocumentVariant::Generic => &GENERIC,
            DocumentVariant::ContinuityOfCare => &CONTINUITY_OF_CARE,
            DocumentVariant::DischargeSummary => &DISCHARGE_SUMMARY,
            DocumentVariant::ProgressNote => &PROGRESS_NOTE,
        }
    }
}

impl fmt::Display for DocumentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentVariant {
    type Err = CcdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match folded.as_str() {
            "generic" | "us_realm_header" => Ok(DocumentVariant::Generic),
            "ccd" | "continuity_of_care" => Ok(DocumentVariant::ContinuityOfCare),
            "discharge_summary" | "discharge" => Ok(DocumentVariant::DischargeSummary),
            "progress_note" | "progress" => Ok(DocumentVariant::ProgressNote),
            _ => Err(CcdaError::UnknownVariant(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for DocumentVariant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Header blocks a variant adds after `legalAuthenticator`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderBlock {
    /// `documentationOf/serviceEvent` spanning admission to discharge.
    ServiceEvent,
}

/// Everything that distinguishes one variant from another.
#[derive(Debug)]
pub struct VariantProfile {
    /// LOINC document-type code.
    pub code: &'static str,
    pub display: &'static str,
    pub(crate) extra_templates: &'static [TemplateSpec],
    pub extra_header_blocks: &'static [HeaderBlock],
}

static GENERIC: VariantProfile = VariantProfile {
    code: "51855-5",
    display: "Patient Note",
    extra_templates: &[],
    extra_header_blocks: &[],
};

static CONTINUITY_OF_CARE: VariantProfile = VariantProfile {
    code: "34133-9",
    display: "Summarization of Episode Note",
    extra_templates: &[CCD_DOCUMENT],
    extra_header_blocks: &[],
};

static DISCHARGE_SUMMARY: VariantProfile = VariantProfile {
    code: "18842-5",
    display: "Discharge Summary",
    extra_templates: &[DISCHARGE_SUMMARY_DOCUMENT],
    extra_header_blocks: &[HeaderBlock::ServiceEvent],
};

static PROGRESS_NOTE: VariantProfile = VariantProfile {
    code: "11506-3",
    display: "Progress note",
    extra_templates: &[PROGRESS_NOTE_DOCUMENT],
    extra_header_blocks: &[],
};
