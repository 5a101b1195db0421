//! Record capability interfaces.
//!
//! The engine reads domain records only through these traits. A getter with a default body
//! is optional for the record kind: the default reports "not provided" and the builders fall
//! back to omission or a null flavor. Records are never mutated.
//!
//! [`plain`] provides serde-backed structs implementing every trait, used by the encounter
//! file loader and by tests.

pub mod plain;

use crate::time::CdaTime;
use crate::vocabulary::CodeSystem;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

/// Cross-document identity of a fact. Carried through unchanged, never validated.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistentId {
    pub root: String,
    #[serde(default)]
    pub extension: Option<String>,
}

impl PersistentId {
    pub fn new(root: impl Into<String>, extension: Option<String>) -> Self {
        Self {
            root: root.into(),
            extension,
        }
    }
}

/// A code drawn from an external code system.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodedValue {
    pub code: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub system: CodeSystem,
}

impl CodedValue {
    pub fn new(code: impl Into<String>, system: CodeSystem) -> Self {
        Self {
            code: code.into(),
            display_name: None,
            system,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display_name = Some(display.into());
        self
    }

    /// Text shown in narrative: the display name, or the bare code when there is none.
    pub fn display_text(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.code)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonName {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub given: Vec<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

impl PersonName {
    pub fn new(given: &[&str], family: &str) -> Self {
        Self {
            given: given.iter().map(|g| g.to_string()).collect(),
            family: Some(family.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_none()
            && self.given.is_empty()
            && self.family.is_none()
            && self.suffix.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Address {
    /// HL7 PostalAddressUse code such as `HP` (home) or `WP` (work).
    #[serde(default, rename = "use")]
    pub use_code: Option<String>,
    #[serde(default)]
    pub street_lines: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Telecom {
    #[serde(default, rename = "use")]
    pub use_code: Option<String>,
    /// URL form, e.g. `tel:+1(555)555-2003` or `mailto:jane@example.org`.
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quantity {
    pub value: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Quantity {
    pub fn display(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} {}", self.value, unit),
            None => self.value.clone(),
        }
    }
}

/// Clinical status of a concern or medication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalStatus {
    Active,
    Inactive,
    Resolved,
}

impl ClinicalStatus {
    /// Status implied by the presence of an end date when the record does not say.
    pub fn inferred(explicit: Option<ClinicalStatus>, has_end: bool) -> ClinicalStatus {
        explicit.unwrap_or(if has_end {
            ClinicalStatus::Resolved
        } else {
            ClinicalStatus::Active
        })
    }

    /// `statusCode` of the wrapping act.
    pub fn act_status_code(self) -> &'static str {
        match self {
            ClinicalStatus::Active => "active",
            ClinicalStatus::Inactive | ClinicalStatus::Resolved => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClinicalStatus::Active => "Active",
            ClinicalStatus::Inactive => "Inactive",
            ClinicalStatus::Resolved => "Resolved",
        }
    }
}

pub trait PatientRecord {
    fn ids(&self) -> &[PersistentId];
    fn name(&self) -> &PersonName;
    fn addresses(&self) -> &[Address] {
        &[]
    }
    fn telecoms(&self) -> &[Telecom] {
        &[]
    }
    /// HL7 AdministrativeGender code (`M`, `F`, `UN`).
    fn administrative_gender(&self) -> Option<&str> {
        None
    }
    fn birth_date(&self) -> Option<NaiveDate> {
        None
    }
    fn marital_status(&self) -> Option<&CodedValue> {
        None
    }
    fn race(&self) -> Option<&CodedValue> {
        None
    }
    fn ethnicity(&self) -> Option<&CodedValue> {
        None
    }
    /// BCP 47 language tag of the preferred language.
    fn language(&self) -> Option<&str> {
        None
    }
}

pub trait OrganizationRecord {
    fn ids(&self) -> &[PersistentId];
    fn name(&self) -> Option<&str>;
    fn telecoms(&self) -> &[Telecom] {
        &[]
    }
    fn addresses(&self) -> &[Address] {
        &[]
    }
}

pub trait AuthorRecord {
    fn ids(&self) -> &[PersistentId];
    fn name(&self) -> &PersonName;
    /// When the author authored the document. Falls back to the document time.
    fn time(&self) -> Option<DateTime<FixedOffset>> {
        None
    }
    fn addresses(&self) -> &[Address] {
        &[]
    }
    fn telecoms(&self) -> &[Telecom] {
        &[]
    }
    fn organization(&self) -> Option<&dyn OrganizationRecord> {
        None
    }
}

/// The encounter a discharge summary documents.
pub trait EncounterRecord {
    fn admission_time(&self) -> Option<CdaTime>;
    fn discharge_time(&self) -> Option<CdaTime>;
}

pub trait ProblemRecord {
    fn id(&self) -> Option<&PersistentId> {
        None
    }
    fn code(&self) -> Option<&CodedValue> {
        None
    }
    fn text(&self) -> Option<&str> {
        None
    }
    fn status(&self) -> Option<ClinicalStatus> {
        None
    }
    fn onset(&self) -> Option<CdaTime> {
        None
    }
    fn resolution(&self) -> Option<CdaTime> {
        None
    }
}

pub trait ReactionRecord {
    fn id(&self) -> Option<&PersistentId> {
        None
    }
    fn code(&self) -> Option<&CodedValue> {
        None
    }
    fn text(&self) -> Option<&str> {
        None
    }
    fn severity(&self) -> Option<&CodedValue> {
        None
    }
}

pub trait AllergyRecord {
    type Reaction: ReactionRecord;

    fn id(&self) -> Option<&PersistentId> {
        None
    }
    fn substance(&self) -> Option<&CodedValue> {
        None
    }
    fn substance_text(&self) -> Option<&str> {
        None
    }
    fn status(&self) -> Option<ClinicalStatus> {
        None
    }
    fn onset(&self) -> Option<CdaTime> {
        None
    }
    fn reactions(&self) -> &[Self::Reaction];
}

pub trait MedicationRecord {
    fn id(&self) -> Option<&PersistentId> {
        None
    }
    fn drug(&self) -> Option<&CodedValue> {
        None
    }
    fn drug_text(&self) -> Option<&str> {
        None
    }
    fn dose(&self) -> Option<&Quantity> {
        None
    }
    fn route(&self) -> Option<&CodedValue> {
        None
    }
    fn instructions(&self) -> Option<&str> {
        None
    }
    fn status(&self) -> Option<ClinicalStatus> {
        None
    }
    fn start(&self) -> Option<CdaTime> {
        None
    }
    fn stop(&self) -> Option<CdaTime> {
        None
    }
}

pub trait NutritionAssessmentRecord {
    fn id(&self) -> Option<&PersistentId> {
        None
    }
    fn code(&self) -> Option<&CodedValue> {
        None
    }
    fn text(&self) -> Option<&str> {
        None
    }
    fn effective_time(&self) -> Option<CdaTime> {
        None
    }
}

pub trait NutritionStatusRecord {
    type Assessment: NutritionAssessmentRecord;

    fn id(&self) -> Option<&PersistentId> {
        None
    }
    fn code(&self) -> Option<&CodedValue> {
        None
    }
    fn text(&self) -> Option<&str> {
        None
    }
    fn effective_time(&self) -> Option<CdaTime> {
        None
    }
    fn assessments(&self) -> &[Self::Assessment];
}

pub trait DischargeInstructionRecord {
    fn id(&self) -> Option<&PersistentId> {
        None
    }
    fn text(&self) -> &str;
    fn category(&self) -> Option<&str> {
        None
    }
    fn code(&self) -> Option<&CodedValue> {
        None
    }
}
