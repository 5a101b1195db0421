//! Encounter files: YAML input carrying the header records and tagged section record sets.
//!
//! ```yaml
//! variant: ccd
//! version: R2.1
//! header:
//!   effective_time: "2026-01-14T17:00:00+00:00"
//!   patient: { name: { given: [Isabella], family: Jones }, gender: F }
//!   author: { name: { given: [Henry], family: Seven } }
//!   custodian: { name: Community Health and Hospitals }
//! sections:
//!   - kind: nutrition
//!     records:
//!       - text: Well nourished
//!         assessments: [{ text: Tolerating regular diet }]
//! ```

use crate::document::variant::DocumentVariant;
use crate::error::{CcdaError, CcdaResult};
use crate::header::DocumentHeader;
use crate::records::plain::{
    Allergy, Author, DischargeInstruction, Encounter, Medication, NutritionStatus, Organization,
    Patient, Problem,
};
use crate::records::{AuthorRecord, EncounterRecord, PersistentId};
use crate::sections::{
    AllergiesSection, DischargeInstructionsSection, MedicationsSection, NutritionSection,
    ProblemsSection, SectionBuilder,
};
use crate::templates::{SectionKind, Version};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// A parsed encounter file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncounterFile {
    #[serde(default)]
    pub variant: Option<DocumentVariant>,
    #[serde(default)]
    pub version: Option<Version>,
    pub header: HeaderFile,
    #[serde(default)]
    pub sections: Vec<SectionRecords>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderFile {
    #[serde(default)]
    pub document_id: Option<PersistentId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub effective_time: Option<DateTime<FixedOffset>>,
    pub patient: Patient,
    pub author: Author,
    pub custodian: Organization,
    #[serde(default)]
    pub legal_authenticator: Option<Author>,
    #[serde(default)]
    pub encounter: Option<Encounter>,
}

/// One section's record set, tagged by section kind.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum SectionRecords {
    Problems(Vec<Problem>),
    Allergies(Vec<Allergy>),
    Medications(Vec<Medication>),
    Nutrition(Vec<NutritionStatus>),
    DischargeInstructions(Vec<DischargeInstruction>),
}

impl SectionRecords {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionRecords::Problems(_) => SectionKind::Problems,
            SectionRecords::Allergies(_) => SectionKind::Allergies,
            SectionRecords::Medications(_) => SectionKind::Medications,
            SectionRecords::Nutrition(_) => SectionKind::Nutrition,
            SectionRecords::DischargeInstructions(_) => SectionKind::DischargeInstructions,
        }
    }

    pub fn builder(&self) -> Box<dyn SectionBuilder + '_> {
        match self {
            SectionRecords::Problems(records) => Box::new(ProblemsSection::new(records)),
            SectionRecords::Allergies(records) => Box::new(AllergiesSection::new(records)),
            SectionRecords::Medications(records) => Box::new(MedicationsSection::new(records)),
            SectionRecords::Nutrition(records) => Box::new(NutritionSection::new(records)),
            SectionRecords::DischargeInstructions(records) => {
                Box::new(DischargeInstructionsSection::new(records))
            }
        }
    }
}

impl EncounterFile {
    /// Strictly parse an encounter from YAML text.
    ///
    /// Uses `serde_path_to_error` so a schema mismatch names the failing field, e.g.
    /// `sections[1].records[0].assessments[0].code.system`.
    pub fn parse(yaml_text: &str) -> CcdaResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        match serde_path_to_error::deserialize(deserializer) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                Err(CcdaError::EncounterSchema {
                    path,
                    message: source.to_string(),
                })
            }
        }
    }

    /// Section builders in file order, each borrowing its records from `self`.
    pub fn builders(&self) -> Vec<Box<dyn SectionBuilder + '_>> {
        self.sections.iter().map(SectionRecords::builder).collect()
    }

    /// Document header borrowing from `self`. The fallbacks fill in a missing document id or
    /// effective time.
    pub fn header(
        &self,
        fallback_id: impl FnOnce() -> PersistentId,
        fallback_time: impl FnOnce() -> DateTime<FixedOffset>,
    ) -> DocumentHeader<'_> {
        let header = &self.header;
        DocumentHeader {
            document_id: header.document_id.clone().unwrap_or_else(fallback_id),
            title: header.title.clone(),
            effective_time: header.effective_time.unwrap_or_else(fallback_time),
            patient: &header.patient,
            author: &header.author,
            custodian: &header.custodian,
            legal_authenticator: header
                .legal_authenticator
                .as_ref()
                .map(|signer| signer as &dyn AuthorRecord),
            encounter: header
                .encounter
                .as_ref()
                .map(|encounter| encounter as &dyn EncounterRecord),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::assemble;
    use crate::records::PatientRecord;
    use crate::templates::TemplateRegistry;

    const ENCOUNTER: &str = r#"
variant: discharge_summary
version: R2.1
header:
  document_id: { root: "2.16.840.1.113883.19.5.99999.1", extension: "TT988" }
  effective_time: "2026-01-14T17:00:00+00:00"
  patient:
    name: { given: [Isabella], family: Jones }
    gender: F
    birth_date: "1975-05-01"
  author:
    name: { given: [Henry], family: Seven }
  custodian:
    name: Community Health and Hospitals
  encounter:
    admission_time: "2026-01-10"
    discharge_time: "2026-01-14"
sections:
  - kind: nutrition
    records:
      - text: Well nourished
        assessments:
          - text: Tolerating regular diet
  - kind: discharge_instructions
    records:
      - text: Walk twice a day
        category: Activity
"#;

    fn pinned_id() -> PersistentId {
        PersistentId::new("1.2.3", Some("pinned".into()))
    }

    fn pinned_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-02-01T00:00:00+00:00").expect("time")
    }

    #[test]
    fn parses_header_and_sections() {
        let file = EncounterFile::parse(ENCOUNTER).expect("parse");
        assert_eq!(file.variant, Some(DocumentVariant::DischargeSummary));
        assert_eq!(file.version, Some(Version::R2_1));
        let kinds: Vec<_> = file.sections.iter().map(SectionRecords::kind).collect();
        assert_eq!(kinds, [SectionKind::Nutrition, SectionKind::DischargeInstructions]);
        let builder_kinds: Vec<_> = file.builders().iter().map(|b| b.kind()).collect();
        assert_eq!(builder_kinds, kinds);

        let header = file.header(pinned_id, pinned_time);
        assert_eq!(header.document_id.extension.as_deref(), Some("TT988"));
        assert_eq!(header.patient.administrative_gender(), Some("F"));
        assert!(header.encounter.is_some());
        assert!(header.legal_authenticator.is_none());
    }

    #[test]
    fn fallbacks_fill_missing_id_and_time() {
        let yaml = r#"
header:
  patient: { name: { family: Jones } }
  author: { name: { family: Seven } }
  custodian: {}
"#;
        let file = EncounterFile::parse(yaml).expect("parse");
        let header = file.header(pinned_id, pinned_time);
        assert_eq!(header.document_id, pinned_id());
        assert_eq!(header.effective_time, pinned_time());
        assert!(file.sections.is_empty());
    }

    #[test]
    fn parsed_file_assembles() {
        let file = EncounterFile::parse(ENCOUNTER).expect("parse");
        let header = file.header(pinned_id, pinned_time);
        let document = assemble(
            TemplateRegistry::shared(),
            file.variant.unwrap_or(DocumentVariant::Generic),
            file.version.unwrap_or(Version::LATEST),
            &header,
            &file.builders(),
        )
        .expect("assemble");
        let xml = document.serialize(false).expect("serialize");
        assert!(xml.contains("<title>Discharge Summary</title>"));
        assert!(xml.contains("<caption>Activity</caption>"));
    }

    #[test]
    fn unknown_section_kind_is_a_configuration_error() {
        let yaml = r#"
header:
  patient: { name: { family: Jones } }
  author: { name: { family: Seven } }
  custodian: {}
sections:
  - kind: vital_signs
    records: []
"#;
        let err = EncounterFile::parse(yaml).expect_err("should reject");
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            CcdaError::EncounterSchema { ref message, .. } if message.contains("vital_signs")
        ));
    }

    #[test]
    fn schema_errors_report_the_failing_path() {
        let yaml = r#"
header:
  patient: { name: { family: Jones } }
  author: { name: { family: Seven } }
  custodian: {}
sections:
  - kind: problems
    records:
      - code: { code: "195967001", system: "no such system" }
"#;
        let err = EncounterFile::parse(yaml).expect_err("should reject");
        match err {
            CcdaError::EncounterSchema { path, message } => {
                assert!(path.contains("system"), "path was {path}");
                assert!(message.contains("unknown code system"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
