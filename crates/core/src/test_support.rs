//! Record fixtures shared by the unit tests.

use crate::header::DocumentHeader;
use crate::records::plain::{
    Author, DischargeInstruction, Encounter, NutritionAssessment, NutritionStatus, Organization,
    Patient,
};
use crate::records::{Address, CodedValue, PersistentId, PersonName, Telecom};
use crate::time::CdaTime;
use crate::vocabulary::CodeSystem;
use ccda_types::NonEmptyText;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Owned header records; [`HeaderRecords::header`] borrows them into a [`DocumentHeader`].
pub(crate) struct HeaderRecords {
    pub patient: Patient,
    pub author: Author,
    pub custodian: Organization,
    pub encounter: Encounter,
    pub effective_time: DateTime<FixedOffset>,
}

impl HeaderRecords {
    pub fn header(&self) -> DocumentHeader<'_> {
        DocumentHeader {
            document_id: PersistentId::new(
                "2.16.840.1.113883.19.5.99999.1",
                Some("TT988".into()),
            ),
            title: None,
            effective_time: self.effective_time,
            patient: &self.patient,
            author: &self.author,
            custodian: &self.custodian,
            legal_authenticator: None,
            encounter: Some(&self.encounter),
        }
    }
}

pub(crate) fn header_records() -> HeaderRecords {
    let patient = Patient {
        ids: vec![PersistentId::new("2.16.840.1.113883.19.5.99999.2", Some("998991".into()))],
        name: PersonName::new(&["Isabella"], "Jones"),
        addresses: vec![Address {
            use_code: Some("HP".into()),
            street_lines: vec!["1357 Amber Drive".into()],
            city: Some("Beaverton".into()),
            state: Some("OR".into()),
            postal_code: Some("97867".into()),
            country: Some("US".into()),
        }],
        telecoms: vec![Telecom {
            use_code: Some("HP".into()),
            value: "tel:+1(555)555-2003".into(),
        }],
        gender: Some("F".into()),
        birth_date: NaiveDate::from_ymd_opt(1975, 5, 1),
        ..Patient::default()
    };
    let author = Author {
        ids: vec![PersistentId::new("2.16.840.1.113883.4.6", Some("99999999".into()))],
        name: PersonName::new(&["Henry"], "Seven"),
        telecoms: vec![Telecom {
            use_code: Some("WP".into()),
            value: "tel:+1(555)555-1002".into(),
        }],
        ..Author::default()
    };
    let custodian = Organization {
        ids: vec![PersistentId::new("2.16.840.1.113883.4.6", Some("99999999".into()))],
        name: Some("Community Health and Hospitals".into()),
        ..Organization::default()
    };
    let encounter = Encounter {
        admission_time: CdaTime::parse("2026-01-10T09:00:00+00:00"),
        discharge_time: CdaTime::parse("2026-01-14T16:30:00+00:00"),
    };
    HeaderRecords {
        patient,
        author,
        custodian,
        encounter,
        effective_time: DateTime::parse_from_rfc3339("2026-01-14T17:00:00+00:00")
            .expect("fixture time"),
    }
}

/// One coded status; the first assessment is free text, the second is coded.
pub(crate) fn nutrition_status_with_two_assessments() -> NutritionStatus {
    NutritionStatus {
        code: Some(
            CodedValue::new("248324001", CodeSystem::SnomedCt).with_display("Well nourished"),
        ),
        effective_time: CdaTime::parse("2026-01-12"),
        assessments: vec![
            NutritionAssessment {
                text: Some("Tolerating regular diet".into()),
                effective_time: CdaTime::parse("2026-01-12"),
                ..NutritionAssessment::default()
            },
            NutritionAssessment {
                code: Some(
                    CodedValue::new("386619000", CodeSystem::SnomedCt)
                        .with_display("Low sodium diet"),
                ),
                effective_time: CdaTime::parse("2026-01-13T08:00:00+00:00"),
                ..NutritionAssessment::default()
            },
        ],
        ..NutritionStatus::default()
    }
}

pub(crate) fn instruction(text: &str, category: Option<&str>) -> DischargeInstruction {
    DischargeInstruction::new(NonEmptyText::new(text).expect("fixture text"), category)
}
