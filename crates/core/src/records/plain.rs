//! Plain data structs implementing the record traits.
//!
//! Field names match the encounter YAML format. Every struct rejects unknown keys so a
//! misspelt field fails loudly instead of silently reading as "not provided".

use super::*;
use ccda_types::NonEmptyText;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Patient {
    #[serde(default)]
    pub ids: Vec<PersistentId>,
    #[serde(default)]
    pub name: PersonName,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub telecoms: Vec<Telecom>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub marital_status: Option<CodedValue>,
    #[serde(default)]
    pub race: Option<CodedValue>,
    #[serde(default)]
    pub ethnicity: Option<CodedValue>,
    #[serde(default)]
    pub language: Option<String>,
}

impl PatientRecord for Patient {
    fn ids(&self) -> &[PersistentId] {
        &self.ids
    }
    fn name(&self) -> &PersonName {
        &self.name
    }
    fn addresses(&self) -> &[Address] {
        &self.addresses
    }
    fn telecoms(&self) -> &[Telecom] {
        &self.telecoms
    }
    fn administrative_gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }
    fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }
    fn marital_status(&self) -> Option<&CodedValue> {
        self.marital_status.as_ref()
    }
    fn race(&self) -> Option<&CodedValue> {
        self.race.as_ref()
    }
    fn ethnicity(&self) -> Option<&CodedValue> {
        self.ethnicity.as_ref()
    }
    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Organization {
    #[serde(default)]
    pub ids: Vec<PersistentId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub telecoms: Vec<Telecom>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl OrganizationRecord for Organization {
    fn ids(&self) -> &[PersistentId] {
        &self.ids
    }
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn telecoms(&self) -> &[Telecom] {
        &self.telecoms
    }
    fn addresses(&self) -> &[Address] {
        &self.addresses
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Author {
    #[serde(default)]
    pub ids: Vec<PersistentId>,
    #[serde(default)]
    pub name: PersonName,
    #[serde(default)]
    pub time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub telecoms: Vec<Telecom>,
    #[serde(default)]
    pub organization: Option<Organization>,
}

impl AuthorRecord for Author {
    fn ids(&self) -> &[PersistentId] {
        &self.ids
    }
    fn name(&self) -> &PersonName {
        &self.name
    }
    fn time(&self) -> Option<DateTime<FixedOffset>> {
        self.time
    }
    fn addresses(&self) -> &[Address] {
        &self.addresses
    }
    fn telecoms(&self) -> &[Telecom] {
        &self.telecoms
    }
    fn organization(&self) -> Option<&dyn OrganizationRecord> {
        self.organization
            .as_ref()
            .map(|org| org as &dyn OrganizationRecord)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Encounter {
    #[serde(default)]
    pub admission_time: Option<CdaTime>,
    #[serde(default)]
    pub discharge_time: Option<CdaTime>,
}

impl EncounterRecord for Encounter {
    fn admission_time(&self) -> Option<CdaTime> {
        self.admission_time
    }
    fn discharge_time(&self) -> Option<CdaTime> {
        self.discharge_time
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Problem {
    #[serde(default)]
    pub id: Option<PersistentId>,
    #[serde(default)]
    pub code: Option<CodedValue>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<ClinicalStatus>,
    #[serde(default)]
    pub onset: Option<CdaTime>,
    #[serde(default)]
    pub resolution: Option<CdaTime>,
}

impl ProblemRecord for Problem {
    fn id(&self) -> Option<&PersistentId> {
        self.id.as_ref()
    }
    fn code(&self) -> Option<&CodedValue> {
        self.code.as_ref()
    }
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
    fn status(&self) -> Option<ClinicalStatus> {
        self.status
    }
    fn onset(&self) -> Option<CdaTime> {
        self.onset
    }
    fn resolution(&self) -> Option<CdaTime> {
        self.resolution
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reaction {
    #[serde(default)]
    pub id: Option<PersistentId>,
    #[serde(default)]
    pub code: Option<CodedValue>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub severity: Option<CodedValue>,
}

impl ReactionRecord for Reaction {
    fn id(&self) -> Option<&PersistentId> {
        self.id.as_ref()
    }
    fn code(&self) -> Option<&CodedValue> {
        self.code.as_ref()
    }
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
    fn severity(&self) -> Option<&CodedValue> {
        self.severity.as_ref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Allergy {
    #[serde(default)]
    pub id: Option<PersistentId>,
    #[serde(default)]
    pub substance: Option<CodedValue>,
    #[serde(default)]
    pub substance_text: Option<String>,
    #[serde(default)]
    pub status: Option<ClinicalStatus>,
    #[serde(default)]
    pub onset: Option<CdaTime>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl AllergyRecord for Allergy {
    type Reaction = Reaction;

    fn id(&self) -> Option<&PersistentId> {
        self.id.as_ref()
    }
    fn substance(&self) -> Option<&CodedValue> {
        self.substance.as_ref()
    }
    fn substance_text(&self) -> Option<&str> {
        self.substance_text.as_deref()
    }
    fn status(&self) -> Option<ClinicalStatus> {
        self.status
    }
    fn onset(&self) -> Option<CdaTime> {
        self.onset
    }
    fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Medication {
    #[serde(default)]
    pub id: Option<PersistentId>,
    #[serde(default)]
    pub drug: Option<CodedValue>,
    #[serde(default)]
    pub drug_text: Option<String>,
    #[serde(default)]
    pub dose: Option<Quantity>,
    #[serde(default)]
    pub route: Option<CodedValue>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub status: Option<ClinicalStatus>,
    #[serde(default)]
    pub start: Option<CdaTime>,
    #[serde(default)]
    pub stop: Option<CdaTime>,
}

impl MedicationRecord for Medication {
    fn id(&self) -> Option<&PersistentId> {
        self.id.as_ref()
    }
    fn drug(&self) -> Option<&CodedValue> {
        self.drug.as_ref()
    }
    fn drug_text(&self) -> Option<&str> {
        self.drug_text.as_deref()
    }
    fn dose(&self) -> Option<&Quantity> {
        self.dose.as_ref()
    }
    fn route(&self) -> Option<&CodedValue> {
        self.route.as_ref()
    }
    fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
    fn status(&self) -> Option<ClinicalStatus> {
        self.status
    }
    fn start(&self) -> Option<CdaTime> {
        self.start
    }
    fn stop(&self) -> Option<CdaTime> {
        self.stop
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NutritionAssessment {
    #[serde(default)]
    pub id: Option<PersistentId>,
    #[serde(default)]
    pub code: Option<CodedValue>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub effective_time: Option<CdaTime>,
}

impl NutritionAssessmentRecord for NutritionAssessment {
    fn id(&self) -> Option<&PersistentId> {
        self.id.as_ref()
    }
    fn code(&self) -> Option<&CodedValue> {
        self.code.as_ref()
    }
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
    fn effective_time(&self) -> Option<CdaTime> {
        self.effective_time
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NutritionStatus {
    #[serde(default)]
    pub id: Option<PersistentId>,
    #[serde(default)]
    pub code: Option<CodedValue>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub effective_time: Option<CdaTime>,
    #[serde(default)]
    pub assessments: Vec<NutritionAssessment>,
}

impl NutritionStatusRecord for NutritionStatus {
    type Assessment = NutritionAssessment;

    fn id(&self) -> Option<&PersistentId> {
        self.id.as_ref()
    }
    fn code(&self) -> Option<&CodedValue> {
        self.code.as_ref()
    }
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
    fn effective_time(&self) -> Option<CdaTime> {
        self.effective_time
    }
    fn assessments(&self) -> &[NutritionAssessment] {
        &self.assessments
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DischargeInstruction {
    #[serde(default)]
    pub id: Option<PersistentId>,
    pub text: NonEmptyText,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub code: Option<CodedValue>,
}

impl DischargeInstruction {
    pub fn new(text: NonEmptyText, category: Option<&str>) -> Self {
        Self {
            id: None,
            text,
            category: category.map(str::to_string),
            code: None,
        }
    }
}

impl DischargeInstructionRecord for DischargeInstruction {
    fn id(&self) -> Option<&PersistentId> {
        self.id.as_ref()
    }
    fn text(&self) -> &str {
        self.text.as_str()
    }
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
    fn code(&self) -> Option<&CodedValue> {
        self.code.as_ref()
    }
}
