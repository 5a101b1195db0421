//! Template/version resolution.
//!
//! Every templated node (document, section, entry) asks the [`TemplateRegistry`] for the
//! ordered `templateId` list that applies to its kind at the assembly's [`Version`]. The
//! registry is built once from the static tables in this module and never mutated.
//!
//! Specialised document variants inherit by concatenation: the US Realm Header list comes
//! first, followed by the variant's own identifiers.

use crate::document::variant::DocumentVariant;
use crate::error::{CcdaError, CcdaResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// C-CDA release that selects template lists and date-stamped extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    R1_1,
    R2_0,
    R2_1,
}

impl Version {
    pub const ALL: [Version; 3] = [Version::R1_1, Version::R2_0, Version::R2_1];

    /// Latest supported release.
    pub const LATEST: Version = Version::R2_1;

    pub fn as_str(self) -> &'static str {
        match self {
            Version::R1_1 => "R1.1",
            Version::R2_0 => "R2.0",
            Version::R2_1 => "R2.1",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = CcdaError;

    /// Accepts `R2.1`, `r2.1` and `2.1` style spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix('R')
            .or_else(|| trimmed.strip_prefix('r'))
            .unwrap_or(trimmed);
        match bare {
            "1.1" => Ok(Version::R1_1),
            "2.0" => Ok(Version::R2_0),
            "2.1" => Ok(Version::R2_1),
            _ => Err(CcdaError::UnsupportedVersion(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A versioned structural-contract tag attached to a document, section or entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateIdentifier {
    root: &'static str,
    extension: Option<&'static str>,
    description: &'static str,
}

impl TemplateIdentifier {
    pub fn root(&self) -> &'static str {
        self.root
    }

    pub fn extension(&self) -> Option<&'static str> {
        self.extension
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Display for TemplateIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extension {
            Some(ext) => write!(f, "{}:{} ({})", self.root, ext, self.description),
            None => write!(f, "{} ({})", self.root, self.description),
        }
    }
}

/// Section kinds the engine knows how to compose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Problems,
    Allergies,
    Medications,
    Nutrition,
    DischargeInstructions,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Problems,
        SectionKind::Allergies,
        SectionKind::Medications,
        SectionKind::Nutrition,
        SectionKind::DischargeInstructions,
    ];
}

/// Clinical statement kinds that carry their own template identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    ProblemConcernAct,
    ProblemObservation,
    AllergyConcernAct,
    AllergyIntoleranceObservation,
    ReactionObservation,
    SeverityObservation,
    MedicationActivity,
    MedicationInformation,
    Instruction,
    NutritionalStatusObservation,
    NutritionAssessment,
}

/// Anything the registry can resolve templates for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Document(DocumentVariant),
    Section(SectionKind),
    Entry(EntryKind),
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Document(variant) => write!(f, "document {variant}"),
            TemplateKind::Section(kind) => write!(f, "section {kind:?}"),
            TemplateKind::Entry(kind) => write!(f, "entry {kind:?}"),
        }
    }
}

/// How a template appears in one release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ext {
    /// Not part of this release.
    Absent,
    /// Present without an extension (pre-R2.0 style).
    Bare,
    Dated(&'static str),
}

/// Static registration row: one template root and its appearance per release.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TemplateSpec {
    pub root: &'static str,
    pub description: &'static str,
    pub r1_1: Ext,
    pub r2_0: Ext,
    pub r2_1: Ext,
}

impl TemplateSpec {
    fn identifier(&self, version: Version) -> Option<TemplateIdentifier> {
        let ext = match version {
            Version::R1_1 => self.r1_1,
            Version::R2_0 => self.r2_0,
            Version::R2_1 => self.r2_1,
        };
        let extension = match ext {
            Ext::Absent => return None,
            Ext::Bare => None,
            Ext::Dated(date) => Some(date),
        };
        Some(TemplateIdentifier {
            root: self.root,
            extension,
            description: self.description,
        })
    }
}

const R20: &str = "2014-06-09";
const R21: &str = "2015-08-01";

/// Template revised in R2.1.
const fn revised(root: &'static str, description: &'static str) -> TemplateSpec {
    TemplateSpec {
        root,
        description,
        r1_1: Ext::Bare,
        r2_0: Ext::Dated(R20),
        r2_1: Ext::Dated(R21),
    }
}

/// Template last revised in R2.0.
const fn stable(root: &'static str, description: &'static str) -> TemplateSpec {
    TemplateSpec {
        root,
        description,
        r1_1: Ext::Bare,
        r2_0: Ext::Dated(R20),
        r2_1: Ext::Dated(R20),
    }
}

/// Template that never carried an extension.
const fn undated(root: &'static str, description: &'static str) -> TemplateSpec {
    TemplateSpec {
        root,
        description,
        r1_1: Ext::Bare,
        r2_0: Ext::Bare,
        r2_1: Ext::Bare,
    }
}

/// Template introduced in R2.0 without an extension.
const fn introduced_r2(root: &'static str, description: &'static str) -> TemplateSpec {
    TemplateSpec {
        root,
        description,
        r1_1: Ext::Absent,
        r2_0: Ext::Bare,
        r2_1: Ext::Bare,
    }
}

pub(crate) const US_REALM_HEADER: TemplateSpec =
    revised("2.16.840.1.113883.10.20.22.1.1", "US Realm Header");
pub(crate) const CCD_DOCUMENT: TemplateSpec =
    revised("2.16.840.1.113883.10.20.22.1.2", "Continuity of Care Document");
pub(crate) const DISCHARGE_SUMMARY_DOCUMENT: TemplateSpec =
    revised("2.16.840.1.113883.10.20.22.1.8", "Discharge Summary");
pub(crate) const PROGRESS_NOTE_DOCUMENT: TemplateSpec =
    revised("2.16.840.1.113883.10.20.22.1.9", "Progress Note");

fn section_spec(kind: SectionKind) -> TemplateSpec {
    match kind {
        SectionKind::Problems => revised(
            "2.16.840.1.113883.10.20.22.2.5.1",
            "Problem Section (entries required)",
        ),
        SectionKind::Allergies => revised(
            "2.16.840.1.113883.10.20.22.2.6.1",
            "Allergies and Intolerances Section (entries required)",
        ),
        SectionKind::Medications => stable(
            "2.16.840.1.113883.10.20.22.2.1.1",
            "Medications Section (entries required)",
        ),
        SectionKind::Nutrition => {
            introduced_r2("2.16.840.1.113883.10.20.22.2.57", "Nutrition Section")
        }
        SectionKind::DischargeInstructions => undated(
            "2.16.840.1.113883.10.20.22.2.41",
            "Hospital Discharge Instructions Section",
        ),
    }
}

fn entry_spec(kind: EntryKind) -> TemplateSpec {
    match kind {
        EntryKind::ProblemConcernAct => {
            revised("2.16.840.1.113883.10.20.22.4.3", "Problem Concern Act")
        }
        EntryKind::ProblemObservation => {
            revised("2.16.840.1.113883.10.20.22.4.4", "Problem Observation")
        }
        EntryKind::AllergyConcernAct => {
            revised("2.16.840.1.113883.10.20.22.4.30", "Allergy Concern Act")
        }
        EntryKind::AllergyIntoleranceObservation => stable(
            "2.16.840.1.113883.10.20.22.4.7",
            "Allergy - Intolerance Observation",
        ),
        EntryKind::ReactionObservation => {
            stable("2.16.840.1.113883.10.20.22.4.9", "Reaction Observation")
        }
        EntryKind::SeverityObservation => {
            stable("2.16.840.1.113883.10.20.22.4.8", "Severity Observation")
        }
        EntryKind::MedicationActivity => {
            stable("2.16.840.1.113883.10.20.22.4.16", "Medication Activity")
        }
        EntryKind::MedicationInformation => {
            stable("2.16.840.1.113883.10.20.22.4.23", "Medication Information")
        }
        EntryKind::Instruction => stable("2.16.840.1.113883.10.20.22.4.20", "Instruction"),
        EntryKind::NutritionalStatusObservation => introduced_r2(
            "2.16.840.1.113883.10.20.22.4.124",
            "Nutritional Status Observation",
        ),
        EntryKind::NutritionAssessment => {
            introduced_r2("2.16.840.1.113883.10.20.22.4.138", "Nutrition Assessment")
        }
    }
}

const ALL_ENTRY_KINDS: [EntryKind; 11] = [
    EntryKind::ProblemConcernAct,
    EntryKind::ProblemObservation,
    EntryKind::AllergyConcernAct,
    EntryKind::AllergyIntoleranceObservation,
    EntryKind::ReactionObservation,
    EntryKind::SeverityObservation,
    EntryKind::MedicationActivity,
    EntryKind::MedicationInformation,
    EntryKind::Instruction,
    EntryKind::NutritionalStatusObservation,
    EntryKind::NutritionAssessment,
];

static SHARED: Lazy<TemplateRegistry> = Lazy::new(TemplateRegistry::standard);

/// Read-only map from `(kind, version)` to the ordered template identifier list.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    entries: HashMap<(TemplateKind, Version), Vec<TemplateIdentifier>>,
}

impl TemplateRegistry {
    /// Builds the registry from the static template tables.
    pub fn standard() -> Self {
        let mut entries = HashMap::new();

        for version in Version::ALL {
            if let Some(base) = US_REALM_HEADER.identifier(version) {
                for variant in DocumentVariant::ALL {
                    let own: Option<Vec<TemplateIdentifier>> = variant
                        .profile()
                        .extra_templates
                        .iter()
                        .map(|spec| spec.identifier(version))
                        .collect();
                    if let Some(own) = own {
                        let mut ids = Vec::with_capacity(1 + own.len());
                        ids.push(base);
                        ids.extend(own);
                        entries.insert((TemplateKind::Document(variant), version), ids);
                    }
                }
            }

            for kind in SectionKind::ALL {
                if let Some(id) = section_spec(kind).identifier(version) {
                    entries.insert((TemplateKind::Section(kind), version), vec![id]);
                }
            }

            for kind in ALL_ENTRY_KINDS {
                if let Some(id) = entry_spec(kind).identifier(version) {
                    entries.insert((TemplateKind::Entry(kind), version), vec![id]);
                }
            }
        }

        Self { entries }
    }

    /// Process-wide registry built on first use.
    ///
    /// Convenience for binaries. Library code receives a `&TemplateRegistry` explicitly.
    pub fn shared() -> &'static TemplateRegistry {
        &SHARED
    }

    /// Resolve the ordered template identifiers for `kind` at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`CcdaError::UnregisteredTemplate`] when the combination is not part of the
    /// static tables. This is a configuration error.
    pub fn resolve(
        &self,
        kind: TemplateKind,
        version: Version,
    ) -> CcdaResult<&[TemplateIdentifier]> {
        self.entries
            .get(&(kind, version))
            .map(Vec::as_slice)
            .ok_or(CcdaError::UnregisteredTemplate { kind, version })
    }

    pub fn is_registered(&self, kind: TemplateKind, version: Version) -> bool {
        self.entries.contains_key(&(kind, version))
    }

    /// Releases in which `kind` is registered, oldest first.
    pub fn versions_for(&self, kind: TemplateKind) -> Vec<Version> {
        Version::ALL
            .into_iter()
            .filter(|version| self.is_registered(kind, *version))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_common_spellings() {
        assert_eq!("R2.1".parse::<Version>().unwrap(), Version::R2_1);
        assert_eq!("r2.0".parse::<Version>().unwrap(), Version::R2_0);
        assert_eq!(" 1.1 ".parse::<Version>().unwrap(), Version::R1_1);
        let err = "R3.0".parse::<Version>().expect_err("should reject");
        assert!(matches!(err, CcdaError::UnsupportedVersion(v) if v == "R3.0"));
    }

    #[test]
    fn specialised_variants_append_to_base_list() {
        let registry = TemplateRegistry::standard();
        for version in Version::ALL {
            let base = registry
                .resolve(TemplateKind::Document(DocumentVariant::Generic), version)
                .expect("generic registered for every version");
            assert_eq!(base.len(), 1);
            assert_eq!(base[0].root(), "2.16.840.1.113883.10.20.22.1.1");

            for variant in DocumentVariant::ALL {
                let ids = registry
                    .resolve(TemplateKind::Document(variant), version)
                    .expect("variant registered");
                let own: Vec<TemplateIdentifier> = variant
                    .profile()
                    .extra_templates
                    .iter()
                    .filter_map(|spec| spec.identifier(version))
                    .collect();
                assert_eq!(&ids[..base.len()], base, "{variant} at {version}");
                assert_eq!(&ids[base.len()..], own.as_slice(), "{variant} at {version}");
            }
        }
    }

    #[test]
    fn extensions_follow_release_dates() {
        let registry = TemplateRegistry::standard();
        let ccd = TemplateKind::Document(DocumentVariant::ContinuityOfCare);

        let r21 = registry.resolve(ccd, Version::R2_1).unwrap();
        assert!(r21.iter().all(|id| id.extension() == Some("2015-08-01")));

        let r20 = registry.resolve(ccd, Version::R2_0).unwrap();
        assert!(r20.iter().all(|id| id.extension() == Some("2014-06-09")));

        let r11 = registry.resolve(ccd, Version::R1_1).unwrap();
        assert!(r11.iter().all(|id| id.extension().is_none()));

        let meds = registry
            .resolve(TemplateKind::Section(SectionKind::Medications), Version::R2_1)
            .unwrap();
        assert_eq!(meds[0].extension(), Some("2014-06-09"));
    }

    #[test]
    fn nutrition_is_not_registered_before_r2() {
        let registry = TemplateRegistry::standard();
        let kind = TemplateKind::Section(SectionKind::Nutrition);
        let err = registry.resolve(kind, Version::R1_1).expect_err("should be unregistered");
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            CcdaError::UnregisteredTemplate { version: Version::R1_1, .. }
        ));
        assert_eq!(registry.versions_for(kind), vec![Version::R2_0, Version::R2_1]);
    }

    #[test]
    fn every_section_and_entry_resolves_at_latest() {
        let registry = TemplateRegistry::standard();
        for kind in SectionKind::ALL {
            assert!(registry.is_registered(TemplateKind::Section(kind), Version::LATEST));
        }
        for kind in ALL_ENTRY_KINDS {
            assert!(registry.is_registered(TemplateKind::Entry(kind), Version::LATEST));
        }
    }

    #[test]
    fn shared_registry_matches_standard() {
        let kind = TemplateKind::Document(DocumentVariant::DischargeSummary);
        assert_eq!(
            TemplateRegistry::shared().resolve(kind, Version::R2_0).unwrap(),
            TemplateRegistry::standard().resolve(kind, Version::R2_0).unwrap()
        );
    }
}
