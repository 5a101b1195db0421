//! Static reference vocabulary: code systems, value sets and fixed codes.
//!
//! These tables are immutable. Everything here is a `const` or a `match`, so there is no
//! initialisation order to worry about and no way to mutate them at runtime.

use crate::CcdaError;
use ccda_types::Oid;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Code systems referenced by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeSystem {
    Loinc,
    SnomedCt,
    RxNorm,
    Icd10Cm,
    AdministrativeGender,
    MaritalStatus,
    RaceAndEthnicity,
    ActClass,
    ActCode,
    Confidentiality,
    RouteOfAdministration,
    /// Any other system, identified only by OID.
    Other(Oid),
}

impl CodeSystem {
    pub fn oid(&self) -> &str {
        match self {
            CodeSystem::Loinc => "2.16.840.1.113883.6.1",
            CodeSystem::SnomedCt => "2.16.840.1.113883.6.96",
            CodeSystem::RxNorm => "2.16.840.1.113883.6.88",
            CodeSystem::Icd10Cm => "2.16.840.1.113883.6.90",
            CodeSystem::AdministrativeGender => "2.16.840.1.113883.5.1",
            CodeSystem::MaritalStatus => "2.16.840.1.113883.5.2",
            CodeSystem::RaceAndEthnicity => "2.16.840.1.113883.6.238",
            CodeSystem::ActClass => "2.16.840.1.113883.5.6",
            CodeSystem::ActCode => "2.16.840.1.113883.5.4",
            CodeSystem::Confidentiality => "2.16.840.1.113883.5.25",
            CodeSystem::RouteOfAdministration => "2.16.840.1.113883.3.26.1.1",
            CodeSystem::Other(oid) => oid.as_str(),
        }
    }

    /// Value for the `codeSystemName` attribute, if the system has a conventional name.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            CodeSystem::Loinc => Some("LOINC"),
            CodeSystem::SnomedCt => Some("SNOMED CT"),
            CodeSystem::RxNorm => Some("RxNorm"),
            CodeSystem::Icd10Cm => Some("ICD-10-CM"),
            CodeSystem::AdministrativeGender => Some("AdministrativeGender"),
            CodeSystem::MaritalStatus => Some("MaritalStatus"),
            CodeSystem::RaceAndEthnicity => Some("Race & Ethnicity - CDC"),
            CodeSystem::ActClass => Some("HL7ActClass"),
            CodeSystem::ActCode => Some("ActCode"),
            CodeSystem::Confidentiality => Some("HL7Confidentiality"),
            CodeSystem::RouteOfAdministration => Some("FDA Route of Administration"),
            CodeSystem::Other(_) => None,
        }
    }

    const KNOWN: [CodeSystem; 11] = [
        CodeSystem::Loinc,
        CodeSystem::SnomedCt,
        CodeSystem::RxNorm,
        CodeSystem::Icd10Cm,
        CodeSystem::AdministrativeGender,
        CodeSystem::MaritalStatus,
        CodeSystem::RaceAndEthnicity,
        CodeSystem::ActClass,
        CodeSystem::ActCode,
        CodeSystem::Confidentiality,
        CodeSystem::RouteOfAdministration,
    ];
}

impl fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(self.oid()),
        }
    }
}

impl FromStr for CodeSystem {
    type Err = CcdaError;

    /// Resolves a conventional name (case and punctuation insensitive) or an OID.
    ///
    /// OIDs of known systems map to the named variant; other OIDs become
    /// [`CodeSystem::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let named = match folded.as_str() {
            "loinc" => Some(CodeSystem::Loinc),
            "snomed" | "snomedct" | "sct" => Some(CodeSystem::SnomedCt),
            "rxnorm" => Some(CodeSystem::RxNorm),
            "icd10cm" => Some(CodeSystem::Icd10Cm),
            "administrativegender" => Some(CodeSystem::AdministrativeGender),
            "maritalstatus" => Some(CodeSystem::MaritalStatus),
            "cdcrace" | "raceethnicitycdc" | "raceandethnicitycdc" => {
                Some(CodeSystem::RaceAndEthnicity)
            }
            "actcode" => Some(CodeSystem::ActCode),
            "fdaroute" | "fdarouteofadministration" => Some(CodeSystem::RouteOfAdministration),
            _ => None,
        };
        if let Some(system) = named {
            return Ok(system);
        }

        let oid = Oid::parse(s).map_err(|_| {
            CcdaError::InvalidInput(format!("unknown code system '{s}' (use a name or an OID)"))
        })?;
        Ok(Self::KNOWN
            .into_iter()
            .find(|known| known.oid() == oid.as_str())
            .unwrap_or(CodeSystem::Other(oid)))
    }
}

impl<'de> Deserialize<'de> for CodeSystem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// HL7 null flavors used as explicit "no information" markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NullFlavor {
    NoInformation,
    Unknown,
    Other,
}

impl NullFlavor {
    pub fn code(self) -> &'static str {
        match self {
            NullFlavor::NoInformation => "NI",
            NullFlavor::Unknown => "UNK",
            NullFlavor::Other => "OTH",
        }
    }
}

/// A code fixed by a template, as opposed to one supplied by a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedCode {
    pub code: &'static str,
    pub display: &'static str,
    pub system: CodeSystem,
}

const fn loinc(code: &'static str, display: &'static str) -> FixedCode {
    FixedCode {
        code,
        display,
        system: CodeSystem::Loinc,
    }
}

const fn snomed(code: &'static str, display: &'static str) -> FixedCode {
    FixedCode {
        code,
        display,
        system: CodeSystem::SnomedCt,
    }
}

pub const PROBLEM_SECTION: FixedCode = loinc("11450-4", "Problem List");
pub const ALLERGIES_SECTION: FixedCode =
    loinc("48765-2", "Allergies and adverse reactions Document");
pub const MEDICATIONS_SECTION: FixedCode = loinc("10160-0", "History of Medication use Narrative");
pub const NUTRITION_SECTION: FixedCode = loinc("61144-2", "Diet and nutrition");
pub const DISCHARGE_INSTRUCTIONS_SECTION: FixedCode =
    loinc("8653-8", "Hospital Discharge Instructions");

pub const CONCERN: FixedCode = FixedCode {
    code: "CONC",
    display: "Concern",
    system: CodeSystem::ActClass,
};
pub const ASSERTION: FixedCode = FixedCode {
    code: "ASSERTION",
    display: "Assertion",
    system: CodeSystem::ActCode,
};
pub const SEVERITY: FixedCode = FixedCode {
    code: "SEV",
    display: "Severity Observation",
    system: CodeSystem::ActCode,
};
pub const PROBLEM: FixedCode = snomed("55607006", "Problem");
pub const ALLERGY_TO_SUBSTANCE: FixedCode = snomed("419199007", "Allergy to substance (disorder)");
pub const PATIENT_EDUCATION: FixedCode = snomed("409073007", "Education");
pub const NUTRITION_STATUS: FixedCode = loinc("75305-3", "Nutrition status");
pub const NUTRITION_ASSESSMENT: FixedCode = loinc("75303-8", "Nutrition assessment");

/// Display name for an HL7 AdministrativeGender code, `None` if the code is not in the
/// value set.
pub fn administrative_gender_display(code: &str) -> Option<&'static str> {
    match code {
        "M" => Some("Male"),
        "F" => Some("Female"),
        "UN" => Some("Undifferentiated"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_regardless_of_spelling() {
        assert_eq!("SNOMED CT".parse::<CodeSystem>().unwrap(), CodeSystem::SnomedCt);
        assert_eq!("snomed-ct".parse::<CodeSystem>().unwrap(), CodeSystem::SnomedCt);
        assert_eq!("LOINC".parse::<CodeSystem>().unwrap(), CodeSystem::Loinc);
        assert_eq!("RxNorm".parse::<CodeSystem>().unwrap(), CodeSystem::RxNorm);
    }

    #[test]
    fn known_oids_map_to_named_systems() {
        let system: CodeSystem = "2.16.840.1.113883.6.88".parse().unwrap();
        assert_eq!(system, CodeSystem::RxNorm);
        assert_eq!(system.name(), Some("RxNorm"));
    }

    #[test]
    fn unknown_oids_are_kept_verbatim() {
        let system: CodeSystem = "1.2.3.4.5".parse().unwrap();
        assert_eq!(system.oid(), "1.2.3.4.5");
        assert_eq!(system.name(), None);
        assert_eq!(system.to_string(), "1.2.3.4.5");
    }

    #[test]
    fn garbage_system_is_rejected() {
        let err = "made-up terminology".parse::<CodeSystem>().expect_err("should reject");
        assert!(matches!(err, CcdaError::InvalidInput(msg) if msg.contains("unknown code system")));
    }

    #[test]
    fn gender_value_set_lookup() {
        assert_eq!(administrative_gender_display("F"), Some("Female"));
        assert_eq!(administrative_gender_display("X"), None);
    }
}
