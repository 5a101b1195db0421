use crate::error::CcdaResult;
use crate::node::{
    addr_elements, coded_element, coded_or_unknown, id_elements, name_element, null_element,
    telecom_elements, ts_element, BuildContext, Buildable,
};
use crate::records::PatientRecord;
use crate::vocabulary::{administrative_gender_display, CodeSystem, NullFlavor};
use crate::xml::Element;

/// `<recordTarget>`: the patient the document is about.
pub struct RecordTarget<'a> {
    patient: &'a dyn PatientRecord,
}

impl<'a> RecordTarget<'a> {
    pub fn new(patient: &'a dyn PatientRecord) -> Self {
        Self { patient }
    }

    fn gender(&self) -> Element {
        let Some(code) = self.patient.administrative_gender() else {
            return null_element("administrativeGenderCode", NullFlavor::Unknown);
        };
        match administrative_gender_display(code) {
            Some(display) => Element::new("administrativeGenderCode")
                .attr("code", code)
                .attr("codeSystem", CodeSystem::AdministrativeGender.oid())
                .attr_opt("codeSystemName", CodeSystem::AdministrativeGender.name())
                .attr("displayName", display),
            None => {
                tracing::warn!(code, "administrative gender code not in value set");
                null_element("administrativeGenderCode", NullFlavor::Unknown)
            }
        }
    }

    fn patient(&self) -> Element {
        let patient = self.patient;
        let mut element = Element::new("patient")
            .child(name_element(patient.name()))
            .child(self.gender())
            .child(ts_element("birthTime", patient.birth_date().map(Into::into)));
        if let Some(marital) = patient.marital_status() {
            element.push(coded_element("maritalStatusCode", marital));
        }
        element.push(coded_or_unknown("raceCode", patient.race()));
        element.push(coded_or_unknown("ethnicGroupCode", patient.ethnicity()));
        if let Some(language) = patient.language() {
            element.push(
                Element::new("languageCommunication")
                    .child(Element::new("languageCode").attr("code", language)),
            );
        }
        element
    }
}

impl Buildable for RecordTarget<'_> {
    fn build(&self, _ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let patient_role = Element::new("patientRole")
            .children_from(id_elements(self.patient.ids()))
            .children_from(addr_elements(self.patient.addresses()))
            .children_from(telecom_elements(self.patient.telecoms()))
            .child(self.patient());
        Ok(Element::new("recordTarget").child(patient_role))
    }
}
