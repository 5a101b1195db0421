//! Header participants.
//!
//! Each participant is a [`Buildable`] that emits its CDA children in schema order. Required
//! data that a record does not carry becomes a null-flavored element, never an omission.

mod author;
mod record_target;

pub use author::{AuthorParticipant, LegalAuthenticator};
pub use record_target::RecordTarget;

use crate::error::CcdaResult;
use crate::node::{
    addr_elements, id_elements, interval, null_element, telecom_elements, BuildContext, Buildable,
};
use crate::records::{
    AuthorRecord, EncounterRecord, OrganizationRecord, PatientRecord, PersistentId,
};
use crate::vocabulary::NullFlavor;
use crate::xml::Element;
use chrono::{DateTime, FixedOffset};

/// Document-level inputs supplied by the caller.
pub struct DocumentHeader<'a> {
    pub document_id: PersistentId,
    /// Overrides the variant's display name as `<title>`.
    pub title: Option<String>,
    pub effective_time: DateTime<FixedOffset>,
    pub patient: &'a dyn PatientRecord,
    pub author: &'a dyn AuthorRecord,
    pub custodian: &'a dyn OrganizationRecord,
    /// Synthesized from `author` when absent.
    pub legal_authenticator: Option<&'a dyn AuthorRecord>,
    /// Admission and discharge times for variants with a service event.
    pub encounter: Option<&'a dyn EncounterRecord>,
}

/// `id`, `name`, `telecom`, `addr` of an organization, in that order.
pub(crate) fn organization_children(organization: &dyn OrganizationRecord) -> Vec<Element> {
    let mut children = id_elements(organization.ids());
    children.push(match organization.name() {
        Some(name) => Element::new("name").text(name),
        None => null_element("name", NullFlavor::Unknown),
    });
    children.extend(telecom_elements(organization.telecoms()));
    children.extend(addr_elements(organization.addresses()));
    children
}

/// `<custodian>` wrapping the organization that maintains the document.
pub struct Custodian<'a> {
    organization: &'a dyn OrganizationRecord,
}

impl<'a> Custodian<'a> {
    pub fn new(organization: &'a dyn OrganizationRecord) -> Self {
        Self { organization }
    }
}

impl Buildable for Custodian<'_> {
    fn build(&self, _ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let organization = Element::new("representedCustodianOrganization")
            .children_from(organization_children(self.organization));
        Ok(Element::new("custodian")
            .child(Element::new("assignedCustodian").child(organization)))
    }
}

/// `documentationOf/serviceEvent` covering the documented encounter.
pub struct ServiceEvent<'a> {
    encounter: Option<&'a dyn EncounterRecord>,
}

impl<'a> ServiceEvent<'a> {
    pub fn new(encounter: Option<&'a dyn EncounterRecord>) -> Self {
        Self { encounter }
    }
}

impl Buildable for ServiceEvent<'_> {
    fn build(&self, _ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let (admission, discharge) = match self.encounter {
            Some(encounter) => (encounter.admission_time(), encounter.discharge_time()),
            None => (None, None),
        };
        let mut effective_time = interval(admission, discharge);
        if discharge.is_none() {
            effective_time.push(null_element("high", NullFlavor::Unknown));
        }
        let service_event = Element::new("serviceEvent")
            .attr("classCode", "PCPR")
            .child(effective_time);
        Ok(Element::new("documentationOf").child(service_event))
    }
}
