use super::organization_children;
use crate::error::CcdaResult;
use crate::node::{
    addr_elements, id_elements, name_element, telecom_elements, BuildContext, Buildable,
};
use crate::records::AuthorRecord;
use crate::time::ts;
use crate::xml::Element;
use chrono::{DateTime, FixedOffset};

/// `id`, `addr`, `telecom` and `assignedPerson/name` shared by author and authenticator.
fn assigned_person(name: &str, author: &dyn AuthorRecord) -> Element {
    Element::new(name)
        .children_from(id_elements(author.ids()))
        .children_from(addr_elements(author.addresses()))
        .children_from(telecom_elements(author.telecoms()))
        .child(Element::new("assignedPerson").child(name_element(author.name())))
}

/// `<author>` of the document.
pub struct AuthorParticipant<'a> {
    author: &'a dyn AuthorRecord,
    document_time: DateTime<FixedOffset>,
}

impl<'a> AuthorParticipant<'a> {
    /// `document_time` stands in for the authoring time when the record has none.
    pub fn new(author: &'a dyn AuthorRecord, document_time: DateTime<FixedOffset>) -> Self {
        Self {
            author,
            document_time,
        }
    }
}

impl Buildable for AuthorParticipant<'_> {
    fn build(&self, _ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let time = self.author.time().unwrap_or(self.document_time);
        let mut assigned = assigned_person("assignedAuthor", self.author);
        if let Some(organization) = self.author.organization() {
            assigned.push(
                Element::new("representedOrganization")
                    .children_from(organization_children(organization)),
            );
        }
        Ok(Element::new("author")
            .child(Element::new("time").attr("value", ts(&time)))
            .child(assigned))
    }
}

/// `<legalAuthenticator>`: the person who signed the document.
///
/// When the caller has no separate signer the author is reused, keeping its identity, address
/// and contact details.
pub struct LegalAuthenticator<'a> {
    signer: &'a dyn AuthorRecord,
    time: DateTime<FixedOffset>,
}

impl<'a> LegalAuthenticator<'a> {
    pub fn new(signer: &'a dyn AuthorRecord, time: DateTime<FixedOffset>) -> Self {
        Self { signer, time }
    }
}

impl Buildable for LegalAuthenticator<'_> {
    fn build(&self, _ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        Ok(Element::new("legalAuthenticator")
            .child(Element::new("time").attr("value", ts(&self.time)))
            .child(Element::new("signatureCode").attr("code", "S"))
            .child(assigned_person("assignedEntity", self.signer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::plain::{Author, Organization};
    use crate::records::{PersistentId, PersonName, Telecom};
    use crate::templates::{TemplateRegistry, Version};

    fn document_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-01-14T17:00:00+00:00").expect("time")
    }

    fn author() -> Author {
        Author {
            ids: vec![PersistentId::new("2.16.840.1.113883.4.6", Some("1234567890".into()))],
            name: PersonName::new(&["Henry"], "Seven"),
            telecoms: vec![Telecom {
                use_code: Some("WP".into()),
                value: "tel:+1(555)555-1002".into(),
            }],
            ..Author::default()
        }
    }

    #[test]
    fn author_time_falls_back_to_document_time() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let author = author();
        let element = AuthorParticipant::new(&author, document_time()).build(&ctx).expect("author");
        let time = element.first("time").expect("time");
        assert_eq!(time.attribute("value"), Some("20260114170000+0000"));
        assert!(element.find_path(&["assignedAuthor", "representedOrganization"]).is_none());
    }

    #[test]
    fn author_organization_is_represented() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let mut author = author();
        author.organization = Some(Organization {
            name: Some("Community Health and Hospitals".into()),
            ..Organization::default()
        });
        let element = AuthorParticipant::new(&author, document_time()).build(&ctx).expect("author");
        let name = element
            .find_path(&["assignedAuthor", "representedOrganization", "name"])
            .expect("organization name");
        assert_eq!(name.text_content(), "Community Health and Hospitals");
    }

    #[test]
    fn authenticator_reuses_author_identity() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let author = author();
        let element = LegalAuthenticator::new(&author, document_time()).build(&ctx).expect("build");
        let names: Vec<&str> = element.elements().map(Element::name).collect();
        assert_eq!(names, ["time", "signatureCode", "assignedEntity"]);
        let entity = element.first("assignedEntity").expect("entity");
        assert_eq!(entity.first("id").and_then(|id| id.attribute("extension")), Some("1234567890"));
        assert_eq!(
            entity.first("telecom").and_then(|t| t.attribute("value")),
            Some("tel:+1(555)555-1002")
        );
        let given = entity.find_path(&["assignedPerson", "name", "given"]).expect("given");
        assert_eq!(given.text_content(), "Henry");
    }
}
