//! Document assembly.
//!
//! [`DocumentAssembler`] walks a fixed linear sequence of stages:
//!
//! 1. header identity: `realmCode`, `typeId`, template ids, `id`, `code`, `title`,
//!    `effectiveTime`, `confidentialityCode`, `languageCode`
//! 2. header people: `recordTarget`, `author`, `custodian`, `legalAuthenticator`, then any
//!    header blocks the variant adds
//! 3. body: only when at least one section was supplied
//!
//! A failure in any stage aborts the assembly. There is no partial output.

pub mod variant;

use crate::config::AssemblyConfig;
use crate::constants::{
    HL7_V3_NAMESPACE, SDTC_NAMESPACE, TYPE_ID_EXTENSION, TYPE_ID_ROOT, US_REALM_CODE,
    XSI_NAMESPACE,
};
use crate::error::CcdaResult;
use crate::header::{
    AuthorParticipant, Custodian, DocumentHeader, LegalAuthenticator, RecordTarget, ServiceEvent,
};
use crate::node::{id_element, BuildContext, Buildable};
use crate::normalizer::normalize;
use crate::sections::SectionBuilder;
use crate::templates::{TemplateKind, TemplateRegistry, Version};
use crate::time::ts;
use crate::vocabulary::CodeSystem;
use crate::xml::Element;
use self::variant::{DocumentVariant, HeaderBlock};

/// Stages of one assembly, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblyStage {
    Start,
    HeaderIdentity,
    HeaderPeople,
    Body,
    Done,
}

/// A fully assembled document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

/// Output settings for [`Document::serialize_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    pub pretty: bool,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub declaration: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            declaration: true,
        }
    }
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Serialize with an XML declaration, then run the content-model normalizer.
    pub fn serialize(&self, pretty: bool) -> CcdaResult<String> {
        self.serialize_with(SerializeOptions {
            pretty,
            declaration: true,
        })
    }

    pub fn serialize_with(&self, options: SerializeOptions) -> CcdaResult<String> {
        let xml = if options.declaration {
            self.root.to_xml_document(options.pretty)?
        } else {
            self.root.to_xml(options.pretty)?
        };
        Ok(normalize(&xml).into_owned())
    }
}

/// Single assembler for every variant. Variant differences come from its profile.
pub struct DocumentAssembler<'r> {
    registry: &'r TemplateRegistry,
    variant: DocumentVariant,
    config: AssemblyConfig,
}

impl<'r> DocumentAssembler<'r> {
    pub fn new(
        registry: &'r TemplateRegistry,
        variant: DocumentVariant,
        config: AssemblyConfig,
    ) -> Self {
        Self {
            registry,
            variant,
            config,
        }
    }

    /// Assemble `header` and `sections` (in caller order) into a document.
    ///
    /// # Errors
    ///
    /// Configuration errors when a template is not registered for the configured version, and
    /// [`crate::CcdaError::MissingRequiredData`] when a section record has nothing to display.
    pub fn assemble(
        &self,
        header: &DocumentHeader<'_>,
        sections: &[Box<dyn SectionBuilder + '_>],
    ) -> CcdaResult<Document> {
        let ctx = BuildContext::new(self.config.version(), self.registry);
        let mut stage = AssemblyStage::Start;
        self.trace(stage);

        let mut root = Element::new("ClinicalDocument")
            .attr("xmlns", HL7_V3_NAMESPACE)
            .attr("xmlns:xsi", XSI_NAMESPACE)
            .attr("xmlns:sdtc", SDTC_NAMESPACE);

        stage = AssemblyStage::HeaderIdentity;
        self.trace(stage);
        self.header_identity(&ctx, header, &mut root)?;

        stage = AssemblyStage::HeaderPeople;
        self.trace(stage);
        self.header_people(&ctx, header, &mut root)?;

        if !sections.is_empty() {
            stage = AssemblyStage::Body;
            self.trace(stage);
            let mut body = Element::new("structuredBody");
            for section in sections {
                tracing::debug!(section = ?section.kind(), "building section");
                body.push(Element::new("component").child(section.build(&ctx)?));
            }
            root.push(Element::new("component").child(body));
        }

        stage = AssemblyStage::Done;
        self.trace(stage);
        tracing::info!(
            variant = %self.variant,
            version = %self.config.version(),
            sections = sections.len(),
            "document assembled"
        );
        Ok(Document { root })
    }

    fn trace(&self, stage: AssemblyStage) {
        tracing::debug!(?stage, variant = %self.variant, "assembly stage");
    }

    fn header_identity(
        &self,
        ctx: &BuildContext<'_>,
        header: &DocumentHeader<'_>,
        root: &mut Element,
    ) -> CcdaResult<()> {
        let profile = self.variant.profile();
        root.push(Element::new("realmCode").attr("code", US_REALM_CODE));
        root.push(
            Element::new("typeId")
                .attr("root", TYPE_ID_ROOT)
                .attr("extension", TYPE_ID_EXTENSION),
        );
        for template in ctx.template_ids(TemplateKind::Document(self.variant))? {
            root.push(template);
        }
        root.push(id_element(Some(&header.document_id)));
        root.push(
            Element::new("code")
                .attr("code", profile.code)
                .attr("codeSystem", CodeSystem::Loinc.oid())
                .attr_opt("codeSystemName", CodeSystem::Loinc.name())
                .attr("displayName", profile.display),
        );
        let title = header.title.as_deref().unwrap_or(profile.display);
        root.push(Element::new("title").text(title));
        root.push(Element::new("effectiveTime").attr("value", ts(&header.effective_time)));
        root.push(
            Element::new("confidentialityCode")
                .attr("code", self.config.confidentiality_code())
                .attr("codeSystem", CodeSystem::Confidentiality.oid()),
        );
        root.push(Element::new("languageCode").attr("code", self.config.language_code()));
        Ok(())
    }

    fn header_people(
        &self,
        ctx: &BuildContext<'_>,
        header: &DocumentHeader<'_>,
        root: &mut Element,
    ) -> CcdaResult<()> {
        root.push(RecordTarget::new(header.patient).build(ctx)?);
        root.push(AuthorParticipant::new(header.author, header.effective_time).build(ctx)?);
        root.push(Custodian::new(header.custodian).build(ctx)?);
        let signer = header.legal_authenticator.unwrap_or(header.author);
        root.push(LegalAuthenticator::new(signer, header.effective_time).build(ctx)?);

        for block in self.variant.profile().extra_header_blocks {
            match block {
                HeaderBlock::ServiceEvent => {
                    root.push(ServiceEvent::new(header.encounter).build(ctx)?)
                }
            }
        }
        Ok(())
    }
}

/// Assemble with default configuration for `version`.
pub fn assemble(
    registry: &TemplateRegistry,
    variant: DocumentVariant,
    version: Version,
    header: &DocumentHeader<'_>,
    sections: &[Box<dyn SectionBuilder + '_>],
) -> CcdaResult<Document> {
    let config = AssemblyConfig::for_version(version)?;
    DocumentAssembler::new(registry, variant, config).assemble(header, sections)
}
