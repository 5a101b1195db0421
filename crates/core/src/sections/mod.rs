//! Concrete document sections.
//!
//! Every section shares the same shell, built by [`section_element`]: `templateId`, `code`,
//! `title`, narrative `text`, then one `entry` per top-level record. What differs is the
//! composition strategy and the entry shapes, which live in the per-section modules.

pub mod allergies;
pub mod composer;
pub mod discharge_instructions;
pub mod medications;
pub mod nutrition;
pub mod problems;

pub use allergies::AllergiesSection;
pub use discharge_instructions::DischargeInstructionsSection;
pub use medications::MedicationsSection;
pub use nutrition::NutritionSection;
pub use problems::ProblemsSection;

use crate::error::CcdaResult;
use crate::node::{
    coded_element, fixed_code_element, id_element, status_code, text_reference, BuildContext,
    Buildable,
};
use crate::records::{ClinicalStatus, CodedValue, PersistentId};
use crate::templates::{EntryKind, SectionKind, TemplateKind};
use crate::vocabulary::{FixedCode, NullFlavor, PATIENT_EDUCATION};
use crate::xml::Element;
use composer::Composition;

/// A section node bound to its own record set.
pub trait SectionBuilder: Buildable {
    fn kind(&self) -> SectionKind;
}

/// Static description of one section kind.
pub(crate) struct SectionShell {
    pub kind: SectionKind,
    pub code: FixedCode,
    pub title: &'static str,
    /// `nullFlavor="NI"` on the section when there are no records.
    pub flag_empty: bool,
    /// `typeCode` of each `<entry>` wrapper.
    pub entry_type: Option<&'static str>,
}

pub(crate) fn section_element(
    ctx: &BuildContext<'_>,
    shell: &SectionShell,
    composition: Composition,
) -> CcdaResult<Element> {
    let mut section = ctx.templated("section", TemplateKind::Section(shell.kind))?;
    if shell.flag_empty && composition.entries.is_empty() {
        section.set_attr("nullFlavor", NullFlavor::NoInformation.code());
    }
    section.push(fixed_code_element("code", &shell.code));
    section.push(Element::new("title").text(shell.title));
    section.push(composition.text);
    for statement in composition.entries {
        let entry = Element::new("entry").attr_opt("typeCode", shell.entry_type);
        section.push(entry.child(statement));
    }
    tracing::debug!(section = ?shell.kind, version = %ctx.version(), "section built");
    Ok(section)
}

/// Record label used in error messages, e.g. `problem 2`.
pub(crate) fn record_label(noun: &str, index: usize) -> String {
    format!("{noun} {index}")
}

/// Status label for the narrative and `statusCode` for the entry.
pub(crate) fn status_parts(status: ClinicalStatus) -> (String, Element) {
    (
        status.label().to_string(),
        status_code(status.act_status_code()),
    )
}

/// Instruction act (`moodCode="INT"`) linked to a narrative item.
pub(crate) fn instruction_act(
    ctx: &BuildContext<'_>,
    id: Option<&PersistentId>,
    code: Option<&CodedValue>,
    reference_id: &str,
) -> CcdaResult<Element> {
    let code = match code {
        Some(code) => coded_element("code", code),
        None => fixed_code_element("code", &PATIENT_EDUCATION),
    };
    Ok(ctx
        .templated("act", TemplateKind::Entry(EntryKind::Instruction))?
        .attr("classCode", "ACT")
        .attr("moodCode", "INT")
        .child(id_element(id))
        .child(code)
        .child(text_reference(reference_id))
        .child(status_code("completed")))
}
