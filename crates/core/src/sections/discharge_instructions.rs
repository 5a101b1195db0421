//! Hospital discharge instructions, rendered as (optionally captioned) lists.

use super::composer::{compose_list, ListEntry, ListLayout};
use super::{instruction_act, record_label, section_element, SectionBuilder, SectionShell};
use crate::error::CcdaResult;
use crate::node::{missing, BuildContext, Buildable};
use crate::records::DischargeInstructionRecord;
use crate::templates::SectionKind;
use crate::vocabulary::DISCHARGE_INSTRUCTIONS_SECTION;
use crate::xml::Element;

const SHELL: SectionShell = SectionShell {
    kind: SectionKind::DischargeInstructions,
    code: DISCHARGE_INSTRUCTIONS_SECTION,
    title: "Hospital Discharge Instructions",
    flag_empty: false,
    entry_type: None,
};

const LAYOUT: ListLayout = ListLayout {
    id_prefix: "instruction",
    empty_message: "No discharge instructions",
};

pub struct DischargeInstructionsSection<'a, R> {
    records: &'a [R],
}

impl<'a, R: DischargeInstructionRecord> DischargeInstructionsSection<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self { records }
    }
}

impl<R: DischargeInstructionRecord> Buildable for DischargeInstructionsSection<'_, R> {
    fn build(&self, ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let mut index = 0;
        let composition = compose_list(
            &LAYOUT,
            self.records,
            |record| record.category(),
            |record, reference_id| {
                index += 1;
                let text = record.text().trim();
                if text.is_empty() {
                    return Err(missing(&record_label("instruction", index), "text"));
                }
                Ok(ListEntry {
                    text: text.to_string(),
                    entry: instruction_act(ctx, record.id(), record.code(), reference_id)?,
                })
            },
        )?;
        section_element(ctx, &SHELL, composition)
    }
}

impl<R: DischargeInstructionRecord> SectionBuilder for DischargeInstructionsSection<'_, R> {
    fn kind(&self) -> SectionKind {
        SectionKind::DischargeInstructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CcdaError;
    use crate::records::plain::DischargeInstruction;
    use crate::templates::{TemplateRegistry, Version};
    use crate::test_support::instruction;

    #[test]
    fn grouped_items_and_entries_share_order() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let records = vec![
            instruction("Keep the dressing dry", Some("Wound care")),
            instruction("Call if temperature exceeds 38C", None),
            instruction("Walk twice a day", Some("Activity")),
        ];
        let section = DischargeInstructionsSection::new(&records).build(&ctx).expect("build");
        let text = section.first("text").expect("text");
        let captions: Vec<String> = text
            .elements_named("list")
            .filter_map(|list| list.first("caption").map(Element::text_content))
            .collect();
        assert_eq!(captions, ["Activity", "Wound care", "Other"]);

        let item_ids: Vec<_> = text
            .elements_named("list")
            .flat_map(|list| list.elements_named("item"))
            .map(|item| (item.attribute("ID").map(str::to_string), item.text_content()))
            .collect();
        assert_eq!(item_ids[0], (Some("instruction1".into()), "Walk twice a day".into()));
        assert_eq!(item_ids[2].1, "Call if temperature exceeds 38C");

        let references: Vec<_> = section
            .elements_named("entry")
            .filter_map(|entry| entry.find_path(&["act", "text", "reference"]))
            .filter_map(|reference| reference.attribute("value"))
            .collect();
        assert_eq!(references, ["#instruction1", "#instruction2", "#instruction3"]);

        let act = section.find_path(&["entry", "act"]).expect("act");
        assert_eq!(act.attribute("moodCode"), Some("INT"));
        assert_eq!(act.first("code").and_then(|c| c.attribute("code")), Some("409073007"));
    }

    #[test]
    fn uncategorized_instructions_form_one_list() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R1_1, &registry);
        let records = vec![instruction("Rest", None), instruction("Hydrate", None)];
        let section = DischargeInstructionsSection::new(&records).build(&ctx).expect("build");
        let lists: Vec<_> = section
            .first("text")
            .expect("text")
            .elements_named("list")
            .collect();
        assert_eq!(lists.len(), 1);
        assert!(lists[0].first("caption").is_none());
        assert_eq!(section.elements_named("entry").count(), 2);
    }

    #[test]
    fn empty_instructions_render_placeholder() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let section = DischargeInstructionsSection::<DischargeInstruction>::new(&[])
            .build(&ctx)
            .expect("build");
        assert!(section.find_path(&["text", "paragraph"]).is_some());
        assert!(section.first("entry").is_none());
    }

    struct BlankInstruction;

    impl DischargeInstructionRecord for BlankInstruction {
        fn text(&self) -> &str {
            "   "
        }
    }

    #[test]
    fn blank_instruction_text_fails_the_section() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let err = DischargeInstructionsSection::new(&[BlankInstruction])
            .build(&ctx)
            .expect_err("should reject");
        assert!(matches!(
            err,
            CcdaError::MissingRequiredData { ref record, field: "text" }
                if record == "instruction 1"
        ));
    }
}
