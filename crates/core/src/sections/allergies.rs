//! Allergies and intolerances, with reactions as child rows.

use super::composer::{child_reference, compose_table, TableGroup, TableLayout};
use super::{record_label, section_element, status_parts, SectionBuilder, SectionShell};
use crate::error::CcdaResult;
use crate::node::{
    coded_element, fixed_code_element, id_element, interval, material_code, required_display,
    status_code, text_reference, BuildContext, Buildable, ObservationValue,
};
use crate::records::{AllergyRecord, ClinicalStatus, ReactionRecord};
use crate::templates::{EntryKind, SectionKind, TemplateKind};
use crate::vocabulary::{ALLERGIES_SECTION, ALLERGY_TO_SUBSTANCE, ASSERTION, CONCERN, SEVERITY};
use crate::xml::Element;

const SHELL: SectionShell = SectionShell {
    kind: SectionKind::Allergies,
    code: ALLERGIES_SECTION,
    title: "Allergies, Adverse Reactions, Alerts",
    flag_empty: true,
    entry_type: None,
};

const LAYOUT: TableLayout = TableLayout {
    parent_headers: &["Substance", "Status"],
    child_headers: &["Reaction", "Severity"],
    id_prefix: "allergy",
    empty_message: "No known allergies",
    no_children_message: "No reactions recorded",
};

pub struct AllergiesSection<'a, R> {
    records: &'a [R],
}

impl<'a, R: AllergyRecord> AllergiesSection<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self { records }
    }
}

fn severity_observation(
    ctx: &BuildContext<'_>,
    reaction: &impl ReactionRecord,
) -> CcdaResult<Option<Element>> {
    let Some(severity) = reaction.severity() else {
        return Ok(None);
    };
    let observation = ctx
        .templated("observation", TemplateKind::Entry(EntryKind::SeverityObservation))?
        .attr("classCode", "OBS")
        .attr("moodCode", "EVN")
        .child(fixed_code_element("code", &SEVERITY))
        .child(status_code("completed"))
        .child(coded_element("value", severity).attr("xsi:type", "CD"));
    Ok(Some(
        Element::new("entryRelationship")
            .attr("typeCode", "SUBJ")
            .attr("inversionInd", "true")
            .child(observation),
    ))
}

/// Reaction observation and its narrative cells.
fn reaction_parts(
    ctx: &BuildContext<'_>,
    label: &str,
    reaction: &impl ReactionRecord,
    reference_id: &str,
) -> CcdaResult<(Vec<String>, Element)> {
    let value = ObservationValue::resolve(label, "reaction", reaction.code(), reaction.text())?;
    let mut observation = ctx
        .templated("observation", TemplateKind::Entry(EntryKind::ReactionObservation))?
        .attr("classCode", "OBS")
        .attr("moodCode", "EVN")
        .child(id_element(reaction.id()))
        .child(fixed_code_element("code", &ASSERTION))
        .child(text_reference(reference_id))
        .child(status_code("completed"))
        .child(value.to_element());
    if let Some(severity) = severity_observation(ctx, reaction)? {
        observation.push(severity);
    }

    let cells = vec![
        value.display().to_string(),
        reaction
            .severity()
            .map(|s| s.display_text().to_string())
            .unwrap_or_default(),
    ];
    let relationship = Element::new("entryRelationship")
        .attr("typeCode", "MFST")
        .attr("inversionInd", "true")
        .child(observation);
    Ok((cells, relationship))
}

fn allergy_group<R: AllergyRecord>(
    ctx: &BuildContext<'_>,
    index: usize,
    allergy: &R,
    reference_id: &str,
) -> CcdaResult<TableGroup> {
    let label = record_label("allergy", index);
    let substance = required_display(
        &label,
        "substance",
        allergy.substance(),
        allergy.substance_text(),
    )?;
    let status = ClinicalStatus::inferred(allergy.status(), false);
    let (status_label, concern_status) = status_parts(status);

    let participant = Element::new("participant").attr("typeCode", "CSM").child(
        Element::new("participantRole").attr("classCode", "MANU").child(
            Element::new("playingEntity")
                .attr("classCode", "MMAT")
                .child(material_code(allergy.substance(), reference_id)),
        ),
    );

    let mut observation = ctx
        .templated(
            "observation",
            TemplateKind::Entry(EntryKind::AllergyIntoleranceObservation),
        )?
        .attr("classCode", "OBS")
        .attr("moodCode", "EVN")
        .child(id_element(allergy.id()))
        .child(fixed_code_element("code", &ASSERTION))
        .child(text_reference(reference_id))
        .child(status_code("completed"))
        .child(interval(allergy.onset(), None))
        .child(fixed_code_element("value", &ALLERGY_TO_SUBSTANCE).attr("xsi:type", "CD"))
        .child(participant);

    let mut child_rows = Vec::with_capacity(allergy.reactions().len());
    for (position, reaction) in allergy.reactions().iter().enumerate() {
        let reaction_label = format!("{label} reaction {}", position + 1);
        let (cells, relationship) = reaction_parts(
            ctx,
            &reaction_label,
            reaction,
            &child_reference(reference_id, position + 1),
        )?;
        child_rows.push(cells);
        observation.push(relationship);
    }

    let concern = ctx
        .templated("act", TemplateKind::Entry(EntryKind::AllergyConcernAct))?
        .attr("classCode", "ACT")
        .attr("moodCode", "EVN")
        .child(id_element(None))
        .child(fixed_code_element("code", &CONCERN))
        .child(concern_status)
        .child(interval(allergy.onset(), None))
        .child(
            Element::new("entryRelationship")
                .attr("typeCode", "SUBJ")
                .child(observation),
        );

    Ok(TableGroup {
        parent_cells: vec![substance.to_string(), status_label],
        cell_ids: Vec::new(),
        child_rows,
        entry: concern,
    })
}

impl<R: AllergyRecord> Buildable for AllergiesSection<'_, R> {
    fn build(&self, ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let mut index = 0;
        let composition = compose_table(&LAYOUT, self.records, |allergy, reference_id| {
            index += 1;
            allergy_group(ctx, index, allergy, reference_id)
        })?;
        section_element(ctx, &SHELL, composition)
    }
}

impl<R: AllergyRecord> SectionBuilder for AllergiesSection<'_, R> {
    fn kind(&self) -> SectionKind {
        SectionKind::Allergies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::plain::{Allergy, Reaction};
    use crate::records::CodedValue;
    use crate::templates::{TemplateRegistry, Version};
    use crate::vocabulary::CodeSystem;
    use crate::CcdaError;

    fn penicillin() -> Allergy {
        Allergy {
            substance: Some(
                CodedValue::new("7980", CodeSystem::RxNorm).with_display("Penicillin G"),
            ),
            reactions: vec![
                Reaction {
                    code: Some(
                        CodedValue::new("247472004", CodeSystem::SnomedCt).with_display("Hives"),
                    ),
                    severity: Some(
                        CodedValue::new("6736007", CodeSystem::SnomedCt).with_display("Moderate"),
                    ),
                    ..Reaction::default()
                },
                Reaction {
                    text: Some("Wheezing".into()),
                    ..Reaction::default()
                },
            ],
            ..Allergy::default()
        }
    }

    #[test]
    fn reactions_render_as_child_rows_and_manifestations() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let allergies = vec![penicillin()];
        let section = AllergiesSection::new(&allergies).build(&ctx).expect("build");

        let rows: Vec<_> = section
            .find_path(&["text", "table", "tbody"])
            .expect("tbody")
            .elements_named("tr")
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].elements().count(), 4);
        assert_eq!(rows[1].elements().count(), 2);
        assert_eq!(
            rows[1].elements().map(Element::text_content).collect::<Vec<_>>(),
            ["Wheezing", ""]
        );

        let observation = section
            .find_path(&["entry", "act", "entryRelationship", "observation"])
            .expect("observation");
        let manifestations: Vec<_> = observation
            .elements_named("entryRelationship")
            .filter(|rel| rel.attribute("typeCode") == Some("MFST"))
            .collect();
        assert_eq!(manifestations.len(), 2);

        let hives = manifestations[0].first("observation").expect("reaction");
        assert_eq!(
            hives.find_path(&["text", "reference"]).and_then(|r| r.attribute("value")),
            Some("#allergy1-1")
        );
        let severity = hives
            .find_path(&["entryRelationship", "observation", "value"])
            .expect("severity");
        assert_eq!(severity.attribute("displayName"), Some("Moderate"));

        let wheeze = manifestations[1].first("observation").expect("reaction");
        assert!(wheeze.first("entryRelationship").is_none());
        assert_eq!(wheeze.first("value").and_then(|v| v.attribute("xsi:type")), Some("ST"));

        let material = observation
            .find_path(&["participant", "participantRole", "playingEntity", "code"])
            .expect("material");
        assert_eq!(material.attribute("code"), Some("7980"));
    }

    #[test]
    fn allergy_without_reactions_spans_the_reaction_columns() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let allergies = vec![Allergy {
            substance_text: Some("Peanuts".into()),
            ..Allergy::default()
        }];
        let section = AllergiesSection::new(&allergies).build(&ctx).expect("build");
        let row = section
            .find_path(&["text", "table", "tbody", "tr"])
            .expect("row");
        let last = row.elements().last().expect("cell");
        assert_eq!(last.attribute("colspan"), Some("2"));
        let material = section
            .find_path(&[
                "entry",
                "act",
                "entryRelationship",
                "observation",
                "participant",
                "participantRole",
                "playingEntity",
                "code",
            ])
            .expect("material");
        assert_eq!(material.attribute("nullFlavor"), Some("OTH"));
    }

    #[test]
    fn reaction_without_value_fails() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let mut allergy = penicillin();
        allergy.reactions.push(Reaction::default());
        let err = AllergiesSection::new(&[allergy]).build(&ctx).expect_err("should fail");
        assert!(matches!(
            err,
            CcdaError::MissingRequiredData { ref record, field: "reaction" }
                if record == "allergy 1 reaction 3"
        ));
    }
}
