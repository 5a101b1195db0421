//! Nutrition section: nutritional status observations with their assessments nested as
//! subject-of relationships.
//!
//! Only registered from R2.0 onwards. Building it against R1.1 fails with
//! `UnregisteredTemplate`.

use super::composer::{child_reference, compose_table, TableGroup, TableLayout};
use super::{record_label, section_element, SectionBuilder, SectionShell};
use crate::error::CcdaResult;
use crate::node::{
    fixed_code_element, id_element, status_code, text_reference, ts_element, BuildContext,
    Buildable, ObservationValue,
};
use crate::records::{NutritionAssessmentRecord, NutritionStatusRecord};
use crate::templates::{EntryKind, SectionKind, TemplateKind};
use crate::vocabulary::{NUTRITION_ASSESSMENT, NUTRITION_SECTION, NUTRITION_STATUS};
use crate::xml::Element;

const SHELL: SectionShell = SectionShell {
    kind: SectionKind::Nutrition,
    code: NUTRITION_SECTION,
    title: "Nutrition",
    flag_empty: false,
    entry_type: None,
};

const LAYOUT: TableLayout = TableLayout {
    parent_headers: &["Nutritional Status", "Status Date"],
    child_headers: &["Assessment", "Assessment Date"],
    id_prefix: "nutritionalStatus",
    empty_message: "No nutrition information recorded",
    no_children_message: "No assessments recorded",
};

pub struct NutritionSection<'a, R> {
    records: &'a [R],
}

impl<'a, R: NutritionStatusRecord> NutritionSection<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self { records }
    }
}

fn assessment_parts(
    ctx: &BuildContext<'_>,
    label: &str,
    assessment: &impl NutritionAssessmentRecord,
    reference_id: &str,
) -> CcdaResult<(Vec<String>, Element)> {
    let value = ObservationValue::resolve(label, "value", assessment.code(), assessment.text())?;
    let time = assessment.effective_time();
    let observation = ctx
        .templated("observation", TemplateKind::Entry(EntryKind::NutritionAssessment))?
        .attr("classCode", "OBS")
        .attr("moodCode", "EVN")
        .child(id_element(assessment.id()))
        .child(fixed_code_element("code", &NUTRITION_ASSESSMENT))
        .child(text_reference(reference_id))
        .child(status_code("completed"))
        .child(ts_element("effectiveTime", time))
        .child(value.to_element());

    let cells = vec![
        value.display().to_string(),
        time.map(|t| t.to_display()).unwrap_or_default(),
    ];
    let relationship = Element::new("entryRelationship")
        .attr("typeCode", "SUBJ")
        .child(observation);
    Ok((cells, relationship))
}

fn status_group<R: NutritionStatusRecord>(
    ctx: &BuildContext<'_>,
    index: usize,
    status: &R,
    reference_id: &str,
) -> CcdaResult<TableGroup> {
    let label = record_label("nutritional status", index);
    let value = ObservationValue::resolve(&label, "value", status.code(), status.text())?;
    let time = status.effective_time();

    let mut observation = ctx
        .templated(
            "observation",
            TemplateKind::Entry(EntryKind::NutritionalStatusObservation),
        )?
        .attr("classCode", "OBS")
        .attr("moodCode", "EVN")
        .child(id_element(status.id()))
        .child(fixed_code_element("code", &NUTRITION_STATUS))
        .child(text_reference(reference_id))
        .child(status_code("completed"))
        .child(ts_element("effectiveTime", time))
        .child(value.to_element());

    let mut child_rows = Vec::with_capacity(status.assessments().len());
    for (position, assessment) in status.assessments().iter().enumerate() {
        let assessment_label = format!("{label} assessment {}", position + 1);
        let (cells, relationship) = assessment_parts(
            ctx,
            &assessment_label,
            assessment,
            &child_reference(reference_id, position + 1),
        )?;
        child_rows.push(cells);
        observation.push(relationship);
    }

    Ok(TableGroup {
        parent_cells: vec![
            value.display().to_string(),
            time.map(|t| t.to_display()).unwrap_or_default(),
        ],
        cell_ids: Vec::new(),
        child_rows,
        entry: observation,
    })
}

impl<R: NutritionStatusRecord> Buildable for NutritionSection<'_, R> {
    fn build(&self, ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let mut index = 0;
        let composition = compose_table(&LAYOUT, self.records, |status, reference_id| {
            index += 1;
            status_group(ctx, index, status, reference_id)
        })?;
        section_element(ctx, &SHELL, composition)
    }
}

impl<R: NutritionStatusRecord> SectionBuilder for NutritionSection<'_, R> {
    fn kind(&self) -> SectionKind {
        SectionKind::Nutrition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::plain::{NutritionAssessment, NutritionStatus};
    use crate::templates::{TemplateRegistry, Version};
    use crate::test_support::nutrition_status_with_two_assessments;
    use crate::CcdaError;

    #[test]
    fn one_status_with_two_assessments() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let statuses = vec![nutrition_status_with_two_assessments()];
        let section = NutritionSection::new(&statuses).build(&ctx).expect("build");

        let rows: Vec<_> = section
            .find_path(&["text", "table", "tbody"])
            .expect("tbody")
            .elements_named("tr")
            .collect();
        assert_eq!(rows.len(), 2);

        let first: Vec<_> = rows[0].elements().collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].attribute("rowspan"), Some("2"));
        assert_eq!(first[1].attribute("rowspan"), Some("2"));
        assert_eq!(first[2].attribute("rowspan"), None);
        assert_eq!(first[0].text_content(), "Well nourished");
        assert_eq!(first[2].text_content(), "Tolerating regular diet");
        assert_eq!(rows[1].elements().count(), 2);

        let entries: Vec<_> = section.elements_named("entry").collect();
        assert_eq!(entries.len(), 1);
        let observation = entries[0].first("observation").expect("observation");
        let subjects: Vec<_> = observation
            .elements_named("entryRelationship")
            .filter(|rel| rel.attribute("typeCode") == Some("SUBJ"))
            .collect();
        assert_eq!(subjects.len(), 2);

        let coded = subjects[1]
            .find_path(&["observation", "value"])
            .expect("assessment value");
        assert_eq!(coded.attribute("xsi:type"), Some("CD"));
        let text = subjects[0]
            .find_path(&["observation", "value"])
            .expect("assessment value");
        assert_eq!(text.attribute("xsi:type"), Some("ST"));
        assert_eq!(text.attribute("code"), None);
    }

    #[test]
    fn templates_carry_no_extension_at_r2_0() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_0, &registry);
        let statuses = vec![nutrition_status_with_two_assessments()];
        let section = NutritionSection::new(&statuses).build(&ctx).expect("build");
        let template = section.first("templateId").expect("templateId");
        assert_eq!(template.attribute("root"), Some("2.16.840.1.113883.10.20.22.2.57"));
        assert_eq!(template.attribute("extension"), None);
        let entry_template = section
            .find_path(&["entry", "observation", "templateId"])
            .expect("entry templateId");
        assert_eq!(entry_template.attribute("root"), Some("2.16.840.1.113883.10.20.22.4.124"));
    }

    #[test]
    fn unavailable_before_r2_0() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R1_1, &registry);
        let statuses = vec![nutrition_status_with_two_assessments()];
        let err = NutritionSection::new(&statuses).build(&ctx).expect_err("should fail");
        assert!(err.is_configuration());
    }

    #[test]
    fn assessment_without_value_fails_the_section() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let mut status = nutrition_status_with_two_assessments();
        status.assessments.push(NutritionAssessment::default());
        let err = NutritionSection::new(&[status]).build(&ctx).expect_err("should fail");
        assert!(matches!(
            err,
            CcdaError::MissingRequiredData { ref record, field: "value" }
                if record == "nutritional status 1 assessment 3"
        ));
    }

    #[test]
    fn empty_section_is_not_flagged() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let section = NutritionSection::<NutritionStatus>::new(&[]).build(&ctx).expect("build");
        assert_eq!(section.attribute("nullFlavor"), None);
        let paragraph = section.find_path(&["text", "paragraph"]).expect("paragraph");
        assert_eq!(paragraph.text_content(), "No nutrition information recorded");
    }
}
