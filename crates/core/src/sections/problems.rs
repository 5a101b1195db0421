//! Problem list: one concern act per problem, each wrapping a problem observation.

use super::composer::{compose_table, TableGroup, TableLayout};
use super::{record_label, section_element, status_parts, SectionBuilder, SectionShell};
use crate::error::CcdaResult;
use crate::node::{
    fixed_code_element, id_element, interval, status_code, text_reference, BuildContext,
    Buildable, ObservationValue,
};
use crate::records::{ClinicalStatus, ProblemRecord};
use crate::templates::{EntryKind, SectionKind, TemplateKind};
use crate::vocabulary::{CONCERN, PROBLEM, PROBLEM_SECTION};
use crate::xml::Element;

const SHELL: SectionShell = SectionShell {
    kind: SectionKind::Problems,
    code: PROBLEM_SECTION,
    title: "Problems",
    flag_empty: true,
    entry_type: Some("DRIV"),
};

const LAYOUT: TableLayout = TableLayout {
    parent_headers: &["Problem", "Status", "Onset", "Resolved"],
    child_headers: &[],
    id_prefix: "problem",
    empty_message: "No known problems",
    no_children_message: "",
};

pub struct ProblemsSection<'a, R> {
    records: &'a [R],
}

impl<'a, R: ProblemRecord> ProblemsSection<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self { records }
    }
}

fn problem_group<R: ProblemRecord>(
    ctx: &BuildContext<'_>,
    index: usize,
    problem: &R,
    reference_id: &str,
) -> CcdaResult<TableGroup> {
    let label = record_label("problem", index);
    let value = ObservationValue::resolve(&label, "value", problem.code(), problem.text())?;
    let status = ClinicalStatus::inferred(problem.status(), problem.resolution().is_some());
    let (status_label, concern_status) = status_parts(status);
    let onset = problem.onset();
    let resolution = problem.resolution();

    let observation = ctx
        .templated("observation", TemplateKind::Entry(EntryKind::ProblemObservation))?
        .attr("classCode", "OBS")
        .attr("moodCode", "EVN")
        .child(id_element(problem.id()))
        .child(fixed_code_element("code", &PROBLEM))
        .child(text_reference(reference_id))
        .child(status_code("completed"))
        .child(interval(onset, resolution))
        .child(value.to_element());

    let concern = ctx
        .templated("act", TemplateKind::Entry(EntryKind::ProblemConcernAct))?
        .attr("classCode", "ACT")
        .attr("moodCode", "EVN")
        .child(id_element(None))
        .child(fixed_code_element("code", &CONCERN))
        .child(concern_status)
        .child(interval(onset, resolution))
        .child(
            Element::new("entryRelationship")
                .attr("typeCode", "SUBJ")
                .child(observation),
        );

    Ok(TableGroup {
        parent_cells: vec![
            value.display().to_string(),
            status_label,
            onset.map(|t| t.to_display()).unwrap_or_default(),
            resolution.map(|t| t.to_display()).unwrap_or_default(),
        ],
        cell_ids: Vec::new(),
        child_rows: Vec::new(),
        entry: concern,
    })
}

impl<R: ProblemRecord> Buildable for ProblemsSection<'_, R> {
    fn build(&self, ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let mut index = 0;
        let composition = compose_table(&LAYOUT, self.records, |problem, reference_id| {
            index += 1;
            problem_group(ctx, index, problem, reference_id)
        })?;
        section_element(ctx, &SHELL, composition)
    }
}

impl<R: ProblemRecord> SectionBuilder for ProblemsSection<'_, R> {
    fn kind(&self) -> SectionKind {
        SectionKind::Problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::plain::Problem;
    use crate::records::{CodedValue, PersistentId};
    use crate::templates::{TemplateRegistry, Version};
    use crate::time::CdaTime;
    use crate::vocabulary::CodeSystem;
    use crate::CcdaError;

    fn asthma() -> Problem {
        Problem {
            id: Some(PersistentId::new("ab1791b0-5c71-11db-b0de-0800200c9a66", None)),
            code: Some(CodedValue::new("195967001", CodeSystem::SnomedCt).with_display("Asthma")),
            onset: CdaTime::parse("2019-03-01"),
            ..Problem::default()
        }
    }

    #[test]
    fn problem_appears_in_narrative_and_entry() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let problems = vec![asthma()];
        let section = ProblemsSection::new(&problems).build(&ctx).expect("build");
        assert_eq!(section.attribute("nullFlavor"), None);

        let cell = section
            .find_path(&["text", "table", "tbody", "tr", "td"])
            .expect("cell");
        assert_eq!(cell.attribute("ID"), Some("problem1"));
        assert_eq!(cell.text_content(), "Asthma");
        assert_eq!(cell.attribute("rowspan"), None);

        let entries: Vec<_> = section.elements_named("entry").collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attribute("typeCode"), Some("DRIV"));
        let act = entries[0].first("act").expect("act");
        assert_eq!(act.first("statusCode").and_then(|s| s.attribute("code")), Some("active"));
        let observation = act
            .find_path(&["entryRelationship", "observation"])
            .expect("observation");
        let reference = observation.find_path(&["text", "reference"]).expect("reference");
        assert_eq!(reference.attribute("value"), Some("#problem1"));
        assert_eq!(
            observation.first("id").and_then(|id| id.attribute("root")),
            Some("ab1791b0-5c71-11db-b0de-0800200c9a66")
        );
        let value = observation.first("value").expect("value");
        assert_eq!(value.attribute("code"), Some("195967001"));
    }

    #[test]
    fn resolution_date_completes_the_concern() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let mut problem = asthma();
        problem.resolution = CdaTime::parse("2024-06-01");
        let problems = vec![problem];
        let section = ProblemsSection::new(&problems).build(&ctx).expect("build");
        let act = section.find_path(&["entry", "act"]).expect("act");
        assert_eq!(act.first("statusCode").and_then(|s| s.attribute("code")), Some("completed"));
        let high = act.find_path(&["effectiveTime", "high"]).expect("high");
        assert_eq!(high.attribute("value"), Some("20240601"));
    }

    #[test]
    fn empty_problem_list_is_flagged() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let section = ProblemsSection::<Problem>::new(&[]).build(&ctx).expect("build");
        assert_eq!(section.attribute("nullFlavor"), Some("NI"));
        assert!(section.first("entry").is_none());
        assert!(section.find_path(&["text", "paragraph"]).is_some());
    }

    #[test]
    fn problem_without_code_or_text_fails_the_section() {
        let registry = TemplateRegistry::standard();
        let ctx = BuildContext::new(Version::R2_1, &registry);
        let problems = vec![asthma(), Problem::default()];
        let err = ProblemsSection::new(&problems).build(&ctx).expect_err("should fail");
        assert!(matches!(
            err,
            CcdaError::MissingRequiredData { ref record, .. } if record == "problem 2"
        ));
    }
}
