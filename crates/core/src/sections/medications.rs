//! Medications: one medication activity per record.

use super::composer::{cell_reference, compose_table, TableGroup, TableLayout};
use super::{
    instruction_act, record_label, section_element, status_parts, SectionBuilder, SectionShell,
};
use crate::error::CcdaResult;
use crate::node::{
    coded_element, id_element, material_code, required_display, text_reference, ts_element,
    BuildContext, Buildable,
};
use crate::records::{ClinicalStatus, MedicationRecord};
use crate::templates::{EntryKind, SectionKind, TemplateKind};
use crate::vocabulary::MEDICATIONS_SECTION;
use crate::xml::Element;

const SHELL: SectionShell = SectionShell {
    kind: SectionKind::Medications,
    code: MEDICATIONS_SECTION,
    title: "Medications",
    flag_empty: true,
    entry_type: Some("DRIV"),
};

const LAYOUT: TableLayout = TableLayout {
    parent_headers: &["Medication", "Dose", "Route", "Status", "Start", "Stop", "Instructions"],
    child_headers: &[],
    id_prefix: "medication",
    empty_message: "No known medications",
    no_children_message: "",
};

const INSTRUCTIONS_COLUMN: usize = 6;

pub struct MedicationsSection<'a, R> {
    records: &'a [R],
}

impl<'a, R: MedicationRecord> MedicationsSection<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self { records }
    }
}

fn medication_group<R: MedicationRecord>(
    ctx: &BuildContext<'_>,
    index: usize,
    medication: &R,
    reference_id: &str,
) -> CcdaResult<TableGroup> {
    let label = record_label("medication", index);
    let drug = required_display(&label, "drug", medication.drug(), medication.drug_text())?;
    let status = ClinicalStatus::inferred(medication.status(), medication.stop().is_some());
    let (status_label, status_element) = status_parts(status);
    let start = medication.start();
    let stop = medication.stop();

    let mut effective_time = Element::new("effectiveTime").attr("xsi:type", "IVL_TS");
    effective_time.push(ts_element("low", start));
    if let Some(stop) = stop {
        effective_time.push(ts_element("high", Some(stop)));
    }

    let mut activity = ctx
        .templated(
            "substanceAdministration",
            TemplateKind::Entry(EntryKind::MedicationActivity),
        )?
        .attr("classCode", "SBADM")
        .attr("moodCode", "EVN")
        .child(id_element(medication.id()))
        .child(text_reference(reference_id))
        .child(status_element)
        .child(effective_time);
    if let Some(route) = medication.route() {
        activity.push(coded_element("routeCode", route));
    }
    if let Some(dose) = medication.dose() {
        activity.push(
            Element::new("doseQuantity")
                .attr("value", dose.value.as_str())
                .attr_opt("unit", dose.unit.as_deref()),
        );
    }

    let product = ctx
        .templated(
            "manufacturedProduct",
            TemplateKind::Entry(EntryKind::MedicationInformation),
        )?
        .attr("classCode", "MANU")
        .child(
            Element::new("manufacturedMaterial")
                .child(material_code(medication.drug(), reference_id)),
        );
    activity.push(Element::new("consumable").child(product));

    let instructions = medication
        .instructions()
        .map(str::trim)
        .filter(|text| !text.is_empty());
    let mut cell_ids = Vec::new();
    if instructions.is_some() {
        let instructions_id = cell_reference(reference_id, "instructions");
        let instruction = instruction_act(ctx, None, None, &instructions_id)?;
        cell_ids.push((INSTRUCTIONS_COLUMN, instructions_id));
        activity.push(
            Element::new("entryRelationship")
                .attr("typeCode", "SUBJ")
                .attr("inversionInd", "true")
                .child(instruction),
        );
    }

    Ok(TableGroup {
        parent_cells: vec![
            drug.to_string(),
            medication.dose().map(|d| d.display()).unwrap_or_default(),
            medication
                .route()
                .map(|r| r.display_text().to_string())
                .unwrap_or_default(),
            status_label,
            start.map(|t| t.to_display()).unwrap_or_default(),
            stop.map(|t| t.to_display()).unwrap_or_default(),
            instructions.unwrap_or_default().to_string(),
        ],
        cell_ids,
        child_rows: Vec::new(),
        entry: activity,
    })
}

impl<R: MedicationRecord> Buildable for MedicationsSection<'_, R> {
    fn build(&self, ctx: &BuildContext<'_>) -> CcdaResult<Element> {
        let mut index = 0;
        let composition = compose_table(&LAYOUT, self.records, |medication, reference_id| {
            index += 1;
            medication_group(ctx, index, medication, reference_id)
        })?;
        section_element(ctx, &SHELL, composition)
    }
}

impl<R: MedicationRecord> SectionBuilder for MedicationsSection<'_, R> {
    fn kind(&self) -> SectionKind {
        SectionKind::Medications
    }
}
