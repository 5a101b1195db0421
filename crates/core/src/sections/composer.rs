//! Dual representation: one pass over a record set yields both the narrative block and the
//! coded entries.
//!
//! Two strategies are provided. [`compose_table`] renders one row per leaf record, spanning a
//! parent's identifying cells across its children. [`compose_list`] renders list items,
//! grouped under captions when any record carries a category. In both, the coded entry for a
//! record is produced by the same closure call that yields its narrative text, so the two
//! representations cannot drift apart.

use crate::constants::UNCATEGORIZED_LABEL;
use crate::error::CcdaResult;
use crate::xml::Element;
use std::collections::BTreeMap;

/// Narrative block plus coded entries, in narrative order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composition {
    pub text: Element,
    pub entries: Vec<Element>,
}

/// Column layout of a table section.
#[derive(Clone, Copy, Debug)]
pub struct TableLayout {
    pub parent_headers: &'static [&'static str],
    /// Empty for flat tables.
    pub child_headers: &'static [&'static str],
    /// Prefix of the per-row reference ids (`problem` gives `problem1`, `problem2`, ...).
    pub id_prefix: &'static str,
    /// Paragraph shown instead of a table when there are no records.
    pub empty_message: &'static str,
    /// Cell spanning the child columns of a parent without children.
    pub no_children_message: &'static str,
}

/// One top-level record's contribution to a table section.
#[derive(Clone, Debug)]
pub struct TableGroup {
    pub parent_cells: Vec<String>,
    /// Extra `ID`s for parent cells other than the first, by column.
    pub cell_ids: Vec<(usize, String)>,
    pub child_rows: Vec<Vec<String>>,
    pub entry: Element,
}

/// Reference id of the `index`-th (1-based) child row under `parent_id`.
pub fn child_reference(parent_id: &str, index: usize) -> String {
    format!("{parent_id}-{index}")
}

/// Reference id of a named parent cell, such as `medication1-instructions`.
pub fn cell_reference(parent_id: &str, name: &str) -> String {
    format!("{parent_id}-{name}")
}

/// Table strategy.
///
/// `group` receives each record and its 1-based reference id. The first parent cell carries
/// that id, the columns listed in [`TableGroup::cell_ids`] carry theirs, and the first cell of
/// each child row carries [`child_reference`].
pub fn compose_table<R>(
    layout: &TableLayout,
    records: &[R],
    mut group: impl FnMut(&R, &str) -> CcdaResult<TableGroup>,
) -> CcdaResult<Composition> {
    if records.is_empty() {
        return Ok(placeholder(layout.empty_message));
    }

    let spans_children = !layout.child_headers.is_empty();
    let mut body = Element::new("tbody");
    let mut entries = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let reference_id = format!("{}{}", layout.id_prefix, index + 1);
        let TableGroup {
            parent_cells,
            cell_ids,
            child_rows,
            entry,
        } = group(record, &reference_id)?;

        let span = child_rows.len().max(1).to_string();
        let mut first_row = Element::new("tr");
        for (column, cell) in parent_cells.into_iter().enumerate() {
            let mut td = Element::new("td");
            if column == 0 {
                td.set_attr("ID", reference_id.as_str());
            } else if let Some((_, id)) = cell_ids.iter().find(|(c, _)| *c == column) {
                td.set_attr("ID", id.as_str());
            }
            if spans_children {
                td.set_attr("rowspan", span.as_str());
            }
            first_row.push(td.text(cell));
        }

        let mut child_rows = child_rows.into_iter().enumerate();
        match child_rows.next() {
            Some((_, cells)) => {
                push_child_cells(&mut first_row, &child_reference(&reference_id, 1), cells);
                body.push(first_row);
            }
            None if spans_children => {
                first_row.push(
                    Element::new("td")
                        .attr("colspan", layout.child_headers.len().to_string())
                        .text(layout.no_children_message),
                );
                body.push(first_row);
            }
            None => body.push(first_row),
        }
        for (child_index, cells) in child_rows {
            let mut row = Element::new("tr");
            push_child_cells(&mut row, &child_reference(&reference_id, child_index + 1), cells);
            body.push(row);
        }

        entries.push(entry);
    }

    let header_row = Element::new("tr").children_from(
        layout
            .parent_headers
            .iter()
            .chain(layout.child_headers)
            .map(|title| Element::new("th").text(*title)),
    );
    let table = Element::new("table")
        .attr("border", "1")
        .attr("width", "100%")
        .child(Element::new("thead").child(header_row))
        .child(body);

    Ok(Composition {
        text: Element::new("text").child(table),
        entries,
    })
}

fn push_child_cells(row: &mut Element, reference_id: &str, cells: Vec<String>) {
    for (column, cell) in cells.into_iter().enumerate() {
        let td = if column == 0 {
            Element::new("td").attr("ID", reference_id)
        } else {
            Element::new("td")
        };
        row.push(td.text(cell));
    }
}

/// One list item's contribution to a list section.
#[derive(Clone, Debug)]
pub struct ListEntry {
    pub text: String,
    pub entry: Element,
}

/// Presentation settings of a list section.
#[derive(Clone, Copy, Debug)]
pub struct ListLayout {
    pub id_prefix: &'static str,
    pub empty_message: &'static str,
}

/// List strategy.
///
/// When any record has a category, records are grouped under one captioned list per
/// category, categories ascending, with uncategorized records last under
/// [`UNCATEGORIZED_LABEL`]. Otherwise a single list without caption is produced. Reference ids
/// and entries follow the narrative order.
pub fn compose_list<'r, R>(
    layout: &ListLayout,
    records: &'r [R],
    category: impl Fn(&'r R) -> Option<&'r str>,
    mut item: impl FnMut(&'r R, &str) -> CcdaResult<ListEntry>,
) -> CcdaResult<Composition> {
    if records.is_empty() {
        return Ok(placeholder(layout.empty_message));
    }

    let mut grouped: BTreeMap<&str, Vec<&R>> = BTreeMap::new();
    let mut uncategorized: Vec<&R> = Vec::new();
    for record in records {
        match category(record).map(str::trim) {
            Some(label) if !label.is_empty() && label != UNCATEGORIZED_LABEL => {
                grouped.entry(label).or_default().push(record)
            }
            _ => uncategorized.push(record),
        }
    }

    let groups: Vec<(Option<&str>, Vec<&R>)> = if grouped.is_empty() {
        vec![(None, uncategorized)]
    } else {
        let mut groups: Vec<_> = grouped
            .into_iter()
            .map(|(label, members)| (Some(label), members))
            .collect();
        if !uncategorized.is_empty() {
            groups.push((Some(UNCATEGORIZED_LABEL), uncategorized));
        }
        groups
    };

    let mut text = Element::new("text");
    let mut entries = Vec::with_capacity(records.len());
    let mut counter = 0;
    for (caption, members) in groups {
        let mut list = match caption {
            Some(caption) => Element::new("list").child(Element::new("caption").text(caption)),
            None => Element::new("list"),
        };
        for record in members {
            counter += 1;
            let reference_id = format!("{}{}", layout.id_prefix, counter);
            let ListEntry { text: item_text, entry } = item(record, &reference_id)?;
            list.push(Element::new("item").attr("ID", reference_id).text(item_text));
            entries.push(entry);
        }
        text.push(list);
    }

    Ok(Composition { text, entries })
}

fn placeholder(message: &str) -> Composition {
    Composition {
        text: Element::new("text").child(Element::new("paragraph").text(message)),
        entries: Vec::new(),
    }
}
