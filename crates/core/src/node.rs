//! Buildable-node abstraction and the element helpers shared by every node type.
//!
//! A node is constructed with its inputs, asked for [`Buildable::build`] and discarded. The
//! [`BuildContext`] carries the one [`Version`] that governs the whole assembly together with
//! the template registry, so a node never decides its own release.

use crate::error::{CcdaError, CcdaResult};
use crate::records::{Address, CodedValue, PersistentId, PersonName, Telecom};
use crate::templates::{TemplateIdentifier, TemplateKind, TemplateRegistry, Version};
use crate::time::CdaTime;
use crate::vocabulary::{FixedCode, NullFlavor};
use crate::xml::Element;

/// Assembly-wide inputs threaded through every `build()` call.
#[derive(Clone, Copy, Debug)]
pub struct BuildContext<'r> {
    version: Version,
    registry: &'r TemplateRegistry,
}

impl<'r> BuildContext<'r> {
    pub fn new(version: Version, registry: &'r TemplateRegistry) -> Self {
        Self { version, registry }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn registry(&self) -> &'r TemplateRegistry {
        self.registry
    }

    /// `templateId` elements for `kind` at this context's version.
    pub fn template_ids(&self, kind: TemplateKind) -> CcdaResult<Vec<Element>> {
        let ids = self.registry.resolve(kind, self.version)?;
        Ok(ids.iter().map(template_id).collect())
    }

    /// New element whose first children are the template identifiers for `kind`.
    pub fn templated(&self, name: &str, kind: TemplateKind) -> CcdaResult<Element> {
        Ok(Element::new(name).children_from(self.template_ids(kind)?))
    }
}

/// A unit of document construction.
///
/// `build` is pure: calling it twice with the same context yields equal, independent trees.
pub trait Buildable {
    fn build(&self, ctx: &BuildContext<'_>) -> CcdaResult<Element>;

    fn serialize(&self, ctx: &BuildContext<'_>, pretty: bool) -> CcdaResult<String> {
        self.build(ctx)?.to_xml(pretty)
    }
}

pub(crate) fn template_id(id: &TemplateIdentifier) -> Element {
    Element::new("templateId")
        .attr("root", id.root())
        .attr_opt("extension", id.extension())
}

pub(crate) fn null_element(name: &str, flavor: NullFlavor) -> Element {
    Element::new(name).attr("nullFlavor", flavor.code())
}

/// `<id>` for a record identity, `nullFlavor="NI"` when the record has none.
pub(crate) fn id_element(id: Option<&PersistentId>) -> Element {
    match id {
        Some(id) => Element::new("id")
            .attr("root", id.root.as_str())
            .attr_opt("extension", id.extension.as_deref()),
        None => null_element("id", NullFlavor::NoInformation),
    }
}

/// One `<id>` per identity, or a single `nullFlavor="NI"` id for an empty list.
pub(crate) fn id_elements(ids: &[PersistentId]) -> Vec<Element> {
    if ids.is_empty() {
        return vec![id_element(None)];
    }
    ids.iter().map(|id| id_element(Some(id))).collect()
}

pub(crate) fn coded_element(name: &str, value: &CodedValue) -> Element {
    Element::new(name)
        .attr("code", value.code.as_str())
        .attr("codeSystem", value.system.oid())
        .attr_opt("codeSystemName", value.system.name())
        .attr_opt("displayName", value.display_name.as_deref())
}

pub(crate) fn fixed_code_element(name: &str, code: &FixedCode) -> Element {
    Element::new(name)
        .attr("code", code.code)
        .attr("codeSystem", code.system.oid())
        .attr_opt("codeSystemName", code.system.name())
        .attr("displayName", code.display)
}

/// Coded element, or `nullFlavor="UNK"` when the value is not provided.
pub(crate) fn coded_or_unknown(name: &str, value: Option<&CodedValue>) -> Element {
    match value {
        Some(value) => coded_element(name, value),
        None => null_element(name, NullFlavor::Unknown),
    }
}

pub(crate) fn status_code(code: &str) -> Element {
    Element::new("statusCode").attr("code", code)
}

pub(crate) fn name_element(name: &PersonName) -> Element {
    if name.is_empty() {
        return null_element("name", NullFlavor::Unknown);
    }
    let mut element = Element::new("name");
    if let Some(prefix) = &name.prefix {
        element.push(Element::new("prefix").text(prefix.as_str()));
    }
    for given in &name.given {
        element.push(Element::new("given").text(given.as_str()));
    }
    if let Some(family) = &name.family {
        element.push(Element::new("family").text(family.as_str()));
    }
    if let Some(suffix) = &name.suffix {
        element.push(Element::new("suffix").text(suffix.as_str()));
    }
    element
}

pub(crate) fn addr_elements(addresses: &[Address]) -> Vec<Element> {
    if addresses.is_empty() {
        return vec![null_element("addr", NullFlavor::Unknown)];
    }
    addresses
        .iter()
        .map(|address| {
            let mut addr = Element::new("addr").attr_opt("use", address.use_code.as_deref());
            for line in &address.street_lines {
                addr.push(Element::new("streetAddressLine").text(line.as_str()));
            }
            let parts = [
                ("city", &address.city),
                ("state", &address.state),
                ("postalCode", &address.postal_code),
                ("country", &address.country),
            ];
            for (tag, value) in parts {
                if let Some(value) = value {
                    addr.push(Element::new(tag).text(value.as_str()));
                }
            }
            addr
        })
        .collect()
}

pub(crate) fn telecom_elements(telecoms: &[Telecom]) -> Vec<Element> {
    if telecoms.is_empty() {
        return vec![null_element("telecom", NullFlavor::Unknown)];
    }
    telecoms
        .iter()
        .map(|telecom| {
            Element::new("telecom")
                .attr_opt("use", telecom.use_code.as_deref())
                .attr("value", telecom.value.as_str())
        })
        .collect()
}

/// Point-in-time element (`<time>`, `<birthTime>`, ...), `nullFlavor="UNK"` when absent.
pub(crate) fn ts_element(name: &str, time: Option<CdaTime>) -> Element {
    match time {
        Some(time) => Element::new(name).attr("value", time.to_ts()),
        None => null_element(name, NullFlavor::Unknown),
    }
}

/// `<effectiveTime>` interval. `low` degrades to `nullFlavor="UNK"`; `high` is omitted when
/// absent.
pub(crate) fn interval(low: Option<CdaTime>, high: Option<CdaTime>) -> Element {
    let element = Element::new("effectiveTime").child(ts_element("low", low));
    match high {
        Some(high) => element.child(ts_element("high", Some(high))),
        None => element,
    }
}

/// `<text><reference value="#id"/></text>` pointing at a narrative cell or item.
pub(crate) fn text_reference(reference_id: &str) -> Element {
    Element::new("text").child(reference(reference_id))
}

fn reference(reference_id: &str) -> Element {
    Element::new("reference").attr("value", format!("#{reference_id}"))
}

/// Code of a participating material (substance, drug), or `nullFlavor="OTH"` when only text
/// is known. Either way the narrative is linked through `originalText`.
pub(crate) fn material_code(value: Option<&CodedValue>, reference_id: &str) -> Element {
    let code = match value {
        Some(value) => coded_element("code", value),
        None => null_element("code", NullFlavor::Other),
    };
    code.child(Element::new("originalText").child(reference(reference_id)))
}

/// Observation value: coded when a code is available, otherwise plain text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ObservationValue<'a> {
    Coded(&'a CodedValue),
    Text(&'a str),
}

impl<'a> ObservationValue<'a> {
    /// Picks the code over the text and fails when neither is present.
    ///
    /// Blank text is treated as absent.
    pub fn resolve(
        record: &str,
        field: &'static str,
        code: Option<&'a CodedValue>,
        text: Option<&'a str>,
    ) -> CcdaResult<Self> {
        if let Some(code) = code {
            return Ok(ObservationValue::Coded(code));
        }
        match text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => Ok(ObservationValue::Text(text)),
            None => Err(missing(record, field)),
        }
    }

    /// Text for the narrative block.
    pub fn display(&self) -> &'a str {
        match *self {
            ObservationValue::Coded(code) => code.display_text(),
            ObservationValue::Text(text) => text,
        }
    }

    pub fn to_element(self) -> Element {
        match self {
            ObservationValue::Coded(code) => coded_element("value", code).attr("xsi:type", "CD"),
            ObservationValue::Text(text) => {
                Element::new("value").attr("xsi:type", "ST").text(text)
            }
        }
    }
}

/// Narrative text of a material whose code and free text are both optional, failing when
/// neither is present.
pub(crate) fn required_display<'a>(
    record: &str,
    field: &'static str,
    code: Option<&'a CodedValue>,
    text: Option<&'a str>,
) -> CcdaResult<&'a str> {
    ObservationValue::resolve(record, field, code, text).map(|value| value.display())
}

pub(crate) fn missing(record: &str, field: &'static str) -> CcdaError {
    tracing::warn!(record, field, "record has no displayable value");
    CcdaError::MissingRequiredData {
        record: record.to_string(),
        field,
    }
}
