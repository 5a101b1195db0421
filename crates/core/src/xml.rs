//! Minimal owned XML tree and its serialization.
//!
//! Nodes are built bottom-up by the buildable types and appended into exactly one parent.
//! Serialization goes through the `quick-xml` writer, which handles escaping and (when
//! requested) indentation.

use crate::error::{CcdaError, CcdaResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Child of an [`Element`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter. Setting an existing attribute replaces its value.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Sets the attribute only when `value` is present.
    pub fn attr_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Builder-style child append.
    pub fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn children_from(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    /// Builder-style text append.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Child elements with the given name.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |element| element.name == name)
    }

    pub fn first(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Follows a path of child names, taking the first match at each step.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |current, name| current.first(name))
    }

    /// Concatenated direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Serializes this element (and its subtree) without an XML declaration.
    pub fn to_xml(&self, pretty: bool) -> CcdaResult<String> {
        let mut writer = new_writer(pretty);
        self.write_to(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Serializes with a leading `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub fn to_xml_document(&self, pretty: bool) -> CcdaResult<String> {
        let mut writer = new_writer(pretty);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        self.write_to(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> CcdaResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        for node in &self.children {
            match node {
                Node::Element(element) => element.write_to(writer)?,
                Node::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(write_error)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_error)
    }
}

fn new_writer(pretty: bool) -> Writer<Vec<u8>> {
    if pretty {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    }
}

fn write_error(err: impl std::fmt::Display) -> CcdaError {
    CcdaError::Serialization(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("section")
            .child(Element::new("templateId").attr("root", "2.16.840.1.113883.10.20.22.2.57"))
            .child(Element::new("title").text("Diet & Nutrition"))
    }

    #[test]
    fn compact_output_escapes_text_and_attributes() {
        let element = Element::new("value")
            .attr("displayName", "Fish & \"shellfish\"")
            .text("<1>");
        let xml = element.to_xml(false).expect("serialize");
        assert_eq!(
            xml,
            "<value displayName=\"Fish &amp; &quot;shellfish&quot;\">&lt;1&gt;</value>"
        );
    }

    #[test]
    fn pretty_output_keeps_text_inline() {
        let xml = sample().to_xml(true).expect("serialize");
        assert_eq!(
            xml,
            "<section>\n  <templateId root=\"2.16.840.1.113883.10.20.22.2.57\"/>\n  <title>Diet &amp; Nutrition</title>\n</section>"
        );
    }

    #[test]
    fn declaration_precedes_root() {
        let xml = sample().to_xml_document(false).expect("serialize");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.ends_with("</section>"));
    }

    #[test]
    fn set_attr_replaces_existing_value() {
        let element = Element::new("td").attr("rowspan", "1").attr("rowspan", "3");
        assert_eq!(element.attribute("rowspan"), Some("3"));
        assert_eq!(element.to_xml(false).unwrap(), "<td rowspan=\"3\"/>");
    }

    #[test]
    fn find_path_walks_first_matches() {
        let doc = Element::new("a").child(Element::new("b").child(Element::new("c").text("x")));
        assert_eq!(doc.find_path(&["b", "c"]).map(Element::text_content), Some("x".into()));
        assert!(doc.find_path(&["b", "missing"]).is_none());
    }
}
