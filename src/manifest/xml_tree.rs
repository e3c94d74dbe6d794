//! Generic element tree for XML documents.
//!
//! Keeps every element with its attributes, regardless of schema, so that
//! metadata a structured parse drops (such as audio `lang`) can still be
//! found by walking the tree. Names are stored without namespace prefixes.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All elements named `name` below this node, in document order
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlNode> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// First direct child named `name`
    pub fn first_child_named(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }
}

/// Parse a whole document into its root element
pub fn parse_document(content: &str) -> Result<XmlNode, String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(element_node(e)?);
            }

            Ok(Event::Empty(ref e)) => {
                let node = element_node(e)?;
                attach(node, &mut stack, &mut root)?;
            }

            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| "closing tag without matching opening tag".to_string())?;
                attach(node, &mut stack, &mut root)?;
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(format!(
                    "XML parsing error at position {}: {e}",
                    reader.error_position()
                ));
            }

            _ => {} // text, comments, declarations
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unexpected end of document inside <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn attach(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(format!("second root element <{}>", node.name)),
    }
    Ok(())
}

fn element_node(element: &BytesStart) -> Result<XmlNode, String> {
    let name = std::str::from_utf8(element.local_name().as_ref())
        .map_err(|e| format!("Invalid UTF-8 in XML element name: {e}"))?
        .to_string();

    let mut attributes = HashMap::new();
    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(attr.key.local_name().as_ref()),
            std::str::from_utf8(&attr.value),
        ) {
            attributes.insert(key.to_string(), value.to_string());
        }
    }

    Ok(XmlNode {
        name,
        attributes,
        children: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let doc = parse_document(
            r#"<?xml version="1.0"?>
            <MPD xmlns="urn:mpeg:dash:schema:mpd:2011">
              <Period id="p0">
                <AdaptationSet lang="eng"><Representation id="7"/></AdaptationSet>
                <AdaptationSet lang="deu"><Representation id="8"></Representation></AdaptationSet>
              </Period>
            </MPD>"#,
        )
        .unwrap();

        assert_eq!(doc.name, "MPD");
        let sets = doc.descendants_named("AdaptationSet");
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[1].attribute("lang"), Some("deu"));
        assert_eq!(
            sets[0].first_child_named("Representation").and_then(|r| r.attribute("id")),
            Some("7")
        );
    }

    #[test]
    fn test_prefixed_names_are_stripped() {
        let doc = parse_document(r#"<mpd:MPD xmlns:mpd="urn:x"><mpd:Period mpd:id="1"/></mpd:MPD>"#)
            .unwrap();
        assert_eq!(doc.name, "MPD");
        assert_eq!(doc.children[0].name, "Period");
        assert_eq!(doc.children[0].attribute("id"), Some("1"));
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(parse_document("").is_err());
        assert!(parse_document("<MPD><Period></MPD>").is_err());
        assert!(parse_document("<MPD>").is_err());
        assert!(parse_document("<A/><B/>").is_err());
    }
}
