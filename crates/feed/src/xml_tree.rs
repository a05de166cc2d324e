// ABOUTME: Navigable XML element tree built on quick-xml events.
// ABOUTME: Gives the parsers htmlparser2-style random access: find by tag, attributes, text content.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::FeedError;
use crate::html_text::decode_entities;
use crate::time_parse::parse_flexible_time;

/// A node in the parsed document: an element or a run of character data.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its qualified name (prefix included, e.g.
/// `dc:creator`), attributes and child nodes in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The value of an attribute, matched by its qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// The first descendant element with the given tag name, depth-first.
    /// With `recurse` false only direct children are considered.
    pub fn find_first(&self, tag: &str, recurse: bool) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == tag {
                return Some(child);
            }
            if recurse {
                if let Some(found) = child.find_first(tag, true) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All descendant elements with the given tag name, in document order.
    pub fn find_all(&self, tag: &str, recurse: bool) -> Vec<&Element> {
        self.find_matching(&|name| name == tag, recurse)
    }

    /// All descendant elements whose tag name satisfies the predicate,
    /// depth-first preorder. Matched elements are descended into as well.
    pub fn find_matching<'a>(
        &'a self,
        pred: &dyn Fn(&str) -> bool,
        recurse: bool,
    ) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.collect_matching(pred, recurse, &mut out);
        out
    }

    fn collect_matching<'a>(
        &'a self,
        pred: &dyn Fn(&str) -> bool,
        recurse: bool,
        out: &mut Vec<&'a Element>,
    ) {
        for child in self.child_elements() {
            if pred(&child.name) {
                out.push(child);
            }
            if recurse {
                child.collect_matching(pred, true, out);
            }
        }
    }

    /// Concatenated text of all descendant text nodes, trimmed.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Text content of the first matching descendant; empty text counts
    /// as absent so `or_else` chains mirror string-falsiness fallbacks.
    pub fn text_of(&self, tag: &str, recurse: bool) -> Option<String> {
        let text = self.find_first(tag, recurse)?.text_content();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Text content of the first matching descendant parsed as an instant.
    pub fn date_of(&self, tag: &str, recurse: bool) -> Option<DateTime<Utc>> {
        self.text_of(tag, recurse)
            .and_then(|s| parse_flexible_time(&s))
    }

    /// Text content of the first matching descendant parsed as a number.
    pub fn number_of(&self, tag: &str, recurse: bool) -> Option<u32> {
        self.text_of(tag, recurse).and_then(|s| s.parse().ok())
    }
}

/// Parses an XML document into a synthetic root element whose children are
/// the document's top-level nodes. Whitespace-only text between elements is
/// discarded; CDATA is kept verbatim.
pub fn parse(text: &str) -> Result<Element, FeedError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = vec![Element::new("#document".to_string())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = element_from_start(&e);
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e);
                append_node(&mut stack, Node::Element(element))?;
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(FeedError::Parse("unbalanced end tag".to_string()));
                }
                if let Some(element) = stack.pop() {
                    append_node(&mut stack, Node::Element(element))?;
                }
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(&e).into_owned();
                if !raw.trim().is_empty() {
                    let text = match quick_xml::escape::unescape(&raw) {
                        Ok(unescaped) => unescaped.into_owned(),
                        Err(_) => raw,
                    };
                    append_node(&mut stack, Node::Text(text))?;
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_node(&mut stack, Node::Text(text))?;
            }
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(&e).into_owned();
                if let Some(resolved) = resolve_reference(&name) {
                    append_node(&mut stack, Node::Text(resolved))?;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(FeedError::parse(err)),
            Ok(_) => {}
        }
    }

    if stack.len() != 1 {
        return Err(FeedError::Parse("unclosed element".to_string()));
    }
    stack
        .pop()
        .ok_or_else(|| FeedError::Parse("empty document".to_string()))
}

fn element_from_start(e: &quick_xml::events::BytesStart<'_>) -> Element {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = match quick_xml::escape::unescape(&raw) {
            Ok(unescaped) => unescaped.into_owned(),
            Err(_) => raw,
        };
        element.attrs.push((key, value));
    }
    element
}

fn append_node(stack: &mut [Element], node: Node) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => Err(FeedError::Parse("node outside document".to_string())),
    }
}

/// Resolves a general entity or character reference by its name (the part
/// between `&` and `;`). Unknown references are dropped.
fn resolve_reference(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        _ => {
            if let Some(num) = name.strip_prefix('#') {
                let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
                    u32::from_str_radix(hex, 16).ok()?
                } else {
                    num.parse::<u32>().ok()?
                };
                return char::from_u32(code).map(|c| c.to_string());
            }
            // HTML-named entities show up in feeds without a DTD declaring them.
            let decoded = decode_entities(&format!("&{};", name));
            if decoded.starts_with('&') {
                None
            } else {
                Some(decoded)
            }
        }
    }
}
