//! XML Event Types
//!
//! Owned events handed from the tokenizer adapter to the path parser.

use crate::path::split_qname;

/// XML parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Start of an element: <name attrs...>
    StartElement(StartElement),
    /// End of an element: </name>
    EndElement(EndElement),
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement),
    /// Text content between tags (entities decoded)
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment
    Comment,
    /// Processing instruction: <?target data?>
    ProcessingInstruction,
    /// XML declaration: <?xml version="1.0"?>
    Declaration,
    /// DOCTYPE declaration
    DocType,
}

/// A parsed attribute with its value unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `xmlns` or `xmlns:prefix`
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }

    /// Prefix bound by a namespace declaration ("" for the default namespace)
    pub fn declared_prefix(&self) -> Option<&str> {
        if self.name == "xmlns" {
            Some("")
        } else {
            self.name.strip_prefix("xmlns:")
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }
}

/// Start element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Full element name (may include prefix)
    pub name: String,
    /// Element attributes, namespace declarations included
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        StartElement {
            name: name.into(),
            attributes,
        }
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    /// Local name (after colon)
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }
}

/// End element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement {
    pub name: String,
}

impl EndElement {
    pub fn new(name: impl Into<String>) -> Self {
        EndElement { name: name.into() }
    }
}

// Shorthand constructors for hand-built event streams in tests
#[cfg(test)]
impl XmlEvent {
    pub fn start(name: &str, attributes: &[(&str, &str)]) -> Self {
        XmlEvent::StartElement(StartElement::new(
            name,
            attributes
                .iter()
                .map(|(k, v)| Attribute::new(*k, *v))
                .collect(),
        ))
    }

    pub fn end(name: &str) -> Self {
        XmlEvent::EndElement(EndElement::new(name))
    }

    pub fn text(content: &str) -> Self {
        XmlEvent::Text(content.to_string())
    }
}
