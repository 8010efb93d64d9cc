//! Slice Reader
//!
//! Pulls raw events from a `quick_xml::Reader` over a byte slice and turns
//! them into owned [`XmlEvent`]s. Tokenizer failures surface as
//! [`MapError::Syntax`] carrying the tokenizer's message and byte offset.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::events::{Attribute, EndElement, StartElement, XmlEvent};
use crate::error::{MapError, Result};

/// Event reader over an in-memory document
pub struct SliceReader<'a> {
    reader: Reader<&'a [u8]>,
    finished: bool,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            reader: Reader::from_reader(input),
            finished: false,
        }
    }

    /// Get the next XML event, `None` at end of input
    pub fn next_event(&mut self) -> Option<Result<XmlEvent>> {
        if self.finished {
            return None;
        }
        let event = match self.reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                self.finished = true;
                return Some(Err(self.syntax_error(e)));
            }
        };

        let converted = match event {
            Event::Start(e) => self.start_element(&e).map(XmlEvent::StartElement),
            Event::Empty(e) => self.start_element(&e).map(XmlEvent::EmptyElement),
            Event::End(e) => {
                utf8(e.name().as_ref()).map(|n| XmlEvent::EndElement(EndElement::new(n)))
            }
            Event::Text(e) => e
                .unescape()
                .map(|t| XmlEvent::Text(t.into_owned()))
                .map_err(|err| self.syntax_error(err)),
            Event::CData(e) => utf8(&e).map(|t| XmlEvent::CData(t.to_string())),
            Event::Comment(_) => Ok(XmlEvent::Comment),
            Event::PI(_) => Ok(XmlEvent::ProcessingInstruction),
            Event::Decl(_) => Ok(XmlEvent::Declaration),
            Event::DocType(_) => Ok(XmlEvent::DocType),
            Event::Eof => {
                self.finished = true;
                return None;
            }
        };

        if converted.is_err() {
            self.finished = true;
        }
        Some(converted)
    }

    fn start_element(&self, e: &BytesStart<'_>) -> Result<StartElement> {
        let name = utf8(e.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.syntax_error(err))?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| self.syntax_error(err))?
                .into_owned();
            attributes.push(Attribute::new(key, value));
        }
        Ok(StartElement::new(name, attributes))
    }

    fn syntax_error(&self, err: impl std::fmt::Display) -> MapError {
        MapError::syntax(format!(
            "{} at position {}",
            err,
            self.reader.buffer_position()
        ))
    }
}

impl Iterator for SliceReader<'_> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| MapError::syntax(format!("invalid UTF-8: {}", e)))
}
