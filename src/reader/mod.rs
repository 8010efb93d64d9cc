//! XML Reader Module
//!
//! - Events: owned XML event types consumed by the path parser
//! - SliceReader: quick-xml backed event source over a byte slice

pub mod events;
pub mod slice;

pub use events::{Attribute, EndElement, StartElement, XmlEvent};
pub use slice::SliceReader;
