//! Error types shared by the parser, tree builder, serializer and NIF layer.

use thiserror::Error;

/// Errors produced by a single parse / build / serialize call.
///
/// Every error is terminal for the call that returned it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Malformed input: tokenizer failure, unclosed elements, multiple roots.
    #[error("XML syntax error: {0}")]
    Syntax(String),

    /// The event stream produced no entries.
    #[error("empty document: no content")]
    EmptyInput,

    /// Serialization was given a map with zero entries.
    #[error("empty path map")]
    EmptyMap,

    /// No key in the map has a well-formed first segment.
    #[error("no root element found")]
    NoRootFound,

    /// The markup emitter rejected an event.
    #[error("XML emit error: {0}")]
    Emit(String),
}

impl MapError {
    pub(crate) fn syntax(detail: impl Into<String>) -> Self {
        MapError::Syntax(detail.into())
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, MapError::Syntax(_))
    }

    pub fn is_empty_input(&self) -> bool {
        matches!(self, MapError::EmptyInput)
    }

    /// True for either of the serialization-side "nothing to write" errors.
    pub fn is_empty_map(&self) -> bool {
        matches!(self, MapError::EmptyMap | MapError::NoRootFound)
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            MapError::syntax("multiple root elements").to_string(),
            "XML syntax error: multiple root elements"
        );
        assert_eq!(MapError::NoRootFound.to_string(), "no root element found");
    }

    #[test]
    fn test_predicates() {
        assert!(MapError::syntax("x").is_syntax());
        assert!(MapError::EmptyInput.is_empty_input());
        assert!(MapError::EmptyMap.is_empty_map());
        assert!(MapError::NoRootFound.is_empty_map());
        assert!(!MapError::Emit("io".into()).is_empty_map());
    }
}
