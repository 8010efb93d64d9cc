//! Parse Options
//!
//! Two independent switches: namespace-prefix inclusion and an ordered
//! chain of value transforms.

use std::fmt;
use std::sync::Arc;

/// A pure string transform applied to captured values
pub type ValueTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone)]
pub struct ParseOptions {
    /// Keep `prefix:` on element and attribute names (default true)
    pub include_namespaces: bool,
    transforms: Vec<ValueTransform>,
}

impl ParseOptions {
    pub fn new() -> Self {
        ParseOptions {
            include_namespaces: true,
            transforms: Vec::new(),
        }
    }

    pub fn with_namespaces(mut self, include: bool) -> Self {
        self.include_namespaces = include;
        self
    }

    /// Append a transform; transforms run in registration order
    pub fn with_value_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn with_builtin(self, transform: BuiltinTransform) -> Self {
        match transform {
            BuiltinTransform::Trim => self.with_value_transform(|s| s.trim().to_string()),
            BuiltinTransform::Upcase => self.with_value_transform(str::to_uppercase),
            BuiltinTransform::Downcase => self.with_value_transform(str::to_lowercase),
        }
    }

    /// Run the transform chain over a captured value
    pub fn transform(&self, value: &str) -> String {
        match self.transforms.split_first() {
            None => value.to_string(),
            Some((first, rest)) => rest.iter().fold((**first)(value), |acc, f| (**f)(&acc)),
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("include_namespaces", &self.include_namespaces)
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

/// Named transforms selectable from the NIF surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTransform {
    Trim,
    Upcase,
    Downcase,
}
