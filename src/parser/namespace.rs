//! Namespace Scope
//!
//! Stack-based prefix resolver. Bindings declared on an element shadow
//! inherited ones and disappear when the element closes.

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

#[derive(Debug, Clone)]
struct NsBinding {
    prefix: String,
    uri: String,
    depth: u32,
}

#[derive(Debug)]
pub struct NamespaceScope {
    bindings: Vec<NsBinding>,
    depth: u32,
}

impl NamespaceScope {
    /// New scope with the `xml` prefix pre-bound
    pub fn new() -> Self {
        NamespaceScope {
            bindings: vec![NsBinding {
                prefix: "xml".to_string(),
                uri: ns::XML.to_string(),
                depth: 0,
            }],
            depth: 0,
        }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a binding in the current scope; "" is the default namespace
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if prefix == "xml" || prefix == "xmlns" {
            return;
        }
        self.bindings.push(NsBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            depth: self.depth,
        });
    }

    /// Resolve a prefix to its URI, innermost binding first
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
            // An empty URI undeclares the prefix
            .filter(|uri| !uri.is_empty())
    }
}

impl Default for NamespaceScope {
    fn default() -> Self {
        Self::new()
    }
}
