//! Serializer
//!
//! Depth-first emission of a [`Tree`] through `quick_xml::Writer`.
//! Uses an explicit stack instead of recursion so deep documents cannot
//! overflow. No prolog is written.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::error::{MapError, Result};
use crate::tree::{NodeId, Tree};

enum Step {
    Enter(NodeId),
    Close(NodeId),
}

/// Write the tree as markup, indenting two spaces per level when asked
pub fn serialize(tree: &Tree, indent: bool) -> Result<Vec<u8>> {
    let mut writer = if indent {
        Writer::new_with_indent(Vec::with_capacity(1024), b' ', 2)
    } else {
        Writer::new(Vec::with_capacity(1024))
    };

    let mut stack: Vec<Step> = Vec::with_capacity(64);
    stack.push(Step::Enter(Tree::ROOT));

    while let Some(step) = stack.pop() {
        match step {
            Step::Close(id) => {
                if let Some(node) = tree.get(id) {
                    emit(&mut writer, Event::End(BytesEnd::new(node.name.as_str())))?;
                }
            }
            Step::Enter(id) => {
                let Some(node) = tree.get(id) else {
                    continue;
                };

                // Stored names are already `prefix:local`, written as the qualified tag
                let mut start = BytesStart::new(node.name.as_str());
                if id == Tree::ROOT {
                    push_namespace_declarations(tree, &mut start);
                }
                for attr in &node.attributes {
                    start.push_attribute((attr.name.as_str(), attr.value.as_str()));
                }
                emit(&mut writer, Event::Start(start))?;

                if let Some(value) = node.value.as_deref().filter(|v| !v.is_empty()) {
                    emit(&mut writer, Event::Text(BytesText::new(value)))?;
                }

                // Close first so it runs after every child
                stack.push(Step::Close(id));
                for child in tree.sorted_children(id).into_iter().rev() {
                    stack.push(Step::Enter(child));
                }
            }
        }
    }

    let output = writer.into_inner();
    debug!(nodes = tree.len(), bytes = output.len(), indent, "serialized tree");
    Ok(output)
}

/// Declare every recorded namespace on the root unless the map already
/// carries that declaration as an attribute
fn push_namespace_declarations(tree: &Tree, start: &mut BytesStart<'_>) {
    let root = tree.root();
    for (prefix, uri) in tree.namespaces() {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        if root.attributes.iter().any(|a| a.name == key) {
            continue;
        }
        start.push_attribute((key.as_str(), uri.as_str()));
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| MapError::Emit(e.to_string()))
}
