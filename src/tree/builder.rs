//! Tree Builder
//!
//! Resolves every key of a path map into (element chain, optional
//! attribute). Nodes are memoized by their indexed path, so `item[1]` and
//! `item[2]` become distinct siblings that both display as `item`.
//! Containers that carry no value of their own are synthesized on demand.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{sibling_order, NodeId, Tree, TreeAttribute, TreeNode};
use crate::error::{MapError, Result};
use crate::map::PathMap;
use crate::path::{self, BufferPool, ATTRIBUTE_MARKER, SEPARATOR};

/// Build the element tree for a map
pub fn build(map: &PathMap) -> Result<Tree> {
    build_with_pool(map, &BufferPool::new())
}

pub fn build_with_pool(map: &PathMap, pool: &BufferPool) -> Result<Tree> {
    if map.is_empty() {
        return Err(MapError::EmptyMap);
    }
    let root_segment = map
        .sorted_keys()
        .into_iter()
        .find_map(path::root_segment)
        .ok_or(MapError::NoRootFound)?;

    let mut builder = TreeBuilder::new(map, root_segment);

    let mut keys: Vec<&str> = map.keys().collect();
    keys.sort_by(|a, b| sibling_order(map.order_of(a), a, map.order_of(b), b));
    for key in keys {
        builder.place(key, pool);
    }

    debug!(
        entries = map.len(),
        nodes = builder.tree.len(),
        skipped = builder.skipped,
        "built element tree"
    );
    Ok(builder.tree)
}

struct TreeBuilder<'m> {
    map: &'m PathMap,
    root_segment: &'m str,
    tree: Tree,
    /// Indexed element path -> node
    index: HashMap<String, NodeId>,
    skipped: usize,
}

impl<'m> TreeBuilder<'m> {
    fn new(map: &'m PathMap, root_segment: &'m str) -> Self {
        let root_path = format!("{}{}", SEPARATOR, root_segment);
        let root = TreeNode::new(
            path::strip_index(root_segment),
            root_path.clone(),
            map.order_of(&root_path),
        );
        let mut index = HashMap::new();
        index.insert(root_path, Tree::ROOT);

        TreeBuilder {
            map,
            root_segment,
            tree: Tree {
                nodes: vec![root],
                namespaces: map.namespaces().to_vec(),
            },
            index,
            skipped: 0,
        }
    }

    fn place(&mut self, key: &'m str, pool: &BufferPool) {
        let Some(value) = self.map.get(key) else {
            return;
        };
        let (owner, attribute) = match path::split_attribute(key) {
            Some((owner, name)) => (owner, Some(name)),
            None => (key, None),
        };
        let Some(elements) = path::segments(owner) else {
            self.skip(key, "malformed path");
            return;
        };
        if elements[0] != self.root_segment {
            self.skip(key, "outside the root element");
            return;
        }
        if elements.iter().any(|s| s.starts_with(ATTRIBUTE_MARKER)) {
            self.skip(key, "attribute segment before the end");
            return;
        }
        if attribute == Some("") {
            self.skip(key, "empty attribute name");
            return;
        }

        let id = self.resolve(&elements, pool);
        let position = self.map.order_of(key);
        if let Some(node) = self.tree.node_mut(id) {
            match attribute {
                Some(name) => node.attributes.push(TreeAttribute {
                    name: name.to_string(),
                    value: value.to_string(),
                    path: key.to_string(),
                    position,
                }),
                None => node.value = Some(value.to_string()),
            }
        }
    }

    /// Walk from the root, creating any missing element along the way
    fn resolve(&mut self, segments: &[&str], pool: &BufferPool) -> NodeId {
        let mut current = Tree::ROOT;
        let mut buf = pool.acquire();
        buf.push(SEPARATOR);
        buf.push_str(self.root_segment);

        for segment in segments.iter().skip(1) {
            buf.push(SEPARATOR);
            buf.push_str(segment);
            current = match self.index.get(buf.as_str()) {
                Some(&id) => id,
                None => {
                    let node_path = buf.as_str().to_owned();
                    let node = TreeNode::new(
                        path::strip_index(segment),
                        node_path.clone(),
                        self.map.order_of(&node_path),
                    );
                    let id = self.tree.push(current, node);
                    self.index.insert(node_path, id);
                    id
                }
            };
        }
        current
    }

    fn skip(&mut self, key: &str, reason: &str) {
        warn!(path = key, reason, "skipping path map key");
        self.skipped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> PathMap {
        pairs.iter().copied().collect()
    }

    fn child_names(tree: &Tree, id: NodeId) -> Vec<String> {
        tree.sorted_children(id)
            .into_iter()
            .filter_map(|c| tree.get(c))
            .map(|n| n.name.clone())
            .collect()
    }

    #[test]
    fn test_empty_map() {
        assert_eq!(build(&PathMap::new()).unwrap_err(), MapError::EmptyMap);
    }

    #[test]
    fn test_no_root() {
        let err = build(&map(&[("nopath", "v")])).unwrap_err();
        assert_eq!(err, MapError::NoRootFound);
    }

    #[test]
    fn test_root_value_and_attribute() {
        let tree = build(&map(&[("/root", "v"), ("/root/@id", "1")])).unwrap();
        let root = tree.root();
        assert_eq!(root.name, "root");
        assert_eq!(root.value.as_deref(), Some("v"));
        assert_eq!(root.attributes.len(), 1);
        assert_eq!(root.attributes[0].name, "id");
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_indexed_siblings_stay_distinct() {
        let tree = build(&map(&[
            ("/root/items/item[1]/name", "a"),
            ("/root/items/item[2]/name", "b"),
            ("/root/items/item[1]/@id", "1"),
        ]))
        .unwrap();
        let items = tree.sorted_children(Tree::ROOT)[0];
        let item_ids = tree.sorted_children(items);
        assert_eq!(item_ids.len(), 2);

        let first = tree.get(item_ids[0]).unwrap();
        assert_eq!(first.name, "item");
        assert_eq!(first.path, "/root/items/item[1]");
        assert_eq!(first.attributes[0].value, "1");
        let second = tree.get(item_ids[1]).unwrap();
        assert_eq!(second.path, "/root/items/item[2]");
        assert!(second.attributes.is_empty());
    }

    #[test]
    fn test_containers_synthesized_once() {
        let tree = build(&map(&[
            ("/root/a/b/c", "1"),
            ("/root/a/b/d", "2"),
            ("/root/a/e", "3"),
        ]))
        .unwrap();
        // root, a, b, c, d, e
        assert_eq!(tree.len(), 6);
        assert_eq!(child_names(&tree, Tree::ROOT), vec!["a"]);
    }

    #[test]
    fn test_foreign_and_malformed_keys_skipped() {
        let tree = build(&map(&[
            ("/root/a", "1"),
            ("/zzz/b", "2"),
            ("/root//x", "3"),
            ("/root/@a/b", "4"),
        ]))
        .unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_attribute_keys_need_owner_and_name() {
        let tree = build(&map(&[
            ("/root/a", "1"),
            ("/root/a/@id", "x"),
            ("/root/a/@", "empty"),
            ("/@orphan", "o"),
        ]))
        .unwrap();
        let a = tree.get(tree.sorted_children(Tree::ROOT)[0]).unwrap();
        assert_eq!(a.attributes.len(), 1);
        assert_eq!(a.attributes[0].name, "id");
        assert!(tree.root().attributes.is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_recorded_positions_drive_child_order() {
        let mut m = map(&[("/root/z", "1"), ("/root/a", "2")]);
        m.set_order("/root", 0);
        m.set_order("/root/z", 1);
        m.set_order("/root/a", 2);
        let tree = build(&m).unwrap();
        assert_eq!(child_names(&tree, Tree::ROOT), vec!["z", "a"]);
    }

    #[test]
    fn test_fallback_child_order() {
        let tree = build(&map(&[
            ("/soap:Envelope/soap:Body/x", "1"),
            ("/soap:Envelope/soap:Header/y", "2"),
        ]))
        .unwrap();
        assert_eq!(
            child_names(&tree, Tree::ROOT),
            vec!["soap:Header", "soap:Body"]
        );
    }
}
