//! Element Arena
//!
//! Records elements in document order while the event stream is read.
//! Keys are only produced once the whole stream has been seen, so a
//! segment carries `[n]` exactly when its (parent, name) group ended up
//! with two or more members. No key is ever written and then renamed.

use std::collections::HashMap;

use crate::map::PathMap;
use crate::path::{self, BufferPool};

/// Index of an element in the arena
pub type ElementId = usize;

#[derive(Debug)]
struct ElementRecord {
    parent: Option<ElementId>,
    name: String,
    /// 1-based position among same-named siblings
    ordinal: u32,
    /// Global document position
    position: u64,
    text: Option<String>,
    /// (name, value, position)
    attributes: Vec<(String, String, u64)>,
}

#[derive(Debug, Default)]
pub struct ElementArena {
    elements: Vec<ElementRecord>,
    /// Members per (parent, resolved name)
    group_sizes: HashMap<(Option<ElementId>, String), u32>,
    next_position: u64,
}

impl ElementArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_position(&mut self) -> u64 {
        let position = self.next_position;
        self.next_position += 1;
        position
    }

    /// Record a newly opened element under `parent`
    pub fn open(&mut self, parent: Option<ElementId>, name: String) -> ElementId {
        let size = self
            .group_sizes
            .entry((parent, name.clone()))
            .or_insert(0);
        *size += 1;
        let ordinal = *size;
        let position = self.next_position();

        let id = self.elements.len();
        self.elements.push(ElementRecord {
            parent,
            name,
            ordinal,
            position,
            text: None,
            attributes: Vec::new(),
        });
        id
    }

    /// Store an attribute value; a repeated name overwrites the earlier value
    pub fn add_attribute(&mut self, id: ElementId, name: String, value: String) {
        let position = self.next_position();
        if let Some(element) = self.elements.get_mut(id) {
            match element.attributes.iter_mut().find(|(n, _, _)| *n == name) {
                Some(existing) => existing.1 = value,
                None => element.attributes.push((name, value, position)),
            }
        }
    }

    /// Store text for an element, replacing any earlier text run
    pub fn set_text(&mut self, id: ElementId, value: String) {
        if let Some(element) = self.elements.get_mut(id) {
            element.text = Some(value);
        }
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.elements.get(id).map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Assign final keys and emit the map
    pub fn into_path_map(self, pool: &BufferPool) -> PathMap {
        let mut map = PathMap::with_capacity(self.elements.len());
        let mut paths: Vec<String> = Vec::with_capacity(self.elements.len());

        for element in &self.elements {
            // Parents always precede their children in the arena
            let parent_path = element.parent.map(|p| paths[p].as_str()).unwrap_or("");
            let group = self
                .group_sizes
                .get(&(element.parent, element.name.clone()))
                .copied()
                .unwrap_or(1);

            let mut buf = pool.acquire();
            if group >= 2 {
                path::push_indexed_child(&mut buf, parent_path, &element.name, element.ordinal);
            } else {
                path::push_child(&mut buf, parent_path, &element.name);
            }
            let element_path = buf.as_str().to_owned();
            drop(buf);

            map.set_order(element_path.as_str(), element.position);
            for (name, value, position) in &element.attributes {
                let mut attr_path = pool.acquire();
                path::push_attribute(&mut attr_path, &element_path, name);
                map.set_order(attr_path.as_str(), *position);
                map.insert(attr_path.as_str(), value.as_str());
            }
            if let Some(text) = &element.text {
                map.insert(element_path.as_str(), text.as_str());
            }
            paths.push(element_path);
        }

        map
    }
}
