//! ResourceArc Wrappers
//!
//! Keeps a parsed PathMap on the Rust side so its document-order and
//! namespace tables survive between calls.

use rustler::ResourceArc;

use crate::map::PathMap;

/// Parsed map held behind a ResourceArc; never mutated after creation
pub struct PathMapResource {
    pub map: PathMap,
}

impl PathMapResource {
    pub fn new(map: PathMap) -> Self {
        PathMapResource { map }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for PathMapResource {}

/// Type alias for the ResourceArc
pub type PathMapRef = ResourceArc<PathMapResource>;
