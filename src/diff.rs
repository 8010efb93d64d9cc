//! Path Map Comparison
//!
//! Two engines over the flat representation:
//! - ordered: exact key/value comparison
//! - ignore-order: keys grouped by base path, values compared as multisets

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::debug;

use crate::map::PathMap;
use crate::path::{self, BufferPool};

/// Kind of discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiffKind {
    /// Present only in the left map
    LeftOnly,
    /// Present only in the right map
    RightOnly,
    /// Present in both with different values
    ValueMismatch,
}

/// One discrepancy between two maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub path: String,
    pub left: Option<String>,
    pub right: Option<String>,
    pub kind: DiffKind,
}

impl Diff {
    pub fn left_only(path: &str, value: &str) -> Self {
        Diff {
            path: path.to_string(),
            left: Some(value.to_string()),
            right: None,
            kind: DiffKind::LeftOnly,
        }
    }

    pub fn right_only(path: &str, value: &str) -> Self {
        Diff {
            path: path.to_string(),
            left: None,
            right: Some(value.to_string()),
            kind: DiffKind::RightOnly,
        }
    }

    pub fn mismatch(path: &str, left: &str, right: &str) -> Self {
        Diff {
            path: path.to_string(),
            left: Some(left.to_string()),
            right: Some(right.to_string()),
            kind: DiffKind::ValueMismatch,
        }
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = self.left.as_deref().unwrap_or("");
        let right = self.right.as_deref().unwrap_or("");
        match self.kind {
            DiffKind::LeftOnly => write!(f, "Extra path: {} (left value: {:?})", self.path, left),
            DiffKind::RightOnly => write!(f, "Missing path: {} (right value: {:?})", self.path, right),
            DiffKind::ValueMismatch => {
                write!(f, "Value mismatch at {}: {:?} != {:?}", self.path, left, right)
            }
        }
    }
}

fn sort_diffs(diffs: &mut [Diff]) {
    diffs.sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));
}

/// Exact comparison, sorted by path
pub fn diff(left: &PathMap, right: &PathMap) -> Vec<Diff> {
    let mut diffs = Vec::new();

    for (path, value) in left.iter() {
        match right.get(path) {
            None => diffs.push(Diff::left_only(path, value)),
            Some(other) if other != value => diffs.push(Diff::mismatch(path, value, other)),
            Some(_) => {}
        }
    }
    for (path, value) in right.iter() {
        if !left.contains_key(path) {
            diffs.push(Diff::right_only(path, value));
        }
    }

    sort_diffs(&mut diffs);
    debug!(left = left.len(), right = right.len(), diffs = diffs.len(), "ordered diff");
    diffs
}

pub fn equal(left: &PathMap, right: &PathMap) -> bool {
    left.len() == right.len() && left.iter().all(|(path, value)| right.get(path) == Some(value))
}

/// value -> concrete paths carrying it, per base path
type Groups<'m> = HashMap<String, HashMap<&'m str, Vec<&'m str>>>;

fn group_by_base_path<'m>(map: &'m PathMap, pool: &BufferPool) -> Groups<'m> {
    let mut groups: Groups<'m> = HashMap::with_capacity(map.len());
    let mut buf = pool.acquire();
    for (path, value) in map.iter() {
        buf.clear();
        path::push_base_path(&mut buf, path);
        groups
            .entry(buf.as_str().to_owned())
            .or_default()
            .entry(value)
            .or_default()
            .push(path);
    }
    groups
}

fn multisets_equal(a: &HashMap<&str, Vec<&str>>, b: &HashMap<&str, Vec<&str>>) -> bool {
    a.len() == b.len()
        && a.iter().all(|(value, paths)| b.get(value).map(Vec::len) == Some(paths.len()))
}

/// Cite `excess` occurrences of `value`, smallest paths first
fn cite_excess(paths: &[&str], excess: usize, value: &str, kind: DiffKind, diffs: &mut Vec<Diff>) {
    let mut sorted = paths.to_vec();
    sorted.sort_unstable();
    for path in sorted.into_iter().take(excess) {
        diffs.push(match kind {
            DiffKind::RightOnly => Diff::right_only(path, value),
            _ => Diff::left_only(path, value),
        });
    }
}

/// Report one side's surplus for a group, relative to the other side
fn collect_excess(
    side: &HashMap<&str, Vec<&str>>,
    other: Option<&HashMap<&str, Vec<&str>>>,
    kind: DiffKind,
    diffs: &mut Vec<Diff>,
) {
    // BTreeMap keeps the citation order independent of hash order
    let side: BTreeMap<_, _> = side.iter().collect();
    for (value, paths) in side {
        let matched = other
            .and_then(|o| o.get(value))
            .map(Vec::len)
            .unwrap_or(0);
        if paths.len() > matched {
            cite_excess(paths, paths.len() - matched, value, kind, diffs);
        }
    }
}

/// Order-insensitive comparison; mismatches show up as LeftOnly/RightOnly pairs
pub fn diff_ignore_order(left: &PathMap, right: &PathMap) -> Vec<Diff> {
    diff_ignore_order_with_pool(left, right, &BufferPool::new())
}

pub fn diff_ignore_order_with_pool(left: &PathMap, right: &PathMap, pool: &BufferPool) -> Vec<Diff> {
    let left_groups = group_by_base_path(left, pool);
    let right_groups = group_by_base_path(right, pool);
    let mut diffs = Vec::new();

    for (base, values) in &left_groups {
        let other = right_groups.get(base);
        if other.is_some_and(|o| multisets_equal(values, o)) {
            continue;
        }
        collect_excess(values, other, DiffKind::LeftOnly, &mut diffs);
        if let Some(other) = other {
            collect_excess(other, Some(values), DiffKind::RightOnly, &mut diffs);
        }
    }
    for (base, values) in &right_groups {
        if !left_groups.contains_key(base) {
            collect_excess(values, None, DiffKind::RightOnly, &mut diffs);
        }
    }

    sort_diffs(&mut diffs);
    debug!(
        left_groups = left_groups.len(),
        right_groups = right_groups.len(),
        diffs = diffs.len(),
        "ignore-order diff"
    );
    diffs
}

pub fn equal_ignore_order(left: &PathMap, right: &PathMap) -> bool {
    let pool = BufferPool::new();
    let left_groups = group_by_base_path(left, &pool);
    let right_groups = group_by_base_path(right, &pool);
    left_groups.len() == right_groups.len()
        && left_groups.iter().all(|(base, values)| {
            right_groups
                .get(base)
                .is_some_and(|o| multisets_equal(values, o))
        })
}
