//! Path Codec
//!
//! Pure functions over path strings of the form `/a/b[2]/c/@attr`:
//! building, splitting, index stripping and sibling ordering.
//! No state lives here except the scratch [`pool::BufferPool`].

pub mod pool;

use memchr::memchr;
use std::cmp::Ordering;

pub use pool::{BufferPool, PooledBuffer};

/// Segment separator
pub const SEPARATOR: char = '/';
/// Prefix marking an attribute segment
pub const ATTRIBUTE_MARKER: char = '@';

/// Well-known tag-name fragments with a fixed sibling rank.
///
/// Checked in this order: exact match first, then the first entry the
/// segment name contains.
const WELL_KNOWN_RANKS: &[(&str, u8)] = &[
    ("Header", 1),
    ("Body", 2),
    ("Username", 1),
    ("Token", 2),
    ("child", 1),
    ("another", 2),
];

/// One decomposed path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Name without index suffix or `@` marker (may contain `prefix:`)
    pub name: &'a str,
    /// 1-based index from a `[n]` suffix
    pub index: Option<u32>,
    /// True for a trailing `@name` segment
    pub is_attribute: bool,
}

impl<'a> Segment<'a> {
    pub fn parse(raw: &'a str) -> Self {
        if let Some(name) = raw.strip_prefix(ATTRIBUTE_MARKER) {
            return Segment {
                name,
                index: None,
                is_attribute: true,
            };
        }
        match memchr(b'[', raw.as_bytes()) {
            Some(pos) => Segment {
                name: &raw[..pos],
                index: raw[pos + 1..]
                    .strip_suffix(']')
                    .and_then(|n| n.parse().ok()),
                is_attribute: false,
            },
            None => Segment {
                name: raw,
                index: None,
                is_attribute: false,
            },
        }
    }
}

/// Split a path into its raw segments.
///
/// Returns `None` unless the path is well formed: a leading `/` followed
/// by at least one segment, with no empty segments.
pub fn segments(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix(SEPARATOR)?;
    let parts: Vec<&str> = rest.split(SEPARATOR).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

/// First segment of a well-formed path
pub fn root_segment(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(SEPARATOR)?;
    let end = memchr(b'/', rest.as_bytes()).unwrap_or(rest.len());
    let first = &rest[..end];
    (!first.is_empty() && !first.starts_with(ATTRIBUTE_MARKER)).then_some(first)
}

/// Number of segments
pub fn depth(path: &str) -> usize {
    path.trim_start_matches(SEPARATOR)
        .split(SEPARATOR)
        .filter(|s| !s.is_empty())
        .count()
}

/// Drop a trailing `[n]` from a segment
#[inline]
pub fn strip_index(segment: &str) -> &str {
    match memchr(b'[', segment.as_bytes()) {
        Some(pos) => &segment[..pos],
        None => segment,
    }
}

/// Split `prefix:local` at the first colon
#[inline]
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match memchr(b':', name.as_bytes()) {
        Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
        None => (None, name),
    }
}

/// If the path ends in an attribute segment, return (owner path, attribute name)
pub fn split_attribute(path: &str) -> Option<(&str, &str)> {
    let pos = path.rfind(SEPARATOR)?;
    let attr = path[pos + 1..].strip_prefix(ATTRIBUTE_MARKER)?;
    Some((&path[..pos], attr))
}

/// Write `parent/name` into `buf`
pub fn push_child(buf: &mut String, parent: &str, name: &str) {
    buf.push_str(parent);
    buf.push(SEPARATOR);
    buf.push_str(name);
}

/// Write `parent/name[index]` into `buf`
pub fn push_indexed_child(buf: &mut String, parent: &str, name: &str, index: u32) {
    use std::fmt::Write;
    push_child(buf, parent, name);
    // Writing into a String cannot fail
    let _ = write!(buf, "[{}]", index);
}

/// Write `owner/@name` into `buf`
pub fn push_attribute(buf: &mut String, owner: &str, name: &str) {
    buf.push_str(owner);
    buf.push(SEPARATOR);
    buf.push(ATTRIBUTE_MARKER);
    buf.push_str(name);
}

/// Write the base path (every `[n]` removed, attribute segment kept) into `buf`
pub fn push_base_path(buf: &mut String, path: &str) {
    for part in path.split(SEPARATOR).filter(|p| !p.is_empty()) {
        buf.push(SEPARATOR);
        if part.starts_with(ATTRIBUTE_MARKER) {
            buf.push_str(part);
        } else {
            buf.push_str(strip_index(part));
        }
    }
}

/// Fixed rank of a well-known tag name, 0 when unranked
pub fn well_known_rank(name: &str) -> u8 {
    let local = strip_index(name);
    if let Some(&(_, rank)) = WELL_KNOWN_RANKS.iter().find(|(n, _)| *n == local) {
        return rank;
    }
    WELL_KNOWN_RANKS
        .iter()
        .find(|(n, _)| local.contains(n))
        .map(|&(_, rank)| rank)
        .unwrap_or(0)
}

#[inline]
fn segment_key(raw: &str) -> (u8, &str, u32) {
    let seg = Segment::parse(raw);
    (well_known_rank(seg.name), seg.name, seg.index.unwrap_or(0))
}

/// Fallback sibling ordering for paths without a recorded document position.
///
/// Shallower paths first; at equal depth the first differing segment decides
/// by (well-known rank, name, numeric index). Unranked names sort before
/// ranked ones so the order stays total.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    let depth_a = depth(a);
    let depth_b = depth(b);
    if depth_a != depth_b {
        return depth_a.cmp(&depth_b);
    }

    let parts_a = a.split(SEPARATOR).filter(|s| !s.is_empty());
    let parts_b = b.split(SEPARATOR).filter(|s| !s.is_empty());
    for (pa, pb) in parts_a.zip(parts_b) {
        if pa != pb {
            let ord = segment_key(pa).cmp(&segment_key(pb));
            if ord != Ordering::Equal {
                return ord;
            }
            return pa.cmp(pb);
        }
    }
    a.cmp(b)
}
