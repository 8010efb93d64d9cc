//! Parallel Batch Operations
//!
//! Uses Rayon to run independent parses and diffs in parallel. The only
//! shared state is the buffer pool.

use rayon::prelude::*;

use crate::diff::{diff, diff_ignore_order_with_pool, Diff};
use crate::error::Result;
use crate::map::PathMap;
use crate::parser::{parse_events, ParseOptions};
use crate::path::BufferPool;
use crate::reader::SliceReader;

/// Parse many documents in parallel, results in input order
pub fn parse_many<B>(inputs: &[B], options: &ParseOptions) -> Vec<Result<PathMap>>
where
    B: AsRef<[u8]> + Sync,
{
    let pool = BufferPool::new();
    inputs
        .par_iter()
        .map(|input| parse_events(SliceReader::new(input.as_ref()), options, &pool))
        .collect()
}

/// Diff many (left, right) pairs in parallel
pub fn diff_many(pairs: &[(PathMap, PathMap)], ignore_order: bool) -> Vec<Vec<Diff>> {
    let pool = BufferPool::new();
    pairs
        .par_iter()
        .map(|(left, right)| {
            if ignore_order {
                diff_ignore_order_with_pool(left, right, &pool)
            } else {
                diff(left, right)
            }
        })
        .collect()
}
