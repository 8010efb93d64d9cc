//! XmlSurf - XML to flat path maps and back
//!
//! A document becomes a map from slash paths to values:
//!
//! ```text
//! <root id="7"><item>a</item><item>b</item></root>
//!
//! /root/@id     => "7"
//! /root/item[1] => "a"
//! /root/item[2] => "b"
//! ```
//!
//! Components:
//! - parser: markup events to PathMap (namespaces, value transforms)
//! - tree: PathMap back to an element tree
//! - serialize: element tree to markup
//! - diff: ordered and order-insensitive comparison
//! - batch: parallel parse/diff via Rayon

use rustler::{Atom, Binary, Encoder, Env, NifResult, Term};

pub mod batch;
pub mod diff;
pub mod error;
pub mod map;
pub mod memory;
pub mod parser;
pub mod path;
pub mod reader;
pub mod resource;
pub mod serialize;
pub mod term;
pub mod tree;

pub use diff::{Diff, DiffKind};
pub use error::MapError;
pub use map::PathMap;
pub use parser::{parse_bytes, parse_str, ParseOptions};

use resource::{PathMapRef, PathMapResource};

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[rustler::nif]
fn get_rust_memory() -> usize {
    memory::current()
}

#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    memory::peak()
}

#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    memory::reset()
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse XML straight into an Elixir map
#[rustler::nif]
fn parse_to_map<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    include_namespaces: bool,
    transforms: Vec<Atom>,
) -> NifResult<Term<'a>> {
    let options = term::decode_options(include_namespaces, &transforms)?;
    match parser::parse_bytes(input.as_slice(), &options) {
        Ok(map) => Ok(term::ok_tuple(env, term::path_map_to_term(env, &map)?)),
        Err(e) => Ok(term::error_tuple(env, &e)),
    }
}

/// Parse XML and keep the result as a resource (order and namespaces retained)
#[rustler::nif]
fn parse<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    include_namespaces: bool,
    transforms: Vec<Atom>,
) -> NifResult<Term<'a>> {
    let options = term::decode_options(include_namespaces, &transforms)?;
    match parser::parse_bytes(input.as_slice(), &options) {
        Ok(map) => {
            let resource = PathMapRef::new(PathMapResource::new(map));
            Ok(term::ok_tuple(env, resource.encode(env)))
        }
        Err(e) => Ok(term::error_tuple(env, &e)),
    }
}

/// Parse many documents on the dirty scheduler; one result tuple per input
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_many<'a>(
    env: Env<'a>,
    inputs: Vec<Binary<'a>>,
    include_namespaces: bool,
    transforms: Vec<Atom>,
) -> NifResult<Term<'a>> {
    let options = term::decode_options(include_namespaces, &transforms)?;
    let slices: Vec<&[u8]> = inputs.iter().map(|b| b.as_slice()).collect();

    let mut results = Vec::with_capacity(slices.len());
    for result in batch::parse_many(&slices, &options) {
        let item = match result {
            Ok(map) => term::ok_tuple(env, term::path_map_to_term(env, &map)?),
            Err(e) => term::error_tuple(env, &e),
        };
        results.push(item);
    }
    Ok(results.encode(env))
}

// ============================================================================
// Resource Access
// ============================================================================

#[rustler::nif]
fn resource_to_map<'a>(env: Env<'a>, map_ref: PathMapRef) -> NifResult<Term<'a>> {
    term::path_map_to_term(env, &map_ref.map)
}

/// Serialize a parsed resource, using its recorded document order
#[rustler::nif]
fn resource_to_xml<'a>(env: Env<'a>, map_ref: PathMapRef, indent: bool) -> Term<'a> {
    xml_result(env, map_ref.map.to_xml(indent))
}

// ============================================================================
// Serialization
// ============================================================================

/// Serialize a plain Elixir map; sibling order falls back to path ranking
#[rustler::nif]
fn map_to_xml<'a>(env: Env<'a>, map: Term<'a>, indent: bool) -> NifResult<Term<'a>> {
    let map = term::decode_path_map(map)?;
    Ok(xml_result(env, map.to_xml(indent)))
}

fn xml_result<'a>(env: Env<'a>, result: error::Result<Vec<u8>>) -> Term<'a> {
    match result {
        Ok(xml) => term::ok_tuple(env, term::bytes_to_binary(env, &xml)),
        Err(e) => term::error_tuple(env, &e),
    }
}

// ============================================================================
// Comparison
// ============================================================================

#[rustler::nif]
fn diff_maps<'a>(env: Env<'a>, left: Term<'a>, right: Term<'a>) -> NifResult<Term<'a>> {
    let left = term::decode_path_map(left)?;
    let right = term::decode_path_map(right)?;
    Ok(term::diffs_to_term(env, &diff::diff(&left, &right)))
}

#[rustler::nif]
fn diff_maps_ignore_order<'a>(env: Env<'a>, left: Term<'a>, right: Term<'a>) -> NifResult<Term<'a>> {
    let left = term::decode_path_map(left)?;
    let right = term::decode_path_map(right)?;
    Ok(term::diffs_to_term(env, &diff::diff_ignore_order(&left, &right)))
}

/// Diff many `{left, right}` pairs on the dirty scheduler; one diff list per pair
#[rustler::nif(schedule = "DirtyCpu")]
fn diff_many<'a>(
    env: Env<'a>,
    pairs: Vec<(Term<'a>, Term<'a>)>,
    ignore_order: bool,
) -> NifResult<Term<'a>> {
    let mut decoded = Vec::with_capacity(pairs.len());
    for (left, right) in pairs {
        decoded.push((term::decode_path_map(left)?, term::decode_path_map(right)?));
    }

    let results: Vec<Term<'a>> = batch::diff_many(&decoded, ignore_order)
        .iter()
        .map(|diffs| term::diffs_to_term(env, diffs))
        .collect();
    Ok(results.encode(env))
}

#[rustler::nif]
fn maps_equal<'a>(left: Term<'a>, right: Term<'a>) -> NifResult<bool> {
    Ok(diff::equal(
        &term::decode_path_map(left)?,
        &term::decode_path_map(right)?,
    ))
}

#[rustler::nif]
fn maps_equal_ignore_order<'a>(left: Term<'a>, right: Term<'a>) -> NifResult<bool> {
    Ok(diff::equal_ignore_order(
        &term::decode_path_map(left)?,
        &term::decode_path_map(right)?,
    ))
}

rustler::init!("Elixir.XmlSurf.Native");
