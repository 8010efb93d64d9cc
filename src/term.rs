//! Elixir Term Conversion Utilities
//!
//! Converts path maps, diffs and errors to Elixir terms and back.

use rustler::types::map::MapIterator;
use rustler::{Atom, Encoder, Env, NewBinary, NifResult, Term};

use crate::diff::{Diff, DiffKind};
use crate::error::MapError;
use crate::map::PathMap;
use crate::parser::{BuiltinTransform, ParseOptions};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    left_only,
    right_only,
    value_mismatch,
    trim,
    upcase,
    downcase,
}

/// Build parse options from the NIF arguments
pub fn decode_options(include_namespaces: bool, transforms: &[Atom]) -> NifResult<ParseOptions> {
    let mut options = ParseOptions::new().with_namespaces(include_namespaces);
    for &t in transforms {
        let builtin = if t == trim() {
            BuiltinTransform::Trim
        } else if t == upcase() {
            BuiltinTransform::Upcase
        } else if t == downcase() {
            BuiltinTransform::Downcase
        } else {
            return Err(rustler::Error::BadArg);
        };
        options = options.with_builtin(builtin);
    }
    Ok(options)
}

/// Decode an Elixir map of binaries into a PathMap
pub fn decode_path_map(term: Term<'_>) -> NifResult<PathMap> {
    let iter = MapIterator::new(term).ok_or(rustler::Error::BadArg)?;
    let mut map = PathMap::new();
    for (key, value) in iter {
        map.insert(key.decode::<String>()?, value.decode::<String>()?);
    }
    Ok(map)
}

/// Convert a PathMap to an Elixir map of binaries
pub fn path_map_to_term<'a>(env: Env<'a>, map: &PathMap) -> NifResult<Term<'a>> {
    let pairs: Vec<(Term<'a>, Term<'a>)> = map
        .iter()
        .map(|(k, v)| (str_to_binary(env, k), str_to_binary(env, v)))
        .collect();
    Term::map_from_pairs(env, &pairs)
}

fn kind_atom(kind: DiffKind) -> Atom {
    match kind {
        DiffKind::LeftOnly => left_only(),
        DiffKind::RightOnly => right_only(),
        DiffKind::ValueMismatch => value_mismatch(),
    }
}

/// Convert diffs to a list of `{kind, path, left | nil, right | nil}`
pub fn diffs_to_term<'a>(env: Env<'a>, diffs: &[Diff]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for d in diffs.iter().rev() {
        let left = d.left.as_deref().map(|s| str_to_binary(env, s));
        let right = d.right.as_deref().map(|s| str_to_binary(env, s));
        let tuple = (kind_atom(d.kind), str_to_binary(env, &d.path), left, right);
        list = list.list_prepend(tuple.encode(env));
    }
    list
}

/// `{:ok, term}`
pub fn ok_tuple<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (ok(), value).encode(env)
}

/// `{:error, reason}` with the error's display text
pub fn error_tuple<'a>(env: Env<'a>, err: &MapError) -> Term<'a> {
    (error(), str_to_binary(env, &err.to_string())).encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    bytes_to_binary(env, s.as_bytes())
}

/// Create a binary from bytes
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
