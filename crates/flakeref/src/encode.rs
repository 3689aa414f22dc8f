//! Percent-encoding and query helpers shared by the parser and renderer

use crate::error::{FlakeRefError, Result};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

/// Characters escaped inside a path component of the URL form
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path characters plus `/`, for a single segment such as a ref name
const SEGMENT: &AsciiSet = &PATH.add(b'/');

pub(crate) fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Percent-decode `input`; escapes must decode to valid UTF-8
pub(crate) fn decode(input: &str) -> Result<String> {
    percent_decode_str(input)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| FlakeRefError::invalid_url(input, format!("invalid percent-encoding: {e}")))
}

/// Decode a query string; the first occurrence of a key wins
pub(crate) fn parse_query(query: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// Write `?k=v&...` in key order, or nothing for an empty map
pub(crate) fn write_query(f: &mut fmt::Formatter<'_>, params: &BTreeMap<String, String>) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    write!(f, "?{encoded}")
}

/// Split `body#fragment`, decoding the fragment; an empty fragment is `None`
///
/// ```
/// let (body, fragment) = flakeref::split_fragment("github:NixOS/nixpkgs#hello")?;
/// assert_eq!(body, "github:NixOS/nixpkgs");
/// assert_eq!(fragment.as_deref(), Some("hello"));
/// # Ok::<(), flakeref::FlakeRefError>(())
/// ```
///
/// # Errors
///
/// Returns [`FlakeRefError::InvalidUrl`] if the fragment's escapes are not UTF-8
pub fn split_fragment(input: &str) -> Result<(&str, Option<String>)> {
    Ok(match input.split_once('#') {
        Some((body, fragment)) if !fragment.is_empty() => (body, Some(decode(fragment)?)),
        Some((body, _)) => (body, None),
        None => (input, None),
    })
}

/// Escape a decoded fragment so it can be appended after `#` again
///
/// ```
/// assert_eq!(flakeref::encode_fragment("my app"), "my%20app");
/// assert_eq!(flakeref::encode_fragment("packages.x86_64-linux.hello"), "packages.x86_64-linux.hello");
/// ```
#[must_use]
pub fn encode_fragment(fragment: &str) -> String {
    utf8_percent_encode(fragment, PATH).to_string()
}
