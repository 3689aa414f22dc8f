//! Flake reference attributes: revisions, ref names and query parameters

use crate::error::{FlakeRefError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

const BOOL_ATTRS: &[&str] = &["allRefs", "exportIgnore", "lfs", "shallow", "submodules"];
const INT_ATTRS: &[&str] = &["lastModified", "revCount"];

/// Ref names that may appear unescaped in the path of a flake reference
pub(crate) const REF_PATTERN: &str = r"[a-zA-Z0-9@][a-zA-Z0-9_./@+-]*";

#[allow(clippy::expect_used)]
static REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{REF_PATTERN}$")).expect("ref name pattern"));

/// A commit hash: 40 (SHA-1) or 64 (SHA-256) lowercase hex digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rev(String);

impl Rev {
    /// Parse a commit hash, normalising it to lowercase
    ///
    /// # Errors
    ///
    /// Returns [`FlakeRefError::InvalidRev`] if `value` is not 40 or 64 hex digits
    pub fn parse(value: &str) -> Result<Self> {
        if Self::is_rev(value) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(FlakeRefError::InvalidRev {
                value: value.to_string(),
            })
        }
    }

    /// Whether `value` has the shape of a commit hash
    #[must_use]
    pub fn is_rev(value: &str) -> bool {
        matches!(value.len(), 40 | 64) && value.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// The hash as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a git branch or tag name
///
/// # Errors
///
/// Returns [`FlakeRefError::InvalidIdentifier`] for names git would refuse
pub fn validate_ref(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('-')
        || name.starts_with('/')
        || name.ends_with('/')
        || name.ends_with('.')
        || name.ends_with(".lock")
        || name.contains("..")
        || name.contains("//")
        || name.contains("@{")
        || name == "@"
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c));

    if invalid {
        return Err(FlakeRefError::invalid_identifier("branch or tag name", name));
    }
    Ok(())
}

/// Whether `name` can be written as `ID/REF` and read back as the same ref
///
/// The last path segment of an indirect reference is taken as a rev when it
/// looks like one, so such refs have to go in the query instead.
pub(crate) fn ref_fits_path(name: &str) -> bool {
    let last = name.rsplit('/').next().unwrap_or(name);
    REF_RE.is_match(name) && !Rev::is_rev(last)
}

/// Which query attributes an input type accepts besides `dir`, `ref` and `rev`
#[derive(Debug, Clone, Copy)]
pub(crate) enum AttrPolicy {
    Only(&'static [&'static str]),
    Any,
}

/// Attributes pulled out of a query string for one input type
#[derive(Debug, Default)]
pub(crate) struct Lifted {
    pub(crate) git_ref: Option<String>,
    pub(crate) rev: Option<Rev>,
    pub(crate) subdir: Option<String>,
    pub(crate) attrs: BTreeMap<String, String>,
}

/// How to treat `ref` and `rev` for an input type
#[derive(Debug, Clone, Copy)]
pub(crate) struct LiftRules {
    pub(crate) input_type: &'static str,
    pub(crate) lift_ref: bool,
    pub(crate) lift_rev: bool,
    pub(crate) policy: AttrPolicy,
}

/// Split decoded query parameters into typed fields and validated attributes
pub(crate) fn lift(mut params: BTreeMap<String, String>, rules: LiftRules) -> Result<Lifted> {
    let mut lifted = Lifted {
        subdir: params.remove("dir").filter(|dir| !dir.is_empty()),
        ..Lifted::default()
    };

    if rules.lift_ref
        && let Some(name) = params.remove("ref")
    {
        validate_ref(&name)?;
        lifted.git_ref = Some(name);
    }
    if rules.lift_rev
        && let Some(rev) = params.remove("rev")
    {
        lifted.rev = Some(Rev::parse(&rev)?);
    }

    for (name, value) in params {
        if let AttrPolicy::Only(allowed) = rules.policy
            && !allowed.contains(&name.as_str())
        {
            return Err(FlakeRefError::UnsupportedAttribute {
                input_type: rules.input_type,
                name,
            });
        }
        validate_value(&name, &value)?;
        lifted.attrs.insert(name, value);
    }

    Ok(lifted)
}

fn validate_value(name: &str, value: &str) -> Result<()> {
    if BOOL_ATTRS.contains(&name) && value != "0" && value != "1" {
        return Err(FlakeRefError::invalid_attribute(
            name,
            value,
            "expected 0 or 1",
        ));
    }
    if INT_ATTRS.contains(&name) && value.parse::<u64>().is_err() {
        return Err(FlakeRefError::invalid_attribute(
            name,
            value,
            "expected an unsigned integer",
        ));
    }
    if name == "narHash" && value.is_empty() {
        return Err(FlakeRefError::invalid_attribute(name, value, "hash is empty"));
    }
    Ok(())
}

/// Attribute value in the Nix attribute-set form
pub(crate) fn typed_value(name: &str, value: &str) -> serde_json::Value {
    if BOOL_ATTRS.contains(&name) {
        return serde_json::Value::Bool(value == "1");
    }
    if INT_ATTRS.contains(&name)
        && let Ok(number) = value.parse::<u64>()
    {
        return serde_json::Value::from(number);
    }
    serde_json::Value::String(value.to_string())
}
