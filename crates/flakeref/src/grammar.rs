//! URL-like flake reference syntax
//!
//! Accepted forms, tried in order:
//!
//! - indirect: `[flake:]ID[/REF][/REV][?QUERY]`
//! - path: anything starting with `/` or `.`, or without a `scheme:` prefix
//! - `path:`, `github:`, `gitlab:`, `sourcehut:`
//! - `git://`, `git+{http,https,ssh,file}://`
//! - `hg+{http,https,ssh,file}://`
//! - `tarball+{http,https,file}://`, `file+{http,https,file}://`
//! - bare `http://`, `https://`, `file://` (tarball if the path looks like an archive)

use crate::attrs::{AttrPolicy, LiftRules, Lifted, REF_PATTERN, Rev, lift, validate_ref};
use crate::encode::{decode, parse_query, split_fragment};
use crate::error::{FlakeRefError, Result};
use crate::model::{FlakeRef, FlakeRefKind, Forge, has_archive_extension};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use url::Url;

#[allow(clippy::expect_used)]
static INDIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:flake:)?([a-zA-Z][a-zA-Z0-9_-]*)(?:/({REF_PATTERN}))?(?:\?(.*))?$"
    ))
    .expect("indirect flake reference pattern")
});

#[allow(clippy::expect_used)]
static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*):").expect("URL scheme pattern")
});

#[allow(clippy::expect_used)]
static OWNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^~?[a-zA-Z0-9_.-]+$").expect("owner pattern"));

#[allow(clippy::expect_used)]
static REPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("repository pattern"));

const INDIRECT_ATTRS: &[&str] = &["narHash"];
const PATH_ATTRS: &[&str] = &["lastModified", "narHash", "revCount"];
const FORGE_ATTRS: &[&str] = &["host", "lastModified", "narHash"];
const GIT_ATTRS: &[&str] = &[
    "allRefs",
    "exportIgnore",
    "lastModified",
    "lfs",
    "narHash",
    "revCount",
    "shallow",
    "submodules",
];
const HG_ATTRS: &[&str] = &["narHash", "revCount"];

const GIT_TRANSPORTS: &[&str] = &["http", "https", "ssh", "file"];
const HG_TRANSPORTS: &[&str] = &["http", "https", "ssh", "file"];
const ARCHIVE_TRANSPORTS: &[&str] = &["http", "https", "file"];

impl FlakeRef {
    /// Parse a flake reference, resolving relative paths against `base_dir`
    ///
    /// `base_dir` must be absolute when `input` is a path reference.
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// let flake = flakeref::FlakeRef::parse("github:NixOS/nixpkgs/nixos-24.05", Path::new("/"))?;
    /// assert_eq!(flake.git_ref(), Some("nixos-24.05"));
    /// assert_eq!(flake.to_string(), "github:NixOS/nixpkgs/nixos-24.05");
    /// # Ok::<(), flakeref::FlakeRefError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`FlakeRefError`] describing the first problem found. A
    /// non-empty `#fragment` is rejected; use [`split_fragment`] first when
    /// the input may carry an attribute path.
    pub fn parse(input: &str, base_dir: &Path) -> Result<Self> {
        let (body, fragment) = split_fragment(input)?;
        if let Some(fragment) = fragment {
            return Err(FlakeRefError::UnexpectedFragment {
                fragment,
                input: input.to_string(),
            });
        }

        let parsed = parse_body(body, base_dir);
        match &parsed {
            Ok(flake) => tracing::trace!(input, input_type = flake.input_type(), "Parsed flake reference"),
            Err(e) => tracing::trace!(input, error = %e, "Rejected flake reference"),
        }
        parsed
    }
}

fn parse_body(body: &str, base_dir: &Path) -> Result<FlakeRef> {
    if let Some(captures) = INDIRECT_RE.captures(body) {
        let id = captures.get(1).map_or("", |m| m.as_str());
        let ref_and_rev = captures.get(2).map_or("", |m| m.as_str());
        let query = captures.get(3).map_or("", |m| m.as_str());
        return parse_indirect(body, id, ref_and_rev, query);
    }

    let scheme = SCHEME_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase());

    match scheme {
        Some(scheme) => parse_url(body, &scheme, base_dir),
        None => {
            let (raw, query) = body.split_once('?').unwrap_or((body, ""));
            parse_path(raw, query, base_dir)
        }
    }
}

fn parse_url(body: &str, scheme: &str, base_dir: &Path) -> Result<FlakeRef> {
    let rest = &body[scheme.len() + 1..];

    if scheme == "flake" {
        let captures = INDIRECT_RE
            .captures(rest)
            .ok_or_else(|| FlakeRefError::invalid_identifier("flake ID", rest))?;
        let id = captures.get(1).map_or("", |m| m.as_str());
        let ref_and_rev = captures.get(2).map_or("", |m| m.as_str());
        let query = captures.get(3).map_or("", |m| m.as_str());
        return parse_indirect(body, id, ref_and_rev, query);
    }

    if scheme == "path" {
        let (raw, query) = rest.split_once('?').unwrap_or((rest, ""));
        return parse_path(&decode(raw)?, query, base_dir);
    }

    if let Some(forge) = Forge::from_scheme(scheme) {
        return parse_forge(body, forge, rest);
    }

    if scheme == "git" {
        return parse_transport(body, body, GitLike::Git);
    }

    if let Some((outer, transport)) = scheme.split_once('+') {
        let inner = &body[outer.len() + 1..];
        return match outer {
            "git" if GIT_TRANSPORTS.contains(&transport) => {
                parse_transport(body, inner, GitLike::Git)
            }
            "hg" if HG_TRANSPORTS.contains(&transport) => {
                parse_transport(body, inner, GitLike::Mercurial)
            }
            "tarball" if ARCHIVE_TRANSPORTS.contains(&transport) => {
                parse_archive(body, inner, Some(ArchiveKind::Tarball))
            }
            "file" if ARCHIVE_TRANSPORTS.contains(&transport) => {
                parse_archive(body, inner, Some(ArchiveKind::File))
            }
            _ => Err(FlakeRefError::unsupported(body)),
        };
    }

    if ARCHIVE_TRANSPORTS.contains(&scheme) {
        return parse_archive(body, body, None);
    }

    Err(FlakeRefError::unsupported(body))
}

fn parse_indirect(input: &str, id: &str, ref_and_rev: &str, query: &str) -> Result<FlakeRef> {
    // ID/REF/REV: the last segment is the rev when it looks like one,
    // everything before it is the ref
    let (ref_part, rev_part) = match ref_and_rev.rsplit_once('/') {
        _ if Rev::is_rev(ref_and_rev) => ("", Some(ref_and_rev)),
        Some((name, last)) if Rev::is_rev(last) => (name, Some(last)),
        _ => (ref_and_rev, None),
    };
    if Rev::is_rev(ref_part) {
        return Err(FlakeRefError::invalid_url(input, "expected ID[/REF][/REV]"));
    }

    let mut rev = rev_part.map(Rev::parse).transpose()?;
    let mut git_ref = if ref_part.is_empty() {
        None
    } else {
        validate_ref(ref_part)?;
        Some(ref_part.to_string())
    };

    let lifted = lift(
        parse_query(query),
        LiftRules {
            input_type: "indirect",
            lift_ref: true,
            lift_rev: true,
            policy: AttrPolicy::Only(INDIRECT_ATTRS),
        },
    )?;
    merge_ref_rev(input, &mut git_ref, &mut rev, &lifted)?;

    Ok(FlakeRef {
        kind: FlakeRefKind::Indirect { id: id.to_string() },
        git_ref,
        rev,
        attrs: lifted.attrs,
        subdir: lifted.subdir,
    })
}

fn parse_path(raw: &str, query: &str, base_dir: &Path) -> Result<FlakeRef> {
    let path = crate::path::resolve(raw, base_dir)?;
    let lifted = lift(
        parse_query(query),
        LiftRules {
            input_type: "path",
            lift_ref: false,
            lift_rev: true,
            policy: AttrPolicy::Only(PATH_ATTRS),
        },
    )?;

    Ok(FlakeRef {
        kind: FlakeRefKind::Path { path },
        git_ref: None,
        rev: lifted.rev,
        attrs: lifted.attrs,
        subdir: lifted.subdir,
    })
}

fn parse_forge(input: &str, forge: Forge, rest: &str) -> Result<FlakeRef> {
    let (raw_path, query) = rest.split_once('?').unwrap_or((rest, ""));
    let segments = raw_path
        .split('/')
        .map(decode)
        .collect::<Result<Vec<String>>>()?;

    let (owner, repo, ref_or_rev) = match segments.as_slice() {
        [owner, repo] => (owner, repo, None),
        [owner, repo, ref_or_rev] => (owner, repo, Some(ref_or_rev.as_str())),
        _ => {
            return Err(FlakeRefError::invalid_url(
                input,
                "expected OWNER/REPO[/REF-OR-REV]",
            ));
        }
    };
    if !OWNER_RE.is_match(owner) {
        return Err(FlakeRefError::invalid_identifier("repository owner", owner));
    }
    if !REPO_RE.is_match(repo) {
        return Err(FlakeRefError::invalid_identifier("repository name", repo));
    }

    let (mut git_ref, mut rev) = match ref_or_rev {
        None => (None, None),
        Some(value) if Rev::is_rev(value) => (None, Some(Rev::parse(value)?)),
        Some(value) => {
            validate_ref(value)?;
            (Some(value.to_string()), None)
        }
    };

    let lifted = lift(
        parse_query(query),
        LiftRules {
            input_type: forge.scheme(),
            lift_ref: true,
            lift_rev: true,
            policy: AttrPolicy::Only(FORGE_ATTRS),
        },
    )?;
    merge_ref_rev(input, &mut git_ref, &mut rev, &lifted)?;
    if git_ref.is_some() && rev.is_some() {
        return Err(FlakeRefError::conflicting(
            input,
            "a branch or tag",
            "a commit hash",
        ));
    }

    Ok(FlakeRef {
        kind: FlakeRefKind::GitArchive {
            forge,
            owner: owner.clone(),
            repo: repo.clone(),
        },
        git_ref,
        rev,
        attrs: lifted.attrs,
        subdir: lifted.subdir,
    })
}

/// Fold query-supplied `ref`/`rev` into values taken from the path
fn merge_ref_rev(
    input: &str,
    git_ref: &mut Option<String>,
    rev: &mut Option<Rev>,
    lifted: &Lifted,
) -> Result<()> {
    if let Some(name) = &lifted.git_ref {
        if git_ref.is_some() {
            return Err(FlakeRefError::conflicting(
                input,
                "a ref in its path",
                "a 'ref' parameter",
            ));
        }
        *git_ref = Some(name.clone());
    }
    if let Some(hash) = &lifted.rev {
        if rev.is_some() {
            return Err(FlakeRefError::conflicting(
                input,
                "a rev in its path",
                "a 'rev' parameter",
            ));
        }
        *rev = Some(hash.clone());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum GitLike {
    Git,
    Mercurial,
}

#[derive(Debug, Clone, Copy)]
enum ArchiveKind {
    Tarball,
    File,
}

/// Parse a transport URL, returning it stripped of its query
fn transport_url(input: &str, transport: &str) -> Result<(Url, BTreeMap<String, String>)> {
    let mut url = Url::parse(transport).map_err(|e| FlakeRefError::invalid_url(input, e.to_string()))?;
    let params = url.query().map(parse_query).unwrap_or_default();
    url.set_query(None);
    url.set_fragment(None);
    Ok((url, params))
}

fn parse_transport(input: &str, transport: &str, like: GitLike) -> Result<FlakeRef> {
    let (url, params) = transport_url(input, transport)?;
    let (input_type, policy) = match like {
        GitLike::Git => ("git", GIT_ATTRS),
        GitLike::Mercurial => ("mercurial", HG_ATTRS),
    };
    let lifted = lift(
        params,
        LiftRules {
            input_type,
            lift_ref: true,
            lift_rev: true,
            policy: AttrPolicy::Only(policy),
        },
    )?;

    let kind = match like {
        GitLike::Git => FlakeRefKind::Git { url },
        GitLike::Mercurial => FlakeRefKind::Mercurial { url },
    };
    Ok(FlakeRef {
        kind,
        git_ref: lifted.git_ref,
        rev: lifted.rev,
        attrs: lifted.attrs,
        subdir: lifted.subdir,
    })
}

fn parse_archive(input: &str, transport: &str, explicit: Option<ArchiveKind>) -> Result<FlakeRef> {
    let (url, params) = transport_url(input, transport)?;
    let kind = explicit.unwrap_or(if has_archive_extension(&url) {
        ArchiveKind::Tarball
    } else {
        ArchiveKind::File
    });
    let input_type = match kind {
        ArchiveKind::Tarball => "tarball",
        ArchiveKind::File => "file",
    };
    let lifted = lift(
        params,
        LiftRules {
            input_type,
            lift_ref: false,
            lift_rev: false,
            policy: AttrPolicy::Any,
        },
    )?;

    let kind = match kind {
        ArchiveKind::Tarball => FlakeRefKind::Tarball { url },
        ArchiveKind::File => FlakeRefKind::File { url },
    };
    Ok(FlakeRef {
        kind,
        git_ref: None,
        rev: None,
        attrs: lifted.attrs,
        subdir: lifted.subdir,
    })
}
