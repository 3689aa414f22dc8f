//! The parsed flake reference and its canonical rendering

use crate::attrs::{Rev, ref_fits_path, typed_value};
use crate::encode::{encode_path, encode_segment, write_query};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".zip", ".tar", ".tgz", ".tar.gz", ".tar.xz", ".tar.bz2", ".tar.zst",
];

/// Git hosting service with a shorthand `forge:owner/repo` syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Forge {
    /// `github:`
    GitHub,
    /// `gitlab:`
    GitLab,
    /// `sourcehut:`
    SourceHut,
}

impl Forge {
    /// URL scheme and input type name
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::SourceHut => "sourcehut",
        }
    }

    pub(crate) fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "github" => Some(Self::GitHub),
            "gitlab" => Some(Self::GitLab),
            "sourcehut" => Some(Self::SourceHut),
            _ => None,
        }
    }
}

/// Where a flake reference points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlakeRefKind {
    /// A registry lookup, e.g. `nixpkgs`
    Indirect {
        /// Registry identifier
        id: String,
    },
    /// A local directory
    Path {
        /// Absolute, normalised, UTF-8 path
        path: PathBuf,
    },
    /// A repository on a git forge, fetched as an archive
    GitArchive {
        /// Hosting service
        forge: Forge,
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
    },
    /// A git repository
    Git {
        /// Transport URL without the `git+` prefix or query
        url: Url,
    },
    /// A Mercurial repository
    Mercurial {
        /// Transport URL without the `hg+` prefix or query
        url: Url,
    },
    /// An archive to unpack
    Tarball {
        /// Archive URL without query
        url: Url,
    },
    /// A plain file
    File {
        /// File URL without query
        url: Url,
    },
}

/// A parsed flake reference
///
/// Built by [`FlakeRef::parse`](crate::FlakeRef::parse); rendered to its
/// canonical URL form with `Display`. Attributes render in key order, so
/// the canonical form is stable and parses back to an equal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlakeRef {
    pub(crate) kind: FlakeRefKind,
    pub(crate) git_ref: Option<String>,
    pub(crate) rev: Option<Rev>,
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) subdir: Option<String>,
}

impl FlakeRef {
    /// The location this reference points at
    #[must_use]
    pub const fn kind(&self) -> &FlakeRefKind {
        &self.kind
    }

    /// Input type name as used in the attribute-set form
    #[must_use]
    pub const fn input_type(&self) -> &'static str {
        match &self.kind {
            FlakeRefKind::Indirect { .. } => "indirect",
            FlakeRefKind::Path { .. } => "path",
            FlakeRefKind::GitArchive { forge, .. } => forge.scheme(),
            FlakeRefKind::Git { .. } => "git",
            FlakeRefKind::Mercurial { .. } => "mercurial",
            FlakeRefKind::Tarball { .. } => "tarball",
            FlakeRefKind::File { .. } => "file",
        }
    }

    /// Branch or tag name
    #[must_use]
    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    /// Pinned commit hash
    #[must_use]
    pub const fn rev(&self) -> Option<&Rev> {
        self.rev.as_ref()
    }

    /// Subdirectory holding `flake.nix`
    #[must_use]
    pub fn subdir(&self) -> Option<&str> {
        self.subdir.as_deref()
    }

    /// A raw attribute such as `narHash` or `host`
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the reference pins its content by revision or hash
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.rev.is_some() || self.attrs.contains_key("narHash")
    }

    /// The attribute-set form, e.g. `{"type": "github", "owner": ..., "repo": ...}`
    #[must_use]
    pub fn to_attrs(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut out = serde_json::Map::new();
        out.insert("type".into(), self.input_type().into());

        match &self.kind {
            FlakeRefKind::Indirect { id } => {
                out.insert("id".into(), id.as_str().into());
            }
            FlakeRefKind::Path { path } => {
                out.insert("path".into(), path.to_string_lossy().into_owned().into());
            }
            FlakeRefKind::GitArchive { owner, repo, .. } => {
                out.insert("owner".into(), owner.as_str().into());
                out.insert("repo".into(), repo.as_str().into());
            }
            FlakeRefKind::Git { url }
            | FlakeRefKind::Mercurial { url }
            | FlakeRefKind::Tarball { url }
            | FlakeRefKind::File { url } => {
                out.insert("url".into(), url.as_str().into());
            }
        }

        if let Some(name) = &self.git_ref {
            out.insert("ref".into(), name.as_str().into());
        }
        if let Some(rev) = &self.rev {
            out.insert("rev".into(), rev.as_str().into());
        }
        if let Some(dir) = &self.subdir {
            out.insert("dir".into(), dir.as_str().into());
        }
        for (name, value) in &self.attrs {
            out.insert(name.clone(), typed_value(name, value));
        }
        out
    }

    /// Path of a `path:` reference
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            FlakeRefKind::Path { path } => Some(path),
            _ => None,
        }
    }
}

pub(crate) fn has_archive_extension(url: &Url) -> bool {
    let path = url.path();
    ARCHIVE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

impl fmt::Display for FlakeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut query = self.attrs.clone();
        if let Some(dir) = &self.subdir {
            query.insert("dir".into(), dir.clone());
        }

        // ref and rev live in the path for indirect and forge forms when they
        // read back unchanged, in the query otherwise
        let in_query = |query: &mut BTreeMap<String, String>| {
            if let Some(name) = &self.git_ref {
                query.insert("ref".into(), name.clone());
            }
            if let Some(rev) = &self.rev {
                query.insert("rev".into(), rev.to_string());
            }
        };

        match &self.kind {
            FlakeRefKind::Indirect { id } => {
                write!(f, "flake:{id}")?;
                if let Some(name) = &self.git_ref {
                    if ref_fits_path(name) {
                        write!(f, "/{name}")?;
                    } else {
                        query.insert("ref".into(), name.clone());
                    }
                }
                if let Some(rev) = &self.rev {
                    write!(f, "/{rev}")?;
                }
            }
            FlakeRefKind::Path { path } => {
                write!(f, "path:{}", encode_path(&path.to_string_lossy()))?;
                in_query(&mut query);
            }
            FlakeRefKind::GitArchive { forge, owner, repo } => {
                write!(
                    f,
                    "{}:{}/{}",
                    forge.scheme(),
                    encode_segment(owner),
                    encode_segment(repo)
                )?;
                if let Some(rev) = &self.rev {
                    write!(f, "/{rev}")?;
                } else if let Some(name) = &self.git_ref {
                    if Rev::is_rev(name) {
                        query.insert("ref".into(), name.clone());
                    } else {
                        write!(f, "/{}", encode_segment(name))?;
                    }
                }
            }
            FlakeRefKind::Git { url } => {
                if url.scheme() == "git" {
                    write!(f, "{url}")?;
                } else {
                    write!(f, "git+{url}")?;
                }
                in_query(&mut query);
            }
            FlakeRefKind::Mercurial { url } => {
                write!(f, "hg+{url}")?;
                in_query(&mut query);
            }
            FlakeRefKind::Tarball { url } => {
                if has_archive_extension(url) {
                    write!(f, "{url}")?;
                } else {
                    write!(f, "tarball+{url}")?;
                }
            }
            FlakeRefKind::File { url } => {
                if has_archive_extension(url) {
                    write!(f, "file+{url}")?;
                } else {
                    write!(f, "{url}")?;
                }
            }
        }

        write_query(f, &query)
    }
}
