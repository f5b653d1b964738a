use std::path::PathBuf;

/// Everything that can go wrong while loading and validating a site.
///
/// Reference problems (broken nav entries, dead links, dangling redirects) are variants here as
/// well, so that the validation policy can either log them or return them as-is.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no configuration file found in {}", .dir.display())]
    MissingConfig { dir: PathBuf },
    #[error("malformed configuration in {}: {message}", .path.display())]
    MalformedConfig { path: PathBuf, message: String },

    #[error("malformed front matter in `{doc}`: {message}")]
    MalformedFrontMatter { doc: String, message: String },

    #[error("navigation entry {} points to missing document `{path}`", DisplayTitle(.title))]
    BrokenNavLink { title: Option<String>, path: String },
    #[error("navigation entry {} uses absolute path `{path}`", DisplayTitle(.title))]
    AbsoluteNavLink { title: Option<String>, path: String },
    #[error("document `{path}` is not included in the navigation")]
    OmittedFile { path: String },

    #[error("redirect source `{old_path}` is a live document")]
    RedirectCollision { old_path: String },
    #[error("redirect cycle: {}", .chain.join(" -> "))]
    RedirectCycle { chain: Vec<String> },
    #[error("redirect chain starting at `{start}` exceeds the limit of {limit} hop(s)")]
    RedirectHopLimit { start: String, limit: usize },
    #[error("redirect `{old_path}` -> `{new_path}` does not resolve to a document")]
    RedirectTargetMissing { old_path: String, new_path: String },

    #[error("document `{doc}` links to `{target}`, which does not exist")]
    BrokenLink { doc: String, target: String },
    #[error("document `{doc}` links to `{target}`, which is not a document")]
    UnrecognizedLink { doc: String, target: String },
    #[error("document `{doc}` uses absolute link `{target}`")]
    AbsoluteLink { doc: String, target: String },
    #[error("document `{doc}` links to `{target}`, but there is no anchor `#{anchor}`")]
    MissingAnchor { doc: String, target: String, anchor: String },

    #[error("an IO error occurred at {}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not walk the document tree")]
    Walk(#[from] walkdir::Error),
    #[error("could not render template")]
    Template(#[from] minijinja::Error),
    #[error("could not serialize the site manifest")]
    Manifest(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

struct DisplayTitle<'a>(&'a Option<String>);

impl std::fmt::Display for DisplayTitle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(title) => write!(f, "\"{title}\""),
            None => f.write_str("(untitled)"),
        }
    }
}
