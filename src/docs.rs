use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::{front_matter, markdown, utils};

/// A markdown source document.
#[derive(Debug)]
pub struct Document {
    /// Relative to the docs directory, `/`-separated. E.g. `guides/package.md`.
    pub path: String,
    /// Front matter title, else the first level-1 heading.
    pub title: Option<String>,
    pub anchors: HashSet<String>,
    pub links: Vec<String>,
}

impl Document {
    fn read(path: String, file_path: PathBuf) -> Result<Self, Error> {
        let content = std::fs::read_to_string(&file_path).map_err(|err| Error::io(&file_path, err))?;
        let (front_matter, content) =
            front_matter::parse_front_matter(&content).map_err(|message| Error::MalformedFrontMatter {
                doc: path.clone(),
                message,
            })?;
        let summary = markdown::summarize(content);

        Ok(Document {
            path,
            title: front_matter.title.or(summary.title),
            anchors: summary.anchors,
            links: summary.links,
        })
    }

    /// Title to show for this document when the navigation does not name one.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| utils::title_from_path(&self.path))
    }
}

/// Every file under the docs directory. Markdown files are read and summarized up front so that
/// navigation, link and redirect checks are lookups.
#[derive(Debug)]
pub struct DocTree {
    root: PathBuf,
    files: BTreeSet<String>,
    dirs: BTreeSet<String>,
    documents: BTreeMap<String, Document>,
}

impl DocTree {
    /// Walk `root`. Files and directories whose name starts with a `.` are skipped.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::io(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "docs directory does not exist"),
            ));
        }

        let mut tree = DocTree {
            root: root.to_owned(),
            files: BTreeSet::new(),
            dirs: BTreeSet::new(),
            documents: BTreeMap::new(),
        };

        for entry in walkdir::WalkDir::new(root)
            // skip self
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let Some(path) = utils::path_to_url(relative) else {
                log::warn!("Skipping path that is not valid UTF-8: {}", entry.path().display());
                continue;
            };

            if entry.file_type().is_dir() {
                tree.dirs.insert(path);
            } else if entry.file_type().is_file() {
                if path.ends_with(".md") {
                    let document = Document::read(path.clone(), entry.path().to_owned())?;
                    tree.documents.insert(path.clone(), document);
                }
                tree.files.insert(path);
            }
        }

        Ok(tree)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Any file, document or not.
    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn contains_dir(&self, path: &str) -> bool {
        path.is_empty() || self.dirs.contains(path.trim_end_matches('/'))
    }

    pub fn is_document(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }

    pub fn document(&self, path: &str) -> Option<&Document> {
        self.documents.get(path)
    }

    /// All markdown documents, sorted by path.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}
