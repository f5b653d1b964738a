//! The navigation tree: parsing the declared `nav` section, generating one when none is
//! declared, and resolving it against the document tree.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::config::{kind, NavValidation};
use crate::ctx::Ctx;
use crate::docs::DocTree;
use crate::error::Error;
use crate::utils;
use crate::validation::Report;

/// A navigation entry as declared: a document (optionally titled) or a titled group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavNode {
    Leaf(Leaf),
    Group(Group),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    pub title: Option<String>,
    pub path: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub title: String,
    pub children: Vec<NavNode>,
}

impl NavNode {
    pub fn leaf(title: Option<&str>, path: &str) -> Self {
        NavNode::Leaf(Leaf {
            title: title.map(str::to_owned),
            path: path.to_owned(),
        })
    }

    pub fn group(title: &str, children: Vec<NavNode>) -> Self {
        NavNode::Group(Group {
            title: title.to_owned(),
            children,
        })
    }

    /// Build a navigation tree from the documents themselves, for sites that do not declare one.
    /// Index pages come first in their directory, everything else is sorted by name.
    pub fn implicit(docs: &DocTree) -> Vec<NavNode> {
        #[derive(Default)]
        struct Dir {
            index: Option<String>,
            entries: BTreeMap<String, Entry>,
        }

        enum Entry {
            Page(String),
            Dir(Dir),
        }

        fn into_nodes(dir: Dir) -> Vec<NavNode> {
            let mut nodes: Vec<NavNode> = dir.index.iter().map(|path| NavNode::leaf(None, path)).collect();
            for (name, entry) in dir.entries {
                match entry {
                    Entry::Page(path) => nodes.push(NavNode::leaf(None, &path)),
                    Entry::Dir(dir) => nodes.push(NavNode::group(&utils::title_from_name(&name), into_nodes(dir))),
                }
            }
            nodes
        }

        let mut root = Dir::default();
        'documents: for document in docs.documents() {
            let mut parts: Vec<&str> = document.path.split('/').collect();
            let Some(file) = parts.pop() else {
                continue;
            };

            let mut dir = &mut root;
            for part in parts {
                let entry = dir
                    .entries
                    .entry(part.to_owned())
                    .or_insert_with(|| Entry::Dir(Dir::default()));
                dir = match entry {
                    Entry::Dir(dir) => dir,
                    Entry::Page(_) => continue 'documents,
                };
            }

            // `index.md` wins over `README.md`; the loser is listed as a regular page
            if utils::is_index(file) && (dir.index.is_none() || file == "index.md") {
                if let Some(previous) = dir.index.replace(document.path.clone()) {
                    let name = previous.rsplit('/').next().unwrap_or(&previous).to_owned();
                    dir.entries.insert(name, Entry::Page(previous));
                }
            } else {
                dir.entries
                    .insert(file.to_owned(), Entry::Page(document.path.clone()));
            }
        }

        into_nodes(root)
    }
}

impl TryFrom<Value> for NavNode {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(path) => Ok(NavNode::Leaf(Leaf { title: None, path })),
            Value::Mapping(mapping) => {
                let mut entries = mapping.into_iter();
                let (title, value) = match (entries.next(), entries.next()) {
                    (Some(entry), None) => entry,
                    _ => return Err("nav entries must have exactly one title".to_owned()),
                };
                let Value::String(title) = title else {
                    return Err(format!("nav titles must be strings, found {}", kind(&title)));
                };

                match value {
                    Value::String(path) => Ok(NavNode::Leaf(Leaf {
                        title: Some(title),
                        path,
                    })),
                    Value::Sequence(items) => {
                        let children = items
                            .into_iter()
                            .map(NavNode::try_from)
                            .collect::<Result<_, _>>()
                            .map_err(|err| format!("{title} > {err}"))?;
                        Ok(NavNode::Group(Group { title, children }))
                    }
                    other => Err(format!(
                        "nav entry `{title}` must be a path or a list, found {}",
                        kind(&other)
                    )),
                }
            }
            other => Err(format!("nav entries must be a path or a mapping, found {}", kind(&other))),
        }
    }
}

impl From<&NavNode> for Value {
    fn from(node: &NavNode) -> Self {
        let (title, value) = match node {
            NavNode::Leaf(Leaf { title: None, path }) => return Value::String(path.clone()),
            NavNode::Leaf(Leaf {
                title: Some(title),
                path,
            }) => (title, Value::String(path.clone())),
            NavNode::Group(Group { title, children }) => {
                (title, Value::Sequence(children.iter().map(Value::from).collect()))
            }
        };

        let mut mapping = Mapping::new();
        mapping.insert(Value::String(title.clone()), value);
        Value::Mapping(mapping)
    }
}

impl Serialize for NavNode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NavNode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        NavNode::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// A navigation entry after resolution, ready for the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavItem {
    Page {
        title: String,
        /// Source document, relative to the docs directory.
        path: String,
        url: String,
        /// The document does not exist; only kept when validation lets it through.
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        missing: bool,
    },
    Link {
        title: String,
        url: String,
    },
    Section {
        title: String,
        children: Vec<NavItem>,
    },
}

impl NavItem {
    pub fn title(&self) -> &str {
        match self {
            NavItem::Page { title, .. } | NavItem::Link { title, .. } | NavItem::Section { title, .. } => title,
        }
    }
}

/// The resolved navigation tree, in declared order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedNav {
    items: Vec<NavItem>,
}

impl ResolvedNav {
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Pages and links in sidebar order, depth first.
    pub fn leaves(&self) -> Vec<&NavItem> {
        fn walk<'a>(items: &'a [NavItem], leaves: &mut Vec<&'a NavItem>) {
            for item in items {
                match item {
                    NavItem::Section { children, .. } => walk(children, leaves),
                    leaf => leaves.push(leaf),
                }
            }
        }

        let mut leaves = Vec::new();
        walk(&self.items, &mut leaves);
        leaves
    }

    fn pages(&self) -> Vec<&NavItem> {
        self.leaves()
            .into_iter()
            .filter(|item| matches!(item, NavItem::Page { missing: false, .. }))
            .collect()
    }

    pub fn contains_page(&self, path: &str) -> bool {
        self.pages()
            .into_iter()
            .any(|item| matches!(item, NavItem::Page { path: page, .. } if page == path))
    }

    /// The pages before and after the page for `path`, for previous/next links.
    pub fn neighbours(&self, path: &str) -> Option<(Option<&NavItem>, Option<&NavItem>)> {
        let pages = self.pages();
        let idx = pages
            .iter()
            .position(|item| matches!(item, NavItem::Page { path: page, .. } if page == path))?;

        Some((
            idx.checked_sub(1).map(|idx| pages[idx]),
            pages.get(idx + 1).copied(),
        ))
    }
}

impl fmt::Display for ResolvedNav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_items(f: &mut fmt::Formatter<'_>, items: &[NavItem], depth: usize) -> fmt::Result {
            for item in items {
                let indent = "  ".repeat(depth);
                match item {
                    NavItem::Page {
                        title, url, missing, ..
                    } => {
                        let missing = if *missing { " (missing)" } else { "" };
                        writeln!(f, "{indent}- {title} [/{url}]{missing}")?;
                    }
                    NavItem::Link { title, url } => writeln!(f, "{indent}- {title} <{url}>")?,
                    NavItem::Section { title, children } => {
                        writeln!(f, "{indent}+ {title}")?;
                        write_items(f, children, depth + 1)?;
                    }
                }
            }
            Ok(())
        }

        write_items(f, self.items(), 0)
    }
}

struct Resolver<'a> {
    ctx: &'a Ctx,
    docs: &'a DocTree,
    validation: &'a NavValidation,
    report: &'a mut Report,
    referenced: HashSet<String>,
}

/// Resolve a navigation tree against the documents. Entries pointing at missing documents, and
/// documents no entry points at, are reported according to `validation`.
pub fn resolve(
    nav: &[NavNode],
    ctx: &Ctx,
    docs: &DocTree,
    validation: &NavValidation,
    report: &mut Report,
) -> Result<ResolvedNav, Error> {
    let mut resolver = Resolver {
        ctx,
        docs,
        validation,
        report,
        referenced: HashSet::new(),
    };

    let items = resolver.resolve_nodes(nav)?;

    for document in docs.documents() {
        if !resolver.referenced.contains(&document.path) {
            resolver.report.raise(
                validation.omitted_files,
                Error::OmittedFile {
                    path: document.path.clone(),
                },
            )?;
        }
    }

    Ok(ResolvedNav { items })
}

impl Resolver<'_> {
    fn resolve_nodes(&mut self, nodes: &[NavNode]) -> Result<Vec<NavItem>, Error> {
        nodes.iter().map(|node| self.resolve_node(node)).collect()
    }

    fn resolve_node(&mut self, node: &NavNode) -> Result<NavItem, Error> {
        match node {
            NavNode::Group(Group { title, children }) => Ok(NavItem::Section {
                title: title.clone(),
                children: self.resolve_nodes(children)?,
            }),
            NavNode::Leaf(leaf) => self.resolve_leaf(leaf),
        }
    }

    fn resolve_leaf(&mut self, Leaf { title, path }: &Leaf) -> Result<NavItem, Error> {
        if utils::is_external(path) {
            return Ok(NavItem::Link {
                title: title.clone().unwrap_or_else(|| path.clone()),
                url: path.clone(),
            });
        }

        if path.starts_with('/') {
            self.report.raise(
                self.validation.absolute_links,
                Error::AbsoluteNavLink {
                    title: title.clone(),
                    path: path.clone(),
                },
            )?;
            return Ok(NavItem::Link {
                title: title.clone().unwrap_or_else(|| path.clone()),
                url: path.clone(),
            });
        }

        let normalized = utils::normalize(&utils::normalize_config_path(path)).unwrap_or_else(|| path.clone());
        let document = self.docs.document(&normalized);
        if document.is_none() {
            self.report.raise(
                self.validation.not_found,
                Error::BrokenNavLink {
                    title: title.clone(),
                    path: path.clone(),
                },
            )?;
        }

        let title = match (title, document) {
            (Some(title), _) => title.clone(),
            (None, Some(document)) => document.display_title(),
            (None, None) => utils::title_from_path(&normalized),
        };
        let url = self.ctx.doc_url(&normalized);
        self.referenced.insert(normalized.clone());

        Ok(NavItem::Page {
            title,
            path: normalized,
            url,
            missing: document.is_none(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::{resolve, NavItem, NavNode, ResolvedNav};
    use crate::config::NavValidation;
    use crate::ctx::Ctx;
    use crate::docs::DocTree;
    use crate::error::Error;
    use crate::validation::{Report, ValidationMode};
    use std::fs;

    fn parse(source: &str) -> Result<Vec<NavNode>, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    fn docs(paths: &[&str]) -> (tempfile::TempDir, DocTree) {
        let dir = tempfile::tempdir().unwrap();
        for path in paths {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let tree = DocTree::scan(dir.path()).unwrap();
        (dir, tree)
    }

    fn resolve_with(nav: &[NavNode], docs: &DocTree, validation: &NavValidation) -> Result<ResolvedNav, Error> {
        let mut report = Report::new(false);
        resolve(nav, &Ctx::new(None, true), docs, validation, &mut report)
    }

    #[test]
    fn parse_nested() {
        let nav = parse(
            r#"
- index.md
- Getting started:
    - getting-started/index.md
    - Installation: getting-started/installation.md
- Reference:
    - Commands:
        - reference/cli.md
"#,
        )
        .unwrap();

        assert_eq!(
            nav,
            [
                NavNode::leaf(None, "index.md"),
                NavNode::group(
                    "Getting started",
                    vec![
                        NavNode::leaf(None, "getting-started/index.md"),
                        NavNode::leaf(Some("Installation"), "getting-started/installation.md"),
                    ]
                ),
                NavNode::group(
                    "Reference",
                    vec![NavNode::group("Commands", vec![NavNode::leaf(None, "reference/cli.md")])]
                ),
            ]
        );

        let yaml = serde_yaml::to_string(&nav).unwrap();
        assert_eq!(parse(&yaml).unwrap(), nav);
    }

    #[test]
    fn parse_errors() {
        assert!(parse("- 42\n").is_err());
        assert!(parse("- A: a.md\n  B: b.md\n").is_err());
        assert!(parse("- A: 42\n").is_err());

        let err = parse("- Guides:\n    - Broken: [1]\n").unwrap_err().to_string();
        assert!(err.contains("Guides > "), "{err}");
    }

    #[test]
    fn declared_order_is_kept() {
        let (_dir, docs) = docs(&["a.md", "b.md", "c.md"]);
        let nav = parse("- c.md\n- Alpha: a.md\n- b.md\n").unwrap();

        let resolved = resolve_with(&nav, &docs, &NavValidation::default()).unwrap();
        let paths: Vec<&str> = resolved
            .leaves()
            .into_iter()
            .map(|item| match item {
                NavItem::Page { path, .. } => path.as_str(),
                _ => panic!("expected a page"),
            })
            .collect();
        assert_eq!(paths, ["c.md", "a.md", "b.md"]);
        assert_eq!(resolved.items()[1].title(), "Alpha");
        assert_eq!(resolved.items()[0].title(), "C");
    }

    #[test]
    fn broken_link_error() {
        let (_dir, docs) = docs(&["index.md"]);
        let nav = parse("- index.md\n- Missing: reference/missing.md\n").unwrap();

        let err = resolve_with(&nav, &docs, &NavValidation::default()).unwrap_err();
        assert!(matches!(err, Error::BrokenNavLink { path, .. } if path == "reference/missing.md"));
    }

    #[test]
    fn broken_link_warn() {
        let (_dir, docs) = docs(&["index.md"]);
        let nav = parse("- index.md\n- Missing: reference/missing.md\n").unwrap();
        let validation = NavValidation {
            not_found: ValidationMode::Warn,
            ..NavValidation::default()
        };

        let mut report = Report::new(false);
        let resolved = resolve(&nav, &Ctx::new(None, true), &docs, &validation, &mut report).unwrap();
        assert_eq!(report.warnings(), 1);
        assert!(matches!(
            &resolved.items()[1],
            NavItem::Page { missing: true, url, .. } if url == "reference/missing/"
        ));
        assert!(!resolved.contains_page("reference/missing.md"));
    }

    #[test]
    fn omitted_files() {
        let (_dir, docs) = docs(&["index.md", "orphan.md"]);
        let nav = parse("- index.md\n").unwrap();
        let validation = NavValidation {
            omitted_files: ValidationMode::Error,
            ..NavValidation::default()
        };

        let err = resolve_with(&nav, &docs, &validation).unwrap_err();
        assert!(matches!(err, Error::OmittedFile { path } if path == "orphan.md"));
    }

    #[test]
    fn external_and_absolute() {
        let (_dir, docs) = docs(&["index.md"]);
        let nav = parse("- index.md\n- GitHub: https://github.com/astral-sh/uv\n- Abs: /index.md\n").unwrap();

        let resolved = resolve_with(&nav, &docs, &NavValidation::default()).unwrap();
        assert!(matches!(&resolved.items()[1], NavItem::Link { url, .. } if url == "https://github.com/astral-sh/uv"));
        assert!(matches!(&resolved.items()[2], NavItem::Link { .. }));

        let validation = NavValidation {
            absolute_links: ValidationMode::Error,
            ..NavValidation::default()
        };
        assert!(matches!(
            resolve_with(&nav, &docs, &validation),
            Err(Error::AbsoluteNavLink { .. })
        ));
    }

    #[test]
    fn implicit_nav() {
        let (_dir, docs) = docs(&[
            "about.md",
            "index.md",
            "guides/zeta.md",
            "guides/index.md",
            "guides/alpha.md",
            "reference/README.md",
        ]);

        let nav = NavNode::implicit(&docs);
        assert_eq!(
            nav,
            [
                NavNode::leaf(None, "index.md"),
                NavNode::leaf(None, "about.md"),
                NavNode::group(
                    "Guides",
                    vec![
                        NavNode::leaf(None, "guides/index.md"),
                        NavNode::leaf(None, "guides/alpha.md"),
                        NavNode::leaf(None, "guides/zeta.md"),
                    ]
                ),
                NavNode::group("Reference", vec![NavNode::leaf(None, "reference/README.md")]),
            ]
        );

        let resolved = resolve_with(&nav, &docs, &NavValidation::default()).unwrap();
        assert_eq!(resolved.leaves().len(), 6);
    }

    #[test]
    fn neighbours() {
        let (_dir, docs) = docs(&["a.md", "b.md", "c.md"]);
        let nav = parse("- a.md\n- Group:\n    - b.md\n- c.md\n").unwrap();
        let resolved = resolve_with(&nav, &docs, &NavValidation::default()).unwrap();

        let (prev, next) = resolved.neighbours("b.md").unwrap();
        assert_eq!(prev.unwrap().title(), "A");
        assert_eq!(next.unwrap().title(), "C");

        let (prev, _) = resolved.neighbours("a.md").unwrap();
        assert!(prev.is_none());
        assert!(resolved.neighbours("nope.md").is_none());
    }
}
