use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::RedirectValidation;
use crate::docs::DocTree;
use crate::error::Error;
use crate::utils;
use crate::validation::Report;

/// Maps the source paths of pages that moved to where they moved to.
#[derive(Debug, Default)]
pub struct RedirectTable {
    /// Old path to new path, one hop.
    entries: HashMap<String, String>,
    /// Old path to the end of its chain.
    resolved: HashMap<String, String>,
    /// Old paths in declaration order.
    order: Vec<String>,
}

impl RedirectTable {
    /// Build the table from `(old, new)` pairs declared in the configuration at `origin`. A
    /// redirect away from a live document, a path leaving the docs directory or a cyclic chain is
    /// an error; a chain ending somewhere other than a document or an external URL is reported
    /// according to `validation`.
    pub fn build(
        maps: Vec<(String, String)>,
        origin: &Path,
        docs: &DocTree,
        validation: &RedirectValidation,
        report: &mut Report,
    ) -> Result<Self, Error> {
        let mut table = RedirectTable::default();

        for (old, new) in maps {
            let old = normalize_path(&old, origin)?;
            let new = if utils::is_external(&new) {
                new
            } else {
                let (path, fragment) = utils::split_fragment(&new);
                let path = normalize_path(path, origin)?;
                match fragment {
                    Some(fragment) => format!("{path}#{fragment}"),
                    None => path,
                }
            };

            if docs.is_document(&old) {
                return Err(Error::RedirectCollision { old_path: old });
            }
            if table.entries.insert(old.clone(), new).is_some() {
                log::warn!("Redirect for `{old}` is declared more than once; the last one wins");
            } else {
                table.order.push(old);
            }
        }

        let limit = validation.max_hops.unwrap_or(table.entries.len());
        for old in &table.order {
            let target = follow(&table.entries, old, limit)?;

            let (path, _) = utils::split_fragment(&target);
            if !utils::is_external(&target) && !docs.is_document(path) && !docs.contains_file(path) {
                report.raise(
                    validation.not_found,
                    Error::RedirectTargetMissing {
                        old_path: old.clone(),
                        new_path: target.clone(),
                    },
                )?;
            }

            table.resolved.insert(old.clone(), target);
        }

        Ok(table)
    }

    /// The target of a single hop, before following the chain.
    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries
            .get(&utils::normalize(&utils::normalize_config_path(old))?)
            .map(String::as_str)
    }

    /// The end of the redirect chain starting at `old`.
    pub fn resolve(&self, old: &str) -> Option<&str> {
        self.resolved
            .get(&utils::normalize(&utils::normalize_config_path(old))?)
            .map(String::as_str)
    }

    /// `(old, new)` pairs in declaration order, with `new` the end of the chain.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|old| (old.as_str(), self.resolved[old].as_str()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Resolve `.` and `..` in a redirect path. Paths leaving the docs directory are rejected, since
/// their stubs would be written outside the site directory.
fn normalize_path(path: &str, origin: &Path) -> Result<String, Error> {
    match utils::normalize(&utils::normalize_config_path(path)) {
        Some(normalized) if !normalized.is_empty() => Ok(normalized),
        _ => Err(Error::MalformedConfig {
            path: origin.to_owned(),
            message: format!("redirect path `{path}` does not name a page inside the docs directory"),
        }),
    }
}

/// Follow redirects starting at `start` until reaching a target that is not itself redirected.
fn follow(entries: &HashMap<String, String>, start: &str, limit: usize) -> Result<String, Error> {
    let mut visited = HashSet::from([start]);
    let mut chain = vec![start];
    let mut current = start;

    loop {
        let Some(next) = entries.get(current) else {
            return Ok(current.to_owned());
        };
        chain.push(next);

        let (path, _) = utils::split_fragment(next);
        if !entries.contains_key(path) {
            return Ok(next.clone());
        }
        if !visited.insert(path) {
            chain.pop();
            chain.push(path);
            return Err(Error::RedirectCycle {
                chain: chain.into_iter().map(str::to_owned).collect(),
            });
        }
        // at least one more hop follows
        if chain.len() > limit {
            return Err(Error::RedirectHopLimit {
                start: start.to_owned(),
                limit,
            });
        }

        current = path;
    }
}
