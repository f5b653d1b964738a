use std::path::Path;

use crate::config::LinkValidation;
use crate::docs::{DocTree, Document};
use crate::error::Error;
use crate::utils;
use crate::validation::{Report, ValidationMode};

/// Check the links of every document against the document tree.
pub fn check(docs: &DocTree, validation: &LinkValidation, report: &mut Report) -> Result<(), Error> {
    for document in docs.documents() {
        for target in &document.links {
            if let Some((mode, problem)) = check_link(docs, validation, document, target) {
                report.raise(mode, problem)?;
            }
        }
    }

    Ok(())
}

fn check_link(
    docs: &DocTree,
    validation: &LinkValidation,
    document: &Document,
    target: &str,
) -> Option<(ValidationMode, Error)> {
    if utils::is_external(target) {
        return None;
    }

    let doc = || document.path.clone();
    let (path, fragment) = utils::split_fragment(target);
    let path = path.split_once('?').map_or(path, |(path, _query)| path);

    if path.is_empty() {
        return match fragment {
            Some(anchor) if !anchor.is_empty() && !document.anchors.contains(anchor) => Some((
                validation.anchors,
                Error::MissingAnchor {
                    doc: doc(),
                    target: target.to_owned(),
                    anchor: anchor.to_owned(),
                },
            )),
            _ => None,
        };
    }

    if path.starts_with('/') {
        return Some((
            validation.absolute_links,
            Error::AbsoluteLink {
                doc: doc(),
                target: target.to_owned(),
            },
        ));
    }

    let broken = || {
        Some((
            validation.not_found,
            Error::BrokenLink {
                doc: doc(),
                target: target.to_owned(),
            },
        ))
    };

    let Some(resolved) = utils::join_relative(&document.path, path) else {
        return broken();
    };

    if let Some(linked) = docs.document(&resolved) {
        return match fragment {
            Some(anchor) if !anchor.is_empty() && !linked.anchors.contains(anchor) => Some((
                validation.anchors,
                Error::MissingAnchor {
                    doc: doc(),
                    target: target.to_owned(),
                    anchor: anchor.to_owned(),
                },
            )),
            _ => None,
        };
    }

    if docs.contains_file(&resolved) {
        return None;
    }

    let not_a_file =
        docs.contains_dir(&resolved) || path.ends_with('/') || Path::new(path).extension().is_none();
    if not_a_file && !path.ends_with(".md") {
        return Some((
            validation.unrecognized_links,
            Error::UnrecognizedLink {
                doc: doc(),
                target: target.to_owned(),
            },
        ));
    }

    broken()
}
