use std::collections::HashSet;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// What the rest of the build needs to know about a markdown document, without rendering it.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    /// Text of the first level-1 heading.
    pub title: Option<String>,
    /// Ids of all headings, as the table of contents would generate them.
    pub anchors: HashSet<String>,
    /// Destinations of all links and images, in document order.
    pub links: Vec<String>,
}

struct Heading {
    level: HeadingLevel,
    id: Option<String>,
    text: String,
}

pub fn summarize(content: &str) -> Summary {
    let options = Options::ENABLE_HEADING_ATTRIBUTES | Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES;
    let mut summary = Summary::default();
    let mut heading: Option<Heading> = None;

    for event in Parser::new_ext(content, options) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                heading = Some(Heading {
                    level,
                    id: id.map(|id| id.to_string()),
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some(Heading { level, id, text }) = heading.take() else {
                    continue;
                };
                let text = text.trim();

                if level == HeadingLevel::H1 && summary.title.is_none() && !text.is_empty() {
                    summary.title = Some(text.to_owned());
                }

                let id = id.unwrap_or_else(|| slugify(text));
                let id = unique(id, &summary.anchors);
                summary.anchors.insert(id);
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = heading.as_mut() {
                    heading.text.push_str(&text);
                }
            }
            Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) => {
                if !dest_url.is_empty() {
                    summary.links.push(dest_url.to_string());
                }
            }
            _ => {}
        }
    }

    summary
}

/// Turn heading text into an anchor id: word characters are kept and lowercased, runs of
/// whitespace and dashes become a single dash, everything else is dropped.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-'))
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut pending_dash = false;
    for c in kept.trim().chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.extend(c.to_lowercase());
        }
    }

    slug
}

/// Suffix `id` with `_1`, `_2`, ... until it is not in `taken`.
fn unique(id: String, taken: &HashSet<String>) -> String {
    if !id.is_empty() && !taken.contains(&id) {
        return id;
    }

    (1..)
        .map(|n| format!("{id}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(id)
}
