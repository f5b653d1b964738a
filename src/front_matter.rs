use serde_yaml::{Mapping, Value};

#[derive(Debug, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub extra: Mapping,
}

/// Parses front matter from the content string. Returns the front matter and the rest of the
/// content. YAML front matter is fenced by `---`, TOML front matter by `+++`.
///
/// A `---` block that is not a YAML mapping is a thematic break rather than front matter; the
/// content is then returned unchanged.
pub fn parse_front_matter(content: &str) -> Result<(FrontMatter, &str), String> {
    let mut extra = Mapping::new();
    let mut rest = content;

    if content.starts_with("+++") {
        if let Some(end) = content[3..].find("\n+++").map(|idx| idx + 3) {
            let parsed: Value = toml::from_str(&content[3..end + 1]).map_err(|err| err.to_string())?;
            extra = match parsed {
                Value::Mapping(mapping) => mapping,
                other => {
                    return Err(format!(
                        "expected front matter to be a mapping, found {}",
                        crate::config::kind(&other)
                    ))
                }
            };
            rest = &content[end + 4..];
        }
    } else if content.starts_with("---") {
        if let Some(end) = content[3..].find("\n---").map(|idx| idx + 3) {
            match serde_yaml::from_str::<Value>(&content[3..end + 1]) {
                Ok(Value::Mapping(mapping)) => {
                    extra = mapping;
                    rest = &content[end + 4..];
                }
                Ok(Value::Null) => rest = &content[end + 4..],
                Ok(other) => log::debug!(
                    "Not reading {} between `---` lines as front matter",
                    crate::config::kind(&other)
                ),
                Err(err) => log::debug!("Not reading `---` block as front matter: {err}"),
            }
        }
    }

    let title = match extra.get("title") {
        None => None,
        Some(Value::String(title)) => Some(title.clone()),
        Some(other) => return Err(format!("expected `title` to be a string, found {}", crate::config::kind(other))),
    };

    Ok((FrontMatter { title, extra }, rest))
}
