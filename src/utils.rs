use std::path::Path;

/// Turn a relative filesystem path into a `/`-separated path string. Returns `None` if a part of
/// the path is not UTF-8.
pub fn path_to_url(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();

    // allocate roughly enough for the resulting string
    let mut builder =
        String::with_capacity(path.into_iter().map(|p| p.len() + 1).sum::<usize>().next_power_of_two());

    for (idx, part) in path.into_iter().enumerate() {
        if idx > 0 {
            builder.push('/');
        }
        builder.push_str(part.to_str()?);
    }

    builder.shrink_to_fit();
    Some(builder)
}

/// Whether the target has a URL scheme, e.g. `https://…` or `mailto:…`.
pub fn is_external(target: &str) -> bool {
    match target.find(':') {
        Some(idx) => {
            let scheme = &target[..idx];
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Split `path#fragment`. The fragment is `None` if there is no `#`.
pub fn split_fragment(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (target, None),
    }
}

/// Clean up a path as written in a configuration file: backslashes become slashes and leading
/// `./` and `/` are removed.
pub fn normalize_config_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut path = path.as_str();
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            break;
        }
    }
    path.to_owned()
}

/// Resolve `.` and `..` segments of a `/`-separated relative path. Returns `None` if the path
/// escapes its root.
pub fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }
    Some(parts.join("/"))
}

/// Resolve `target` relative to the directory containing the document at `doc`.
pub fn join_relative(doc: &str, target: &str) -> Option<String> {
    match doc.rfind('/') {
        Some(idx) => normalize(&format!("{}/{}", &doc[..idx], target)),
        None => normalize(target),
    }
}

/// Whether the document is the index page of its directory.
pub fn is_index(path: &str) -> bool {
    matches!(
        path.rsplit('/').next(),
        Some("index.md" | "README.md" | "readme.md")
    )
}

/// The site-relative URL of a source document.
///
/// With directory URLs `a/b.md` becomes `a/b/` and `a/index.md` becomes `a/`. Without, `a/b.md`
/// becomes `a/b.html`. Paths that are not markdown documents are returned unchanged.
pub fn doc_url(path: &str, use_directory_urls: bool) -> String {
    let Some(stem) = path.strip_suffix(".md") else {
        return path.to_owned();
    };

    let (dir, name) = match stem.rfind('/') {
        Some(idx) => (&stem[..=idx], &stem[idx + 1..]),
        None => ("", stem),
    };

    match (name, use_directory_urls) {
        ("index" | "README" | "readme", true) => dir.to_owned(),
        ("README" | "readme", false) => format!("{dir}index.html"),
        (name, true) => format!("{dir}{name}/"),
        (name, false) => format!("{dir}{name}.html"),
    }
}

/// Express the site-relative URL `to` relative to the site-relative directory `from_dir`.
pub fn relative_url(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|p| !p.is_empty()).collect();
    let mut to_parts: Vec<&str> = to.split('/').collect();
    let file = to_parts.pop().unwrap_or("");

    let common = from
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut url = "../".repeat(from.len() - common);
    for part in &to_parts[common..] {
        url.push_str(part);
        url.push('/');
    }
    url.push_str(file);

    if url.is_empty() {
        url.push_str("./");
    }
    url
}

/// Title for a document without an explicit one, derived from its file name: `getting-started.md`
/// becomes `Getting started`. Index pages take the name of their directory.
pub fn title_from_path(path: &str) -> String {
    let mut parts = path.rsplit('/');
    let file = parts.next().unwrap_or(path);
    let name = if is_index(file) {
        match parts.next() {
            Some(dir) => dir,
            None => return "Home".to_owned(),
        }
    } else {
        file.strip_suffix(".md").unwrap_or(file)
    };

    title_from_name(name)
}

/// `some_dir-name` becomes `Some dir name`.
pub fn title_from_name(name: &str) -> String {
    let name = name.replace(['-', '_'], " ");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn path_to_url() {
        use super::path_to_url;
        use std::path::PathBuf;

        assert_eq!(path_to_url("index.md").unwrap(), "index.md");
        assert_eq!(
            path_to_url(PathBuf::from("nested").join("file.md")).unwrap(),
            "nested/file.md"
        );
        assert_eq!(path_to_url("").unwrap(), "");
    }

    #[test]
    fn is_external() {
        use super::is_external;

        assert!(is_external("https://example.com"));
        assert!(is_external("mailto:someone@example.com"));
        assert!(!is_external("guides/package.md"));
        assert!(!is_external("#anchor"));
        assert!(!is_external("page.md#a:b"));
        assert!(!is_external(":nothing"));
    }

    #[test]
    fn normalize() {
        use super::{join_relative, normalize, normalize_config_path};

        assert_eq!(normalize("a/./b/../c").unwrap(), "a/c");
        assert_eq!(normalize("a//b/").unwrap(), "a/b");
        assert!(normalize("../a").is_none());
        assert_eq!(join_relative("guides/index.md", "../reference/cli.md").unwrap(), "reference/cli.md");
        assert_eq!(join_relative("index.md", "guides/").unwrap(), "guides");
        assert!(join_relative("index.md", "../outside.md").is_none());
        assert_eq!(normalize_config_path("./guides\\publish.md"), "guides/publish.md");
        assert_eq!(normalize_config_path("/index.md"), "index.md");
    }

    #[test]
    fn doc_url() {
        use super::doc_url;

        assert_eq!(doc_url("index.md", true), "");
        assert_eq!(doc_url("guides/index.md", true), "guides/");
        assert_eq!(doc_url("guides/README.md", true), "guides/");
        assert_eq!(doc_url("guides/package.md", true), "guides/package/");
        assert_eq!(doc_url("index.md", false), "index.html");
        assert_eq!(doc_url("guides/README.md", false), "guides/index.html");
        assert_eq!(doc_url("guides/package.md", false), "guides/package.html");
        assert_eq!(doc_url("assets/logo.svg", true), "assets/logo.svg");
    }

    #[test]
    fn relative_url() {
        use super::relative_url;

        assert_eq!(relative_url("guides/publish/", "guides/package/"), "../package/");
        assert_eq!(relative_url("guides/publish/", ""), "../../");
        assert_eq!(relative_url("guides/", "guides/package.html"), "package.html");
        assert_eq!(relative_url("", "guides/package/"), "guides/package/");
        assert_eq!(relative_url("", ""), "./");
        assert_eq!(relative_url("a/b/", "c/d.html"), "../../c/d.html");
    }

    #[test]
    fn titles() {
        use super::title_from_path;

        assert_eq!(title_from_path("getting-started/first_steps.md"), "First steps");
        assert_eq!(title_from_path("getting-started/index.md"), "Getting started");
        assert_eq!(title_from_path("index.md"), "Home");
        assert_eq!(title_from_path("CLI.md"), "Cli");
    }
}
