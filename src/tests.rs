#![cfg(test)]

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::Error;
use crate::site::Site;

const UV_LIKE: &str = r#"
site_name: uv
site_url: https://docs.astral.sh/uv/
theme:
  name: material
  features:
    - navigation.instant
nav:
  - Introduction: index.md
  - Guides:
      - Packaging: guides/package.md
{extra_nav}
plugins:
  - search
  - redirects:
      redirect_maps:
        "guides/publish.md": "guides/package.md"
{extra}
"#;

fn project(extra_nav: &str, extra: &str, files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = UV_LIKE
        .replace("{extra_nav}", extra_nav)
        .replace("{extra}", extra);
    fs::write(dir.path().join("mkdocs.yml"), config).unwrap();

    let defaults = [
        ("index.md", "# uv\n\nSee [packaging](guides/package.md#building).\n"),
        ("guides/package.md", "# Packaging\n\n## Building\n"),
    ];
    for (path, content) in defaults.iter().chain(files) {
        let path = dir.path().join("docs").join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    dir
}

fn load(dir: &Path, strict: bool) -> Result<Site, Error> {
    let config = Config::from_path(&Config::discover(dir)?)?;
    Site::load(config, strict)
}

mod site {
    use super::{load, project};
    use crate::error::Error;
    use crate::nav::NavItem;

    #[test]
    fn redirect_ends_at_nav_page() {
        let dir = project("", "", &[]);
        let site = load(dir.path(), false).unwrap();

        assert_eq!(site.redirects.resolve("guides/publish.md"), Some("guides/package.md"));
        assert!(site.nav.contains_page("guides/package.md"));
        assert!(!site.nav.contains_page("guides/publish.md"));
        assert_eq!(site.warnings(), 0);
    }

    #[test]
    fn missing_nav_entry_aborts() {
        let dir = project("  - Reference: reference/missing.md", "", &[]);

        match load(dir.path(), false) {
            Err(Error::BrokenNavLink { title, path }) => {
                assert_eq!(title.as_deref(), Some("Reference"));
                assert_eq!(path, "reference/missing.md");
            }
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("missing nav entry was accepted"),
        }
    }

    #[test]
    fn missing_nav_entry_warns() {
        let dir = project(
            "  - Reference: reference/missing.md",
            "validation:\n  nav:\n    not_found: warn\n",
            &[],
        );
        let site = load(dir.path(), false).unwrap();

        assert_eq!(site.warnings(), 1);
        assert!(site.nav.leaves().iter().any(|item| matches!(
            item,
            NavItem::Page { path, missing: true, .. } if path == "reference/missing.md"
        )));
        assert!(!site.nav.contains_page("reference/missing.md"));

        assert!(matches!(load(dir.path(), true), Err(Error::BrokenNavLink { .. })));
    }

    #[test]
    fn strict_from_config() {
        let dir = project("", "strict: true\n", &[("orphan.md", "[x](gone.md)\n")]);
        assert!(matches!(load(dir.path(), false), Err(Error::BrokenLink { .. })));
    }

    #[test]
    fn redirect_from_live_page() {
        let dir = project("", "", &[("guides/publish.md", "# Publishing\n")]);
        assert!(matches!(
            load(dir.path(), false),
            Err(Error::RedirectCollision { old_path }) if old_path == "guides/publish.md"
        ));
    }

    #[test]
    fn redirect_out_of_docs_dir() {
        let dir = project("", "", &[]);
        let config = std::fs::read_to_string(dir.path().join("mkdocs.yml"))
            .unwrap()
            .replace("\"guides/publish.md\"", "\"../../escaped.md\"");
        std::fs::write(dir.path().join("mkdocs.yml"), config).unwrap();

        assert!(matches!(load(dir.path(), false), Err(Error::MalformedConfig { .. })));
    }

    #[test]
    fn rule_at_document_start() {
        let dir = project(
            "  - Notes: notes.md",
            "",
            &[("notes.md", "---\nIntro paragraph under a rule.\n---\n\n# Notes\n")],
        );
        let site = load(dir.path(), true).unwrap();

        assert_eq!(site.docs.document("notes.md").unwrap().display_title(), "Notes");
    }

    #[test]
    fn implicit_nav() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docsite.yml"), "site_name: implicit\n").unwrap();
        std::fs::create_dir_all(dir.path().join("docs/guides")).unwrap();
        std::fs::write(dir.path().join("docs/index.md"), "# Welcome\n").unwrap();
        std::fs::write(dir.path().join("docs/guides/install.md"), "# Installing\n").unwrap();

        let site = load(dir.path(), true).unwrap();
        let titles: Vec<&str> = site.nav.leaves().iter().map(|item| item.title()).collect();
        assert_eq!(titles, ["Welcome", "Installing"]);
        assert!(site.redirects.is_empty());
    }

    #[test]
    fn missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load(dir.path(), false), Err(Error::MissingConfig { .. })));
    }
}

mod build {
    use super::{load, project};
    use crate::out::Out;
    use crate::render::Renderer;
    use crate::site::MANIFEST_FILE;
    use std::fs;

    #[test]
    fn writes_manifest_and_stubs() {
        let dir = project("", "", &[]);
        let site = load(dir.path(), false).unwrap();

        let out = Out::at(site.config.site_dir(), true).unwrap();
        site.write(&out, &Renderer::build(site.config.custom_dir()).unwrap())
            .unwrap();

        let stub = fs::read_to_string(dir.path().join("site/guides/publish/index.html"))
            .unwrap()
            .replace("&#x2f;", "/");
        assert!(stub.contains(r#"href="../package/""#));
        assert!(stub.contains("https://docs.astral.sh/uv/guides/package/"));

        let manifest: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(dir.path().join("site").join(MANIFEST_FILE)).unwrap())
                .unwrap();
        assert_eq!(manifest["site_name"].as_str(), Some("uv"));
        assert_eq!(manifest["redirects"][0]["from"].as_str(), Some("guides/publish.md"));
        assert_eq!(manifest["redirects"][0]["to"].as_str(), Some("guides/package.md"));
        assert_eq!(manifest["nav"][1]["children"][0]["url"].as_str(), Some("guides/package/"));
    }
}

mod config {
    use super::UV_LIKE;
    use crate::config::{Config, Format};
    use std::path::Path;

    #[test]
    fn round_trip_is_stable() {
        let source = UV_LIKE.replace("{extra_nav}", "").replace("{extra}", "");
        let config = Config::from_str(&source, Format::Yaml, Path::new("mkdocs.yml")).unwrap();

        let once = config.to_yaml().unwrap();
        let reparsed = Config::from_str(&once, Format::Yaml, Path::new("mkdocs.yml")).unwrap();
        assert_eq!(reparsed.to_yaml().unwrap(), once);
        assert_eq!(reparsed.redirect_maps().unwrap(), config.redirect_maps().unwrap());
        assert_eq!(reparsed.nav, config.nav);
        assert!(reparsed.theme.features.contains("navigation.instant"));
    }
}
