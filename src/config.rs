use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::Error;
use crate::nav::NavNode;
use crate::validation::ValidationMode;

/// File names searched for, in order, when no configuration file is given explicitly.
pub const CONFIG_FILE_NAMES: &[&str] = &["docsite.yml", "docsite.yaml", "docsite.toml", "mkdocs.yml"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().map(std::ffi::OsStr::as_encoded_bytes) {
            Some(b"toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }
}

/// The whole configuration file. Site metadata lives at the top level of the file, next to the
/// other sections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub site: SiteConfig,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
    #[serde(default = "default_true")]
    pub use_directory_urls: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
    #[serde(default)]
    pub markdown_extensions: PluginConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<Vec<NavNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_css: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_javascript: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watch: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<String>,
    /// Passed through to the theme untouched.
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
    /// Top-level keys this tool does not know about.
    #[serde(flatten)]
    pub unrecognized: Mapping,

    /// Where the configuration was loaded from.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_site_dir() -> PathBuf {
    PathBuf::from("site")
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_uri: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ThemeConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub features: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<Palette>,
    /// Theme options not interpreted here (fonts, icons, ...).
    #[serde(flatten)]
    pub options: Mapping,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeConfig {
            name: default_theme_name(),
            logo: None,
            favicon: None,
            custom_dir: None,
            language: None,
            features: BTreeSet::new(),
            palette: Vec::new(),
            options: Mapping::new(),
        }
    }
}

fn default_theme_name() -> String {
    "mkdocs".to_owned()
}

#[derive(Deserialize)]
struct FullTheme {
    #[serde(default = "default_theme_name")]
    name: String,
    logo: Option<String>,
    favicon: Option<String>,
    custom_dir: Option<String>,
    language: Option<String>,
    #[serde(default)]
    features: BTreeSet<String>,
    #[serde(default)]
    palette: Option<PaletteList>,
    #[serde(flatten)]
    options: Mapping,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaletteList {
    One(Palette),
    Many(Vec<Palette>),
}

impl TryFrom<Value> for ThemeConfig {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::String(name) = value {
            return Ok(ThemeConfig {
                name,
                ..ThemeConfig::default()
            });
        }

        let theme: FullTheme = serde_yaml::from_value(value).map_err(|err| format!("theme: {err}"))?;
        let palette = match theme.palette {
            None => vec![],
            Some(PaletteList::One(palette)) => vec![palette],
            Some(PaletteList::Many(palette)) => palette,
        };

        Ok(ThemeConfig {
            name: theme.name,
            logo: theme.logo,
            favicon: theme.favicon,
            custom_dir: theme.custom_dir,
            language: theme.language,
            features: theme.features,
            palette,
            options: theme.options,
        })
    }
}

/// A colour palette variant, selected by a media query and switched with a toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Palette {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle: Option<PaletteToggle>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteToggle {
    pub icon: String,
    pub name: String,
}

/// Named option bags, in declaration order. Used for both `plugins` and `markdown_extensions`.
///
/// Accepts a list whose items are either a bare name or a single-key mapping from name to
/// options, or a mapping from name to options. A null option bag means "no options".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PluginConfig {
    entries: Vec<(String, Mapping)>,
}

impl PluginConfig {
    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, options)| options)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Mapping)> {
        self.entries.iter().map(|(name, options)| (name.as_str(), options))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn push(&mut self, name: Value, options: Value) -> Result<(), String> {
        let name = match name {
            Value::String(name) => name,
            other => return Err(format!("expected a name, found {}", kind(&other))),
        };
        let options = match options {
            Value::Null => Mapping::new(),
            Value::Mapping(options) => options,
            other => {
                return Err(format!(
                    "options of `{name}` must be a mapping, found {}",
                    kind(&other)
                ))
            }
        };
        if self.contains(&name) {
            return Err(format!("`{name}` is declared more than once"));
        }

        self.entries.push((name, options));
        Ok(())
    }
}

impl TryFrom<Value> for PluginConfig {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut config = PluginConfig::default();

        match value {
            Value::Null => {}
            Value::Sequence(items) => {
                for item in items {
                    match item {
                        Value::Mapping(mapping) => {
                            let mut entries = mapping.into_iter();
                            match (entries.next(), entries.next()) {
                                (Some((name, options)), None) => config.push(name, options)?,
                                _ => return Err("each list item must name exactly one entry".to_owned()),
                            }
                        }
                        name => config.push(name, Value::Null)?,
                    }
                }
            }
            Value::Mapping(mapping) => {
                for (name, options) in mapping {
                    config.push(name, options)?;
                }
            }
            other => return Err(format!("expected a list or a mapping, found {}", kind(&other))),
        }

        Ok(config)
    }
}

impl From<PluginConfig> for Value {
    fn from(config: PluginConfig) -> Self {
        Value::Sequence(
            config
                .entries
                .into_iter()
                .map(|(name, options)| {
                    if options.is_empty() {
                        Value::String(name)
                    } else {
                        let mut mapping = Mapping::new();
                        mapping.insert(Value::String(name), Value::Mapping(options));
                        Value::Mapping(mapping)
                    }
                })
                .collect(),
        )
    }
}

impl Serialize for PluginConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PluginConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PluginConfig::try_from(value).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// How each class of reference problem is handled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawValidation")]
pub struct ValidationConfig {
    pub nav: NavValidation,
    pub links: LinkValidation,
    pub redirects: RedirectValidation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavValidation {
    pub omitted_files: ValidationMode,
    pub not_found: ValidationMode,
    pub absolute_links: ValidationMode,
}

impl Default for NavValidation {
    fn default() -> Self {
        NavValidation {
            omitted_files: ValidationMode::Info,
            not_found: ValidationMode::Error,
            absolute_links: ValidationMode::Info,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkValidation {
    pub not_found: ValidationMode,
    pub absolute_links: ValidationMode,
    pub unrecognized_links: ValidationMode,
    pub anchors: ValidationMode,
}

impl Default for LinkValidation {
    fn default() -> Self {
        LinkValidation {
            not_found: ValidationMode::Warn,
            absolute_links: ValidationMode::Info,
            unrecognized_links: ValidationMode::Info,
            anchors: ValidationMode::Info,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RedirectValidation {
    pub not_found: ValidationMode,
    /// Longest allowed redirect chain. Defaults to the number of redirects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<usize>,
}

impl Default for RedirectValidation {
    fn default() -> Self {
        RedirectValidation {
            not_found: ValidationMode::Warn,
            max_hops: None,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawValidation {
    omitted_files: Option<ValidationMode>,
    not_found: Option<ValidationMode>,
    absolute_links: Option<ValidationMode>,
    unrecognized_links: Option<ValidationMode>,
    anchors: Option<ValidationMode>,
    nav: RawNavValidation,
    links: RawLinkValidation,
    redirects: RawRedirectValidation,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawNavValidation {
    omitted_files: Option<ValidationMode>,
    not_found: Option<ValidationMode>,
    absolute_links: Option<ValidationMode>,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawLinkValidation {
    not_found: Option<ValidationMode>,
    absolute_links: Option<ValidationMode>,
    unrecognized_links: Option<ValidationMode>,
    anchors: Option<ValidationMode>,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawRedirectValidation {
    not_found: Option<ValidationMode>,
    max_hops: Option<usize>,
}

impl From<RawValidation> for ValidationConfig {
    fn from(raw: RawValidation) -> Self {
        let nav = NavValidation::default();
        let links = LinkValidation::default();
        let redirects = RedirectValidation::default();

        // Nested keys win over the top-level shorthand, which wins over the defaults.
        ValidationConfig {
            nav: NavValidation {
                omitted_files: raw.nav.omitted_files.or(raw.omitted_files).unwrap_or(nav.omitted_files),
                not_found: raw.nav.not_found.or(raw.not_found).unwrap_or(nav.not_found),
                absolute_links: raw
                    .nav
                    .absolute_links
                    .or(raw.absolute_links)
                    .unwrap_or(nav.absolute_links),
            },
            links: LinkValidation {
                not_found: raw.links.not_found.or(raw.not_found).unwrap_or(links.not_found),
                absolute_links: raw
                    .links
                    .absolute_links
                    .or(raw.absolute_links)
                    .unwrap_or(links.absolute_links),
                unrecognized_links: raw
                    .links
                    .unrecognized_links
                    .or(raw.unrecognized_links)
                    .unwrap_or(links.unrecognized_links),
                anchors: raw.links.anchors.or(raw.anchors).unwrap_or(links.anchors),
            },
            redirects: RedirectValidation {
                not_found: raw.redirects.not_found.unwrap_or(redirects.not_found),
                max_hops: raw.redirects.max_hops,
            },
        }
    }
}

impl Config {
    /// Find the configuration file in `dir`.
    pub fn discover(dir: &Path) -> Result<PathBuf, Error> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::MissingConfig { dir: dir.to_owned() })
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let config = Self::from_str(&source, Format::from_path(path), path)?;

        for key in config.unrecognized.keys() {
            log::warn!(
                "Unrecognized configuration key in {}: {}",
                path.display(),
                serde_yaml::to_string(key).unwrap_or_default().trim_end()
            );
        }

        Ok(config)
    }

    /// Parse configuration source. `origin` is only used for error messages.
    pub fn from_str(source: &str, format: Format, origin: &Path) -> Result<Self, Error> {
        Self::from_str_with_env(source, format, origin, |name| std::env::var(name).ok())
    }

    pub fn from_str_with_env(
        source: &str,
        format: Format,
        origin: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let malformed = |message: String| Error::MalformedConfig {
            path: origin.to_owned(),
            message,
        };

        let mut value: Value = match format {
            Format::Yaml => serde_yaml::from_str(source).map_err(|err| malformed(err.to_string()))?,
            Format::Toml => toml::from_str(source).map_err(|err| malformed(err.to_string()))?,
        };
        if !value.is_mapping() {
            return Err(malformed(format!(
                "expected a mapping at the top level, found {}",
                kind(&value)
            )));
        }
        expand_env(&mut value, &env);

        let mut config: Config = serde_yaml::from_value(value).map_err(|err| malformed(err.to_string()))?;
        config.config_path = origin.to_owned();
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Directory the configuration file lives in. Relative directories in the configuration are
    /// relative to this.
    pub fn root(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new(""))
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root().join(&self.docs_dir)
    }

    pub fn site_dir(&self) -> PathBuf {
        self.root().join(&self.site_dir)
    }

    pub fn custom_dir(&self) -> Option<PathBuf> {
        self.theme.custom_dir.as_ref().map(|dir| self.root().join(dir))
    }

    /// The `redirect_maps` option of the `redirects` plugin, in declaration order.
    pub fn redirect_maps(&self) -> Result<Vec<(String, String)>, Error> {
        let malformed = |message: String| Error::MalformedConfig {
            path: self.config_path.clone(),
            message,
        };

        let Some(maps) = self
            .plugins
            .get("redirects")
            .and_then(|options| options.get("redirect_maps"))
        else {
            return Ok(vec![]);
        };

        let maps = match maps {
            Value::Null => return Ok(vec![]),
            Value::Mapping(maps) => maps,
            other => {
                return Err(malformed(format!(
                    "redirects.redirect_maps must be a mapping, found {}",
                    kind(other)
                )))
            }
        };

        maps.iter()
            .map(|(old, new)| match (old, new) {
                (Value::String(old), Value::String(new)) => Ok((old.clone(), new.clone())),
                _ => Err(malformed(format!(
                    "redirects.redirect_maps entries must map a string to a string, found {} -> {}",
                    kind(old),
                    kind(new)
                ))),
            })
            .collect()
    }
}

/// Replace `!ENV` tagged values with the value of an environment variable.
///
/// `!ENV NAME` reads one variable. `!ENV [A, B, default]` reads the first variable that is set,
/// falling back to the last element.
fn expand_env(value: &mut Value, env: &impl Fn(&str) -> Option<String>) {
    match value {
        Value::Sequence(items) => items.iter_mut().for_each(|item| expand_env(item, env)),
        Value::Mapping(mapping) => mapping.values_mut().for_each(|item| expand_env(item, env)),
        Value::Tagged(tagged) if tagged.tag == "ENV" => {
            let (names, default) = match &tagged.value {
                Value::String(name) => (vec![name.as_str()], Value::Null),
                Value::Sequence(items) => match items.split_last() {
                    Some((default, names)) if !names.is_empty() => {
                        (names.iter().filter_map(Value::as_str).collect(), default.clone())
                    }
                    _ => (items.iter().filter_map(Value::as_str).collect(), Value::Null),
                },
                _ => (vec![], Value::Null),
            };

            *value = names
                .into_iter()
                .find_map(|name| env(name))
                .map(Value::String)
                .unwrap_or(default);
        }
        Value::Tagged(tagged) => expand_env(&mut tagged.value, env),
        _ => {}
    }
}
