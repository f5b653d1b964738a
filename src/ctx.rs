use std::sync::Arc;

use crate::{config::Config, utils};

struct InnerCtx {
    site_url: Option<String>,
    use_directory_urls: bool,
}

/// Site build context: how source paths map onto URLs and output files. The context is cheap to
/// clone.
#[derive(Clone)]
pub struct Ctx {
    inner: Arc<InnerCtx>,
}

impl Ctx {
    pub fn from_config(config: &Config) -> Self {
        Ctx::new(config.site.site_url.clone(), config.use_directory_urls)
    }

    pub fn new(site_url: Option<String>, use_directory_urls: bool) -> Self {
        Ctx {
            inner: Arc::new(InnerCtx {
                site_url: site_url.map(|url| url.trim_end_matches('/').to_owned()),
                use_directory_urls,
            }),
        }
    }

    pub fn use_directory_urls(&self) -> bool {
        self.inner.use_directory_urls
    }

    /// Site-relative URL of a source path.
    pub fn doc_url(&self, path: &str) -> String {
        utils::doc_url(path, self.inner.use_directory_urls)
    }

    /// Output file, relative to the site directory, a source document is rendered to.
    pub fn output_file(&self, path: &str) -> String {
        let url = self.doc_url(path);
        if url.is_empty() || url.ends_with('/') {
            format!("{url}index.html")
        } else {
            url
        }
    }

    /// Turn a site-relative URL into an absolute URL. `None` if no `site_url` is configured.
    pub fn absolute_url(&self, url: &str) -> Option<String> {
        self.inner
            .site_url
            .as_ref()
            .map(|site_url| format!("{site_url}/{url}"))
    }
}
