use crate::config::Config;
use crate::ctx::Ctx;
use crate::docs::DocTree;
use crate::error::Error;
use crate::nav::{self, NavNode, ResolvedNav};
use crate::out::Out;
use crate::redirects::RedirectTable;
use crate::render::Renderer;
use crate::utils;
use crate::validation::Report;

pub const MANIFEST_FILE: &str = "site_manifest.yml";

/// A loaded and validated site: configuration, documents, navigation and redirects.
pub struct Site {
    pub config: Config,
    pub ctx: Ctx,
    pub docs: DocTree,
    pub nav: ResolvedNav,
    pub redirects: RedirectTable,
    warnings: usize,
}

/// What the renderer is handed: the resolved navigation and where every redirect ends up.
#[derive(Debug, serde::Serialize)]
pub struct Manifest<'s> {
    pub site_name: &'s str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<&'s str>,
    pub use_directory_urls: bool,
    pub nav: &'s ResolvedNav,
    pub redirects: Vec<ManifestRedirect<'s>>,
}

#[derive(Debug, serde::Serialize)]
pub struct ManifestRedirect<'s> {
    pub from: &'s str,
    pub to: &'s str,
}

/// An HTML page left at the URL of a document that moved.
#[derive(Debug, PartialEq, Eq)]
pub struct RedirectStub {
    /// Relative to the site directory.
    pub file: String,
    /// Relative to the stub, or absolute for external targets.
    pub target: String,
    pub canonical: Option<String>,
}

impl Site {
    /// Load the documents and validate navigation, redirects and links, in that order. The first
    /// problem whose validation mode is `error` aborts loading.
    pub fn load(config: Config, strict: bool) -> Result<Self, Error> {
        let mut report = Report::new(strict || config.strict);
        let ctx = Ctx::from_config(&config);

        let docs = DocTree::scan(config.docs_dir())?;
        log::info!(
            "Found {} document(s) and {} file(s) in {}",
            docs.document_count(),
            docs.file_count(),
            docs.root().display()
        );

        let nav = match &config.nav {
            Some(declared) => nav::resolve(declared, &ctx, &docs, &config.validation.nav, &mut report)?,
            None => {
                log::info!("No nav declared; generating one from the document tree");
                let implicit = NavNode::implicit(&docs);
                nav::resolve(&implicit, &ctx, &docs, &config.validation.nav, &mut report)?
            }
        };

        let redirects = RedirectTable::build(
            config.redirect_maps()?,
            &config.config_path,
            &docs,
            &config.validation.redirects,
            &mut report,
        )?;
        if !redirects.is_empty() {
            log::info!("Resolved {} redirect(s)", redirects.len());
        }

        crate::links::check(&docs, &config.validation.links, &mut report)?;

        Ok(Site {
            config,
            ctx,
            docs,
            nav,
            redirects,
            warnings: report.warnings(),
        })
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn manifest(&self) -> Manifest<'_> {
        Manifest {
            site_name: &self.config.site.site_name,
            site_url: self.config.site.site_url.as_deref(),
            use_directory_urls: self.ctx.use_directory_urls(),
            nav: &self.nav,
            redirects: self
                .redirects
                .iter()
                .map(|(from, to)| ManifestRedirect { from, to })
                .collect(),
        }
    }

    pub fn redirect_stubs(&self) -> Vec<RedirectStub> {
        self.redirects
            .iter()
            .map(|(old, target)| redirect_stub(&self.ctx, old, target))
            .collect()
    }

    /// Write the manifest and the redirect stubs.
    pub fn write(&self, out: &Out, renderer: &Renderer) -> Result<(), Error> {
        let manifest = serde_yaml::to_string(&self.manifest())?;
        out.update_file(&mut manifest.as_bytes(), MANIFEST_FILE)?;

        for stub in self.redirect_stubs() {
            let html = renderer.redirect(&stub)?;
            out.update_file(&mut html.as_bytes(), &stub.file)?;
        }

        Ok(())
    }
}

fn redirect_stub(ctx: &Ctx, old: &str, target: &str) -> RedirectStub {
    let file = ctx.output_file(old);

    if utils::is_external(target) {
        return RedirectStub {
            file,
            target: target.to_owned(),
            canonical: Some(target.to_owned()),
        };
    }

    let from_dir = &file[..file.rfind('/').map_or(0, |idx| idx + 1)];
    let (path, fragment) = utils::split_fragment(target);
    let url = ctx.doc_url(path);

    let mut relative = utils::relative_url(from_dir, &url);
    if let Some(fragment) = fragment {
        relative.push('#');
        relative.push_str(fragment);
    }

    RedirectStub {
        canonical: ctx.absolute_url(&url),
        file,
        target: relative,
    }
}
