use anyhow::Context;
use clap::Parser;
use std::time::Instant;

mod cli;
mod config;
mod ctx;
mod docs;
mod error;
mod front_matter;
mod links;
mod markdown;
mod nav;
mod out;
mod redirects;
mod render;
mod site;
mod utils;
mod validation;

#[cfg(test)]
mod tests;

use config::Config;
use out::Out;
use site::Site;

fn load(args: &cli::SiteArgs) -> anyhow::Result<Site> {
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::discover(&args.path)?,
    };
    let config = Config::from_path(&config_path)
        .with_context(|| format!("Loading {}", config_path.display()))?;
    log::info!("Loaded {}", config_path.display());
    log::debug!(
        "Theme `{}`, {} plugin(s): {}",
        config.theme.name,
        config.plugins.len(),
        config
            .plugins
            .iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let instant = Instant::now();
    let site = Site::load(config, args.strict).with_context(|| "Validating site")?;
    log::info!(
        "======== Validation took {}ms ========",
        Instant::now().duration_since(instant).as_millis()
    );
    if site.warnings() > 0 {
        log::warn!("Finished with {} warning(s)", site.warnings());
    }

    Ok(site)
}

fn build(site: &Site, clean: bool) -> anyhow::Result<()> {
    let out = Out::at(site.config.site_dir(), clean)?;
    let renderer = render::Renderer::build(site.config.custom_dir())?;

    site.write(&out, &renderer)
        .with_context(|| format!("Writing to {}", out.prefix().display()))?;
    log::info!(
        "Wrote {} and {} redirect page(s) to {}",
        site::MANIFEST_FILE,
        site.redirects.len(),
        out.prefix().display()
    );

    Ok(())
}

fn redirect(site: &Site, old: &str) -> anyhow::Result<()> {
    let Some(mut hop) = site.redirects.get(old) else {
        anyhow::bail!("`{old}` is not redirected");
    };

    let mut chain = vec![old.to_owned(), hop.to_owned()];
    while let Some(next) = site.redirects.get(utils::split_fragment(hop).0) {
        chain.push(next.to_owned());
        hop = next;
    }
    println!("{}", chain.join(" -> "));

    let target = site.redirects.resolve(old).unwrap_or(hop);
    if utils::is_external(target) {
        return Ok(());
    }
    let (path, _) = utils::split_fragment(target);
    println!("url: /{}", site.ctx.doc_url(path));

    if let Some((previous, next)) = site.nav.neighbours(path) {
        let title = |item: Option<&nav::NavItem>| item.map_or("-", nav::NavItem::title).to_owned();
        println!("nav: after {}, before {}", title(previous), title(next));
    } else if !site.nav.contains_page(path) {
        println!("nav: not listed");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    {
        use simplelog as s;
        s::TermLogger::init(
            if args.verbose {
                s::LevelFilter::Debug
            } else {
                s::LevelFilter::Info
            },
            s::Config::default(),
            s::TerminalMode::Mixed,
            s::ColorChoice::Auto,
        )?;
    }

    match args.command {
        cli::Commands::Check(args) => {
            let site = load(&args)?;
            log::info!(
                "{}: {} document(s), {} nav entries, {} redirect(s)",
                site.config.site.site_name,
                site.docs.document_count(),
                site.nav.leaves().len(),
                site.redirects.len()
            );
        }
        cli::Commands::Build(args) => {
            let site = load(&args.site)?;
            build(&site, !args.no_clean)?;
        }
        cli::Commands::Config(args) => {
            let site = load(&args)?;
            print!("{}", site.config.to_yaml()?);
        }
        cli::Commands::Nav(args) => {
            let site = load(&args)?;
            print!("{}", site.nav);
        }
        cli::Commands::Redirect(args) => {
            let site = load(&args.site)?;
            redirect(&site, &args.old)?;
        }
    }

    Ok(())
}
