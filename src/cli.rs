use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, ClapArgs)]
pub struct SiteArgs {
    /// Directory to look for the configuration file in.
    #[arg(default_value = "./")]
    pub path: PathBuf,
    /// Configuration file to use instead of discovering one in `path`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Treat warnings as errors.
    #[arg(short, long, default_value = "false")]
    pub strict: bool,
}

#[derive(Debug, Parser)]
pub struct BuildCommand {
    #[command(flatten)]
    pub site: SiteArgs,
    /// Keep existing files in the site directory.
    #[arg(long, default_value = "false")]
    pub no_clean: bool,
}

#[derive(Debug, Parser)]
pub struct RedirectCommand {
    /// Source path of the page that moved, relative to the docs directory.
    pub old: String,
    #[command(flatten)]
    pub site: SiteArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate the configuration, navigation, redirects and links.
    Check(SiteArgs),
    /// Validate, then write the site manifest and redirect pages.
    Build(BuildCommand),
    /// Print the configuration with defaults filled in.
    Config(SiteArgs),
    /// Print the resolved navigation.
    Nav(SiteArgs),
    /// Show where a redirected page ends up.
    Redirect(RedirectCommand),
}

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
    /// Log debug output.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,
}
