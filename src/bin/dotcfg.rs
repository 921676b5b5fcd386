// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotcfg::{
    assets::{icon::IconSelection, wallpaper::AddOptions},
    packages,
    path::default_settings_file,
    Dotfiles, Settings,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    ffi::OsString,
    fs::read_dir,
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dotcfg [options] <dotcfg-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to settings file to use instead of the default one.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let settings = match self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::load(default_settings_file()?)?,
        };
        let dotfiles = Dotfiles::new(&settings)?;

        match self.command {
            Command::Packages(opts) => run_packages(&dotfiles, opts),
            Command::Wallpapers(opts) => run_wallpapers(&dotfiles, opts),
            Command::IconTemplates(opts) => run_icon_templates(&dotfiles, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Manage system packages through Ansible.
    #[command(subcommand)]
    Packages(PackagesCommand),

    /// Manage wallpapers archive.
    #[command(subcommand)]
    Wallpapers(WallpapersCommand),

    /// Manage icon templates.
    #[command(subcommand)]
    IconTemplates(IconTemplatesCommand),
}

#[derive(Debug, Clone, Subcommand)]
enum PackagesCommand {
    /// List roles and their tags from playbook.
    List,

    /// Install packages by running playbook.
    #[command(override_usage = "dotcfg packages install [options] [-- <ansible_args>...]")]
    Install(InstallOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstallOptions {
    /// Only run roles with these tags.
    #[arg(short, long, value_delimiter = ',', value_name = "tags")]
    pub tags: Vec<String>,

    /// Extra arguments passed along to ansible-playbook.
    #[arg(last = true, value_name = "ansible_args")]
    pub extra_args: Vec<OsString>,
}

#[derive(Debug, Clone, Subcommand)]
enum WallpapersCommand {
    /// List wallpapers in archive.
    List,

    /// Add wallpaper to archive.
    #[command(override_usage = "dotcfg wallpapers add [options] <path>")]
    Add(AddWallpaperOptions),

    /// Extract wallpapers into directory.
    #[command(override_usage = "dotcfg wallpapers extract <output_dir>")]
    Extract(ExtractOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct AddWallpaperOptions {
    /// Path to wallpaper to add.
    #[arg(required = true, value_name = "path")]
    pub path: PathBuf,

    /// Replace wallpaper of the same name.
    #[arg(short, long)]
    pub force: bool,

    /// Accept files without an image extension.
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ExtractOptions {
    /// Directory to extract `wallpapers/` into.
    #[arg(required = true, value_name = "output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Subcommand)]
enum IconTemplatesCommand {
    /// List categories, or icons of one category.
    List(ListIconsOptions),

    /// Show details about an icon.
    #[command(override_usage = "dotcfg icon-templates show <name>")]
    Show(ShowIconOptions),

    /// Copy icons into target directory.
    #[command(override_usage = "dotcfg icon-templates copy [options] <target>")]
    Copy(CopyIconsOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListIconsOptions {
    /// List icons of this category.
    #[arg(short, long, value_name = "category")]
    pub category: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ShowIconOptions {
    /// Name of icon file.
    #[arg(required = true, value_name = "name")]
    pub name: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CopyIconsOptions {
    /// Directory to copy icons into.
    #[arg(required = true, value_name = "target")]
    pub target: PathBuf,

    /// Only copy icons of this category.
    #[arg(group = "selection", short, long, value_name = "category")]
    pub category: Option<String>,

    /// Only copy these icons.
    #[arg(group = "selection", short, long, value_delimiter = ',', value_name = "icons")]
    pub icons: Vec<String>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:#}");
        exit(exit_code(&error));
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<packages::Error>() {
        Some(packages::Error::AnsibleFailed { code: Some(code) }) => *code,
        _ => 1,
    }
}

fn run_packages(dotfiles: &Dotfiles, cmd: PackagesCommand) -> Result<()> {
    let packages = dotfiles.packages();
    match cmd {
        PackagesCommand::List => {
            let roles = packages.list_roles()?;
            if roles.is_empty() {
                println!("No roles found in the playbook");
                return Ok(());
            }

            println!("Available packages (roles):");
            for role in &roles {
                let tags = match role.tags.is_empty() {
                    true => "[no tags]".to_string(),
                    false => format!("[{}]", role.tags.join(", ")),
                };
                println!("  - {:<20} {tags}", role.name);
            }
            println!("Total: {} role(s)", roles.len());
        }
        PackagesCommand::Install(opts) => {
            info!("working directory {:?}", packages.ansible_dir().display());
            packages.install(opts.tags, opts.extra_args)?;
        }
    }

    Ok(())
}

fn run_wallpapers(dotfiles: &Dotfiles, cmd: WallpapersCommand) -> Result<()> {
    let wallpapers = dotfiles.assets().wallpapers();
    match cmd {
        WallpapersCommand::List => {
            let mut names = wallpapers.list()?;
            if names.is_empty() {
                println!("No wallpapers in archive");
                return Ok(());
            }

            names.sort();
            println!("Wallpapers in archive ({}):", names.len());
            for name in names {
                println!("  - {name}");
            }
        }
        WallpapersCommand::Add(opts) => {
            let options = AddOptions {
                overwrite: opts.force,
                validate_extension: !opts.no_validate,
            };
            let name = wallpapers.add(&opts.path, options)?;
            println!("Successfully added '{name}' to wallpapers archive");
        }
        WallpapersCommand::Extract(opts) => {
            let target = wallpapers.extract(&opts.output_dir)?;
            let count = count_files(&target)
                .with_context(|| format!("failed to read {:?}", target.display()))?;
            println!("Extracted {count} wallpaper(s) to {}", target.display());
        }
    }

    Ok(())
}

fn count_files(dir: &Path) -> std::io::Result<usize> {
    let mut count = 0;
    for entry in read_dir(dir)? {
        if entry?.file_type()?.is_file() {
            count += 1;
        }
    }

    Ok(count)
}

fn run_icon_templates(dotfiles: &Dotfiles, cmd: IconTemplatesCommand) -> Result<()> {
    let icons = dotfiles.assets().icon_templates();
    match cmd {
        IconTemplatesCommand::List(opts) => {
            if let Some(category) = opts.category {
                let names = icons.list(Some(&category))?;
                if names.is_empty() {
                    println!("No icons in '{category}'");
                    return Ok(());
                }

                println!("Icons in '{category}':");
                for name in &names {
                    println!("  - {name}");
                }
                println!("Total: {} icon(s)", names.len());
                return Ok(());
            }

            let categories = icons.categories()?;
            if categories.is_empty() {
                println!("No categories found");
                return Ok(());
            }

            let mut total = 0;
            println!("Available icon categories:");
            for category in &categories {
                let count = icons.list(Some(category))?.len();
                total += count;
                println!("  - {category:<20} ({count} icons)");
            }
            println!("Total: {} categories, {total} icons", categories.len());
        }
        IconTemplatesCommand::Show(opts) => {
            let info = icons.show(&opts.name)?;
            println!("Icon: {}", info.name);
            println!("  Category:  {}", info.category);
            println!("  Path:      {}", info.path.display());
            if !info.variants.is_empty() {
                println!("  Variants:  {}", info.variants.join(", "));
            }
        }
        IconTemplatesCommand::Copy(opts) => {
            let selection = match (opts.category, opts.icons) {
                (Some(category), _) => IconSelection::Category(category),
                (None, names) if !names.is_empty() => IconSelection::Icons(names),
                _ => IconSelection::All,
            };

            let copied = icons.copy(&opts.target, selection)?;
            if copied.is_empty() {
                println!("No icons copied");
            } else {
                println!("Copied {} icon(s) to {}", copied.len(), opts.target.display());
            }
        }
    }

    Ok(())
}
