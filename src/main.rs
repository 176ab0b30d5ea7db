use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use quire::context::BuildInfo;
use quire::generate::SitePaths;
use quire::{GENERATOR, check, config, generate, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Static site generator for Markdown blogs")]
#[command(long_about = "\
Static site generator for Markdown blogs

Posts and pages are Markdown files paired with a YAML (or TOML) descriptor of
the same name. Posts are collected into a date-sorted archive, grouped into
categories, and syndicated through an Atom feed.

Site structure:

  site/
  ├── quire.yaml                   # Site metadata and categoryMap
  ├── posts/
  │   ├── hello.md                 # Post body
  │   └── hello.yaml               # title, date, categories, url (optional)
  ├── pages/
  │   ├── about.md
  │   └── about.yaml               # title, url (optional)
  └── themes/templates/
      ├── post.html                # one per post
      ├── page.html                # one per page
      ├── categories.html          # one per category
      └── atom.xml                 # the feed

Output:

  public/<url>/index.html          # url defaults to the file name plus /
  public/atom.xml                  # 21 most recent posts
  public/categories/<slug>/index.html

Run 'quire gen-config' to print a documented quire.yaml.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory [default: <root>/public]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Site config file [default: <root>/quire.yaml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Template directory [default: <root>/themes/templates]
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the whole site into the output directory
    Build(BuildArgs),
    /// Validate config, templates and every descriptor without writing
    Check,
    /// Print a documented starter quire.yaml
    GenConfig,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Build timestamp exposed as `updated` (RFC 3339); defaults to now.
    /// Fixing it makes rebuilds byte-identical.
    #[arg(long, value_parser = parse_timestamp)]
    updated: Option<DateTime<Utc>>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

/// Resolve the site layout, with explicit flags relative to the root.
fn site_paths(cli: &Cli) -> SitePaths {
    let mut paths = SitePaths::from_root(&cli.root);
    let under_root = |p: &Path| cli.root.join(p);
    if let Some(output) = &cli.output {
        paths.output = under_root(output);
    }
    if let Some(config) = &cli.config {
        paths.config = under_root(config);
    }
    if let Some(templates) = &cli.templates {
        paths.templates = under_root(templates);
    }
    paths
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let paths = site_paths(&cli);

    match &cli.command {
        Command::Build(args) => {
            let info = BuildInfo::new(GENERATOR, args.updated.unwrap_or_else(Utc::now));
            println!("==> Building {}", cli.root.display());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    println!("{}", output::format_build_event(&event));
                }
            });
            let result = generate::generate(&paths, &info, Some(&tx));
            drop(tx);
            printer
                .join()
                .map_err(|_| "status printer thread panicked")?;

            let summary = result?;
            output::print_build_summary(&summary, &paths.output);
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let report = check::check(&paths)?;
            output::print_check_report(&report, &cli.root);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_yaml());
        }
    }

    Ok(())
}
