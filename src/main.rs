use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tufte_press::config::{self, Overrides};
use tufte_press::generate::Site;
use tufte_press::{markdown, output, table};

#[derive(Parser)]
#[command(name = "tufte-press")]
#[command(about = "Static site generator for Tufte CSS blogs")]
#[command(long_about = "\
Static site generator for Tufte CSS blogs

Posts are hand-written HTML files grouped by category. Compiling rewrites the
site in place: category listing pages, the sidebar on every page, and the
homepage's recent posts.

Site structure:

  site/
  ├── config.toml                  # Optional, see 'tufte-press gen-config'
  ├── index.html                   # Homepage with <div class=\"content\">
  └── posts/
      ├── essays/                  # Category
      │   ├── essays.html          # Listing page (regenerated)
      │   └── on-tufte.html        # Post
      └── notes/
          └── reading-list.html

Each post needs an <h1> title, an <h2> subtitle and a
<timestamp>DD/MM/YYYY</timestamp> element.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate listing pages, sidebars and recent posts
    Compile,
    /// Compile with every link prefixed by BASE_URL
    CompileFor {
        /// Hosting URL, e.g. https://user.github.io/blog
        base_url: String,
    },
    /// Load every post and report problems without writing anything
    Check,
    /// List categories and posts
    Scan {
        /// Print JSON instead of the text listing
        #[arg(long)]
        json: bool,
    },
    /// Convert a Markdown file to HTML
    Markdown {
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a CSV file to an HTML table
    Table {
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip the line-broken layout
        #[arg(long)]
        raw: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Compile => compile(&cli.root, Overrides::default())?,
        Command::CompileFor { base_url } => compile(
            &cli.root,
            Overrides {
                base_url: Some(base_url),
            },
        )?,
        Command::Check => {
            let site = load_site(&cli.root, Overrides::default())?;
            println!("==> Checking {}", site.posts_dir().display());
            let categories = site.categories()?;
            output::print_scan_output(&categories, site.root());
            println!("==> All posts are valid");
        }
        Command::Scan { json } => {
            let site = load_site(&cli.root, Overrides::default())?;
            let categories = site.categories()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&categories)?);
            } else {
                output::print_scan_output(&categories, site.root());
            }
        }
        Command::Markdown { input, output: dest } => match dest {
            Some(path) => markdown::convert_file(&input, &path)?,
            None => print!("{}", markdown::to_html(&std::fs::read_to_string(&input)?)),
        },
        Command::Table {
            input,
            output: dest,
            raw,
        } => {
            let layout = if raw {
                table::Layout::Compact
            } else {
                table::Layout::LineBroken
            };
            match dest {
                Some(path) => table::convert_csv_file(&input, &path, layout)?,
                None => println!("{}", layout.apply(&table::csv_file_to_html(&input)?)),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_site(root: &Path, overrides: Overrides) -> Result<Site, config::ConfigError> {
    let config = config::load_config(root, overrides)?;
    Ok(Site::new(root, config))
}

fn compile(root: &Path, overrides: Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let site = load_site(root, overrides)?;
    println!("==> Compiling {}", site.root().display());
    let report = site.compile()?;
    output::print_compile_output(&report, site.root(), &site.homepage());
    println!("==> Compile complete");
    Ok(())
}
