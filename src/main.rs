use clap::{Parser, Subcommand};
use docsmith::{config, generate, output, scan};
use std::path::PathBuf;

/// Release builds report the crate version; anything else reports the
/// commit it was built from.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        // One-time leak, the string lives as long as the process anyway
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Static documentation site generator with social preview cards")]
#[command(long_about = "\
Static documentation site generator with social preview cards

Your filesystem is the data source. Top-level directories are locales,
markdown files become pages, and every page gets a pre-rendered 1200×630
Open Graph card.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── assets/fonts/                # Primary + fallback fonts for the cards
  ├── en/
  │   ├── index.md                 # → /docs/en/
  │   ├── getting-started.md       # → /docs/en/getting-started/
  │   └── guides/
  │       ├── index.md             # → /docs/en/guides/
  │       └── install.md           # → /docs/en/guides/install/
  └── ko/
      └── index.md                 # → /docs/ko/

Pages may open with TOML frontmatter between +++ fences (title,
description). The title falls back to the first # heading, then to the
humanized filename.

The card font is resolved once per build: the primary font is unpacked,
flattened, and signature-repaired as needed, then trial-rendered; if it
still fails, the fallback font is used for every card.

Run 'docsmith gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (page index)
    #[arg(long, default_value = ".docsmith-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory into a page index
    Scan,
    /// Run the full pipeline: scan → generate HTML and OG images
    Build,
    /// Validate the content directory without building
    Check,
    /// Render a single OG card to a file without building the site
    Og {
        /// Route segments under /og/docs/, e.g. en guides install image.png
        segments: Vec<String>,
        /// Where to write the PNG
        #[arg(long, default_value = "card.png")]
        out: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let index = scan::scan(&cli.source)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let index_path = cli.temp_dir.join("index.json");
            let json = serde_json::to_string_pretty(&index)?;
            std::fs::write(&index_path, json)?;
            output::print_scan_output(&index, &cli.source);
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let index = scan::scan(&cli.source)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let json = serde_json::to_string_pretty(&index)?;
            std::fs::write(cli.temp_dir.join("index.json"), json)?;
            output::print_scan_output(&index, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            generate::generate(&index, &cli.source, &cli.output)?;
            output::print_build_output(&index);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let index = scan::scan(&cli.source)?;
            output::print_scan_output(&index, &cli.source);
            println!("==> Content is valid");
        }
        Command::Og { segments, out } => {
            let index = scan::scan(&cli.source)?;
            let renderer = generate::build_og_renderer(&index, &cli.source)?;
            let png = generate::og_response(&index, &renderer, &segments)?;
            std::fs::write(&out, png)?;
            println!("Wrote {}", out.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
