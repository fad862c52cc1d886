//! Extract one article from an HTML file (or stdin) and print it as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rs_article_extract::{extract_bytes, Options};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "extract_article")]
#[command(about = "Extract structured article data from an HTML page")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// HTML file to read; stdin when omitted
    input: Option<PathBuf>,

    /// JSON file with extraction options
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Page URL, used for resolving relative links when the page declares none
    #[arg(short, long)]
    url: Option<String>,

    /// Identifier attached to log output
    #[arg(long)]
    id: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Initialize logging based on verbosity flags; `RUST_LOG` wins when set.
fn init_logging(debug: bool, verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else if verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .init();

    debug!("Logging initialized");
}

fn load_options(cli: &Cli) -> Result<Options> {
    let mut options = match &cli.options {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading options file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing options file {}", path.display()))?
        }
        None => Options::default(),
    };
    if cli.url.is_some() {
        options.url.clone_from(&cli.url);
    }
    if cli.id.is_some() {
        options.document_id.clone_from(&cli.id);
    }
    options.validate()?;
    Ok(options)
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.verbose);

    let options = load_options(&cli)?;
    let html = read_input(cli.input.as_ref())?;
    let record = extract_bytes(&html, &options).context("extraction failed")?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
