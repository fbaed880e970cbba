use anyhow::{Context, Result};
use changelog_lint::{ChangelogParser, LintConfig, check_file};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "changelog-lint")]
#[command(about = "validate a Keep a Changelog style CHANGELOG.md", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// path to the changelog file
    path: PathBuf,

    /// print the version of the latest release
    #[arg(short = 'v', long = "version")]
    show_version: bool,

    /// print the changes of the latest release
    #[arg(short, long)]
    changes: bool,

    /// require the latest release to be dated today
    #[arg(long)]
    today: bool,

    /// reserved for stricter checks
    #[arg(long)]
    strict: bool,

    /// config file (defaults to changelog-lint.toml next to the changelog)
    #[arg(long)]
    config: Option<PathBuf>,

    /// output format (json or human)
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Json,
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!(
                "invalid output format: {}, use 'json' or 'human'",
                s
            )),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let parser = check_file(&cli.path, &config)
        .with_context(|| format!("failed to check changelog {}", cli.path.display()))?;

    match cli.format {
        OutputFormat::Json => print_json(&cli, &parser)?,
        OutputFormat::Human => print_human(&cli, &parser),
    }

    if !parser.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<LintConfig> {
    let mut config = match &cli.config {
        Some(path) => LintConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let dir = cli
                .path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            LintConfig::load_or_default(dir)
        }
    };

    // flags only ever tighten the file configuration
    config.parser.release_today |= cli.today;
    config.parser.strict |= cli.strict;

    Ok(config)
}

fn print_human(cli: &Cli, parser: &ChangelogParser) {
    if !parser.is_valid() {
        for error in parser.errors() {
            eprintln!("{}", error);
        }
        return;
    }

    if cli.show_version
        && let Some(release) = parser.latest_release()
    {
        println!("{}", release.version);
    }

    if cli.changes {
        println!("{}", parser.latest_changes());
    }
}

fn print_json(cli: &Cli, parser: &ChangelogParser) -> Result<()> {
    let latest_release = parser.latest_release().map(|release| {
        serde_json::json!({
            "version": release.version,
            "date": release.date,
            "line": release.line,
            "entries": release.entry_count(),
        })
    });

    let errors: Vec<_> = parser
        .errors()
        .iter()
        .map(|error| {
            serde_json::json!({
                "kind": error.kind(),
                "line": error.line(),
                "message": error.message(),
                "details": error,
            })
        })
        .collect();

    let mut output = serde_json::json!({
        "path": cli.path,
        "valid": parser.is_valid(),
        "latest_release": latest_release,
        "errors": errors,
    });

    if cli.changes && parser.is_valid() {
        output["changes"] = serde_json::json!(parser.latest_changes());
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
