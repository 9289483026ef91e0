//! doc-extractor CLI
//!
//! Command-line interface for extracting endpoints, text, and metadata from
//! API specs, office documents, text files, and Confluence pages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use doc_extractor_common::{Endpoint, ExtractorConfig, ParsedDocument};
use doc_extractor_parser::{
    get_schema, validate_against_schema, HttpFetcher, OpenApiExtractor, ParserRegistry,
    SUPPORTED_FORMATS,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Characters of content shown by `parse` without `--json`
const PREVIEW_CHARS: usize = 400;

#[derive(Parser)]
#[command(name = "doc-extractor")]
#[command(version, about = "Extract knowledge from API specs, documents, and wiki pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML configuration file (confluence_token, user_agent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse any supported document and summarize it
    #[command(after_help = "EXAMPLES:\n  \
        # Summarize an OpenAPI spec\n  \
        doc-extractor parse specs/petstore.yaml\n\n  \
        # Dump a spreadsheet as JSON\n  \
        doc-extractor parse reports/q3.xlsx --json\n\n  \
        # Fetch a Confluence page (needs CONFLUENCE_TOKEN)\n  \
        doc-extractor parse https://acme.atlassian.net/wiki/spaces/ENG/pages/123/Runbook")]
    Parse {
        /// File path or URL
        locator: String,

        /// Print the full parsed document as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the endpoints of a Swagger/OpenAPI spec
    Endpoints {
        /// Spec file path or URL
        locator: String,
    },

    /// Validate a JSON data file against a schema in an API spec
    #[command(after_help = "EXAMPLES:\n  \
        doc-extractor validate \\\n    \
        --spec specs/petstore.yaml \\\n    \
        --schema '#/components/schemas/Pet' \\\n    \
        --data pet.json")]
    Validate {
        /// Spec file path or URL
        #[arg(long)]
        spec: String,

        /// Local schema reference, e.g. `#/components/schemas/User`
        #[arg(long)]
        schema: String,

        /// JSON file holding the data to check
        #[arg(long)]
        data: PathBuf,
    },

    /// List supported formats in selection order
    Formats,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(
        config_file = ?cli.config,
        confluence_token = config.confluence_token().is_some(),
        "Loaded configuration"
    );

    match cli.command {
        Commands::Parse { locator, json } => {
            parse_command(&config, &locator, json, cli.verbose).await?
        }
        Commands::Endpoints { locator } => {
            endpoints_command(&config, &locator, cli.verbose).await?
        }
        Commands::Validate { spec, schema, data } => {
            validate_command(&config, &spec, &schema, &data).await?
        }
        Commands::Formats => formats_command(),
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// File settings first, then environment overrides
fn load_config(path: Option<&Path>) -> Result<ExtractorConfig> {
    let config = match path {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ExtractorConfig::default(),
    };
    Ok(config.with_env_overrides())
}

async fn parse_command(
    config: &ExtractorConfig,
    locator: &str,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let registry = ParserRegistry::new(config).context("Failed to initialize extractors")?;

    let extractor = registry
        .select(locator)
        .with_context(|| format!("No extractor supports {}", locator))?;
    if !json {
        println!(
            "{} Parsing {} as {}",
            "→".cyan(),
            locator,
            extractor.document_type().to_string().yellow()
        );
    }

    let document = extractor
        .parse(locator)
        .await
        .with_context(|| format!("Failed to parse {}", locator))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&document).context("Failed to serialize document")?
        );
        return Ok(());
    }

    print_summary(&document, verbose);
    Ok(())
}

fn print_summary(document: &ParsedDocument, verbose: bool) {
    println!("\n{}", "✓ Parse successful!".green().bold());
    println!("\n{}", "Document:".bold());
    println!("  Title: {}", document.title.yellow());
    println!("  Type: {}", document.document_type);
    println!("  Content: {} chars", document.content.chars().count());
    if let Some(endpoints) = &document.endpoints {
        println!("  Endpoints: {}", endpoints.len());
    }

    if !document.metadata.is_empty() {
        println!("\n{}", "Metadata:".bold());
        for (key, value) in &document.metadata {
            let rendered = serde_json::to_string(value).unwrap_or_default();
            println!("  {}: {}", key.cyan(), rendered);
        }
    }

    if !document.content.is_empty() {
        let limit = if verbose { usize::MAX } else { PREVIEW_CHARS };
        println!("\n{}", "Content:".bold());
        println!("{}", preview(&document.content, limit));
    }
}

/// At most `limit` characters of `content`, marked when truncated
fn preview(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &content[..cut]),
        None => content.to_string(),
    }
}

async fn endpoints_command(
    config: &ExtractorConfig,
    locator: &str,
    verbose: bool,
) -> Result<()> {
    println!("{} Loading API spec: {}", "→".cyan(), locator);

    let extractor = openapi_extractor(config)?;
    let document = extractor
        .parse(locator)
        .await
        .with_context(|| format!("Failed to load API spec {}", locator))?;
    let endpoints = document.endpoints.unwrap_or_default();

    println!(
        "{} {}: {} endpoints",
        "✓".green(),
        document.title.yellow(),
        endpoints.len()
    );
    println!();

    for endpoint in &endpoints {
        print_endpoint(endpoint, verbose);
    }

    Ok(())
}

fn print_endpoint(endpoint: &Endpoint, verbose: bool) {
    let method = format!("{:<7}", endpoint.method.as_str());
    let line = format!(
        "  {} {}{}",
        method.cyan().bold(),
        endpoint.path,
        endpoint
            .summary
            .as_deref()
            .map(|s| format!("  {}", s.dimmed()))
            .unwrap_or_default()
    );
    if endpoint.deprecated {
        println!("{} {}", line, "(deprecated)".red());
    } else {
        println!("{}", line);
    }

    if verbose {
        for parameter in &endpoint.parameters {
            println!(
                "      {} ({}){}",
                parameter.name,
                parameter.location,
                if parameter.required { ", required" } else { "" }
            );
        }
        if let Some(body) = &endpoint.request_body {
            let media_types: Vec<&str> = body.content.keys().map(String::as_str).collect();
            println!("      body: {}", media_types.join(", "));
        }
        let statuses: Vec<&str> = endpoint.responses.keys().map(String::as_str).collect();
        if !statuses.is_empty() {
            println!("      responses: {}", statuses.join(", "));
        }
    }
}

async fn validate_command(
    config: &ExtractorConfig,
    spec_locator: &str,
    reference: &str,
    data_path: &Path,
) -> Result<()> {
    println!("{} Loading API spec: {}", "→".cyan(), spec_locator);

    let extractor = openapi_extractor(config)?;
    let spec = extractor
        .parse_source(spec_locator)
        .await
        .with_context(|| format!("Failed to load API spec {}", spec_locator))?;

    let schema = get_schema(&spec, reference)
        .with_context(|| format!("Schema reference {} not found", reference))?;

    let raw = tokio::fs::read_to_string(data_path)
        .await
        .with_context(|| format!("Failed to read data file {}", data_path.display()))?;
    let data: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", data_path.display()))?;

    let result = validate_against_schema(&data, Some(schema));

    if result.valid {
        println!("{} {} matches {}", "✓".green(), data_path.display(), reference);
        return Ok(());
    }

    println!("\n{}", "✗ Validation failed:".red().bold());
    for error in &result.errors {
        println!("  • {}", error);
    }
    anyhow::bail!(
        "{} does not match {} ({} errors)",
        data_path.display(),
        reference,
        result.errors.len()
    )
}

fn openapi_extractor(config: &ExtractorConfig) -> Result<OpenApiExtractor> {
    let fetcher = HttpFetcher::new(config).context("Failed to create HTTP client")?;
    Ok(OpenApiExtractor::new(Arc::new(fetcher)))
}

fn formats_command() {
    println!("{}", "Supported formats (checked in this order):".bold());
    for (index, format) in SUPPORTED_FORMATS.iter().enumerate() {
        println!("  {}. {}", index + 1, format);
    }
}
