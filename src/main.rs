//! Inquisitio-RS command line entry point
//!
//! Runs a single search and prints the hits as JSON.

use anyhow::{bail, Context, Result};
use inquisitio_rs::{config, SearchClient, SearchOptions, Searcher, Settings, Transport};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    query: Option<String>,
    config: Option<PathBuf>,
    filters: Vec<(String, Vec<String>)>,
    return_fields: Vec<String>,
    arguments: Vec<(String, String)>,
    options: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1))? {
        Some(args) => args,
        None => return Ok(()),
    };

    let settings = load_settings(args.config.as_deref())?;
    info!("Searching {}", settings.endpoint());

    let client = SearchClient::from_settings(&settings)?;
    let options = build_options(&args)?;
    let mut searcher = match args.query {
        Some(query) => client.query(query, options)?,
        None => client.filters(options)?,
    };
    searcher.search().await?;

    let output = render(&searcher)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// JSON summary of a searched searcher; `records` is null when a hit has no usable type
fn render<T: Transport>(searcher: &Searcher<T>) -> Result<serde_json::Value> {
    let records = match searcher.records() {
        Ok(records) => Some(records),
        Err(e) => {
            warn!("Omitting records: {}", e);
            None
        }
    };

    Ok(serde_json::json!({
        "found": searcher.found()?,
        "start": searcher.start()?,
        "ids": searcher.ids()?,
        "records": records,
        "hits": searcher.results()?,
    }))
}

/// Load settings from an explicit file or the default locations
fn load_settings(path: Option<&std::path::Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?;
            settings.merge_env();
            Ok(settings)
        }
        None => Ok(config::discover()?),
    }
}

fn build_options(args: &Args) -> Result<SearchOptions> {
    let mut options = match args.options {
        Some(ref json) => serde_json::from_str(json).context("parsing --options")?,
        None => SearchOptions::new(),
    };
    for (field, values) in &args.filters {
        options = match values.as_slice() {
            [single] => options.filter(field.as_str(), single.as_str()),
            many => options.filter(field.as_str(), many.to_vec()),
        };
    }
    if !args.return_fields.is_empty() {
        options = options.return_fields(args.return_fields.iter().cloned());
    }
    for (name, value) in &args.arguments {
        options = options.argument(name.as_str(), value);
    }
    Ok(options)
}

fn split_pair(flag: &str, pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => bail!("{} expects KEY=VALUE, got '{}'", flag, pair),
    }
}

/// Parse argv; `None` means usage or version was printed
fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Option<Args>> {
    let mut args = Args::default();

    while let Some(arg) = argv.next() {
        let mut value = |flag: &str| argv.next().with_context(|| format!("{} needs a value", flag));
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("inquisitio-rs {}", inquisitio_rs::VERSION);
                return Ok(None);
            }
            "-c" | "--config" => args.config = Some(PathBuf::from(value(&arg)?)),
            "-f" | "--filter" => {
                let (field, term) = split_pair(&arg, &value(&arg)?)?;
                match args.filters.iter_mut().find(|(name, _)| *name == field) {
                    Some((_, terms)) => terms.push(term),
                    None => args.filters.push((field, vec![term])),
                }
            }
            "-r" | "--return-fields" => {
                args.return_fields = value(&arg)?
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "-a" | "--arg" => {
                let pair = split_pair(&arg, &value(&arg)?)?;
                args.arguments.push(pair);
            }
            "-o" | "--options" => args.options = Some(value(&arg)?),
            flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
            _ if args.query.is_none() => args.query = Some(arg),
            _ => bail!("unexpected argument '{}'", arg),
        }
    }

    Ok(Some(args))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
Inquisitio-RS v{}
Query builder and result mapper for a hosted search service

USAGE:
    inquisitio-rs [QUERY] [OPTIONS]

OPTIONS:
    -c, --config <FILE>           Path to configuration file
    -f, --filter <FIELD=VALUE>    Filter on a field (repeat to AND several values)
    -r, --return-fields <A,B>     Fields to return for each hit
    -a, --arg <NAME=VALUE>        Extra request parameter passed through verbatim
    -o, --options <JSON>          Filters, return_fields and arguments as a JSON map
    -h, --help                    Print help information
    -V, --version                 Print version information

ENVIRONMENT VARIABLES:
    INQUISITIO_SETTINGS_PATH      Path to settings.yml
    INQUISITIO_SEARCH_ENDPOINT    Search service base URL
    INQUISITIO_REQUEST_TIMEOUT    Request timeout in seconds
    INQUISITIO_VERIFY_SSL         Verify SSL certificates (true/false)
    RUST_LOG                      Log filter (default: info)
"#,
        inquisitio_rs::VERSION
    );
}
