//! Command-line front end: resolve the input, build or load a specification,
//! generate the TypeScript client and write everything to disk.

pub mod emit;
pub mod error;
pub mod source;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use docs2client_core::{
    AssistedExtractor, Config, GenerateOptions, OpenApiSpec, Strategy,
    build_http_client, generate, html_to_markdown, spec_from_markdown,
};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::error::CliError;
use crate::source::Source;

pub use error::{EmitError, SourceError};

/// Crates whose logs a plain `DOCS2CLIENT_LOG` level applies to.
const LOG_TARGETS: &[&str] = &["docs2client", "docs2client_cli", "docs2client_core"];

#[derive(Parser, Debug)]
#[command(
    name = "docs2client",
    version,
    about = "Generate a typed TypeScript client from API documentation or an OpenAPI spec"
)]
pub struct Cli {
    /// Documentation page or OpenAPI document, as a URL or a file path
    pub input: String,

    /// Do not generate client.test.ts
    #[arg(long = "no-tests")]
    pub no_tests: bool,

    /// Find endpoints with pattern matching only, skipping the LLM
    #[arg(long)]
    pub patterns: bool,

    /// Directory that receives specs/, generated/ and debug/
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Dotenv file with configuration overrides
    #[arg(long = "env-file", value_name = "PATH", default_value = ".env")]
    pub env_file: PathBuf,
}

/// Run with the process arguments and return the exit code.
pub fn run() -> i32 {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run_async(std::env::args_os()))
}

pub async fn run_async<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = err.exit_code();
            let _ = err.print();
            return code;
        }
    };

    let (config, proxy_status) = match Config::load(Some(&cli.env_file)) {
        Ok(loaded) => loaded,
        Err(err) => {
            init_tracing(None);
            eprintln!("Error: {err}");
            return 1;
        }
    };
    init_tracing(config.log_filter.as_deref());
    info!("{proxy_status}");

    match execute(&cli, &config).await {
        Ok(dir) => {
            println!("Done! Client generated in {}", dir.display());
            0
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

async fn execute(cli: &Cli, config: &Config) -> Result<PathBuf, CliError> {
    let client = build_http_client(config)?;
    let site = source::site_id(&cli.input);

    let resolved = source::resolve(&client, &cli.input).await;
    info!(input = %cli.input, source = ?resolved, "Resolved input");

    let spec = match &resolved {
        Source::RemoteSpec(url) => {
            let spec = source::fetch_spec(&client, url).await?;
            emit::cache_spec(&cli.out_dir, &site, &spec).await?;
            spec
        }
        Source::LocalSpec(path) => source::read_spec(path)?,
        Source::RemoteDocs(url) => {
            let html = source::fetch_text(&client, url, "text/html").await?;
            docs_to_spec(cli, config, &client, &html, url).await?
        }
        Source::LocalDocs(path) => {
            let html = source::read_local(path)?;
            docs_to_spec(cli, config, &client, &html, &cli.input).await?
        }
    };
    info!(
        version = spec.openapi.as_deref().or(spec.swagger.as_deref()).unwrap_or("unknown"),
        paths = spec.paths.len(),
        "Parsed OpenAPI spec"
    );

    let options = GenerateOptions {
        origin: Some(cli.input.clone()),
        generate_tests: !cli.no_tests,
    };
    let generated = generate(&spec, &options);
    Ok(emit::emit_client(&cli.out_dir, &site, &generated).await?)
}

async fn docs_to_spec(
    cli: &Cli,
    config: &Config,
    client: &Client,
    html: &str,
    origin: &str,
) -> Result<OpenApiSpec, CliError> {
    info!("Converting HTML docs to OpenAPI spec");
    let markdown = html_to_markdown(html);

    let extractor = AssistedExtractor::new(client.clone(), &config.ollama_url, &config.ollama_model)
        .with_debug_dir(cli.out_dir.join("debug"));
    let strategy = if cli.patterns {
        Strategy::Patterns
    } else {
        Strategy::Assisted(&extractor)
    };

    let spec = spec_from_markdown(client, &markdown, origin, strategy).await?;
    emit::cache_spec(&cli.out_dir, &source::site_id(&cli.input), &spec).await?;
    Ok(spec)
}

/// Build the `EnvFilter` directive string from `DOCS2CLIENT_LOG`.
///
/// A plain level applies to this project's crates only; anything else is
/// used as a full filter spec.
pub fn log_filter(value: Option<&str>) -> String {
    match value {
        Some(level) if is_plain_level(level) => scoped(level),
        Some(spec) => spec.to_string(),
        None => scoped("info"),
    }
}

fn scoped(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

fn init_tracing(value: Option<&str>) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(log_filter(value)));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter() {
        assert_eq!(
            log_filter(None),
            "docs2client=info,docs2client_cli=info,docs2client_core=info"
        );
        assert_eq!(
            log_filter(Some("debug")),
            "docs2client=debug,docs2client_cli=debug,docs2client_core=debug"
        );
        assert_eq!(
            log_filter(Some("docs2client_core=trace,reqwest=warn")),
            "docs2client_core=trace,reqwest=warn"
        );
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["docs2client", "https://swapi.dev/", "--no-tests"]).unwrap();
        assert_eq!(cli.input, "https://swapi.dev/");
        assert!(cli.no_tests);
        assert!(!cli.patterns);
        assert_eq!(cli.out_dir, PathBuf::from("."));
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["docs2client"]).is_err());
    }
}
