//! bangsearch command line: run one search and print the outcome as JSON

use anyhow::{Context, Result};
use bangsearch::{
    config, InMemoryPreferenceStore, PreferenceStore, Search, SearchError, SearchRequest, UserId,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bangsearch", about = "Bang-aware metasearch aggregator", version)]
struct Cli {
    /// Query text; a leading `!trigger` may redirect instead of searching
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    query: Vec<String>,

    /// User whose bangs, blocklist and weights apply
    #[arg(short, long)]
    user: Option<String>,

    /// Locale such as `en-US` or `de`
    #[arg(short, long)]
    locale: Option<String>,

    /// Path to settings.yml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// YAML file with bangs, blocklists and weights
    #[arg(short, long)]
    preferences: Option<PathBuf>,

    /// Override the shared provider deadline
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(ms) = cli.deadline_ms {
        settings.search.deadline_ms = ms;
        settings.validate()?;
    }

    let default_level = if settings.general.debug { "bangsearch=debug" } else { "bangsearch=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!(
        "Starting {} (bangsearch v{})",
        settings.general.instance_name,
        bangsearch::VERSION
    );

    let preferences: Arc<dyn PreferenceStore> = match cli.preferences.or(settings.preferences.clone()) {
        Some(path) => Arc::new(InMemoryPreferenceStore::from_file(path)?),
        None => Arc::new(InMemoryPreferenceStore::new()),
    };

    let search = Search::from_settings(&settings, preferences)?;
    let dispatcher = search.dispatcher();
    info!(
        "Providers in priority order: [{}], deadline {:?}",
        dispatcher.registry().names().join(", "),
        dispatcher.deadline()
    );

    let user = cli.user.map(UserId::new).unwrap_or_else(UserId::anonymous);
    let mut request = SearchRequest::new(cli.query.join(" "), user);
    if let Some(locale) = cli.locale {
        request = request.with_locale(locale);
    }

    let outcome = match search.search(request).await {
        Ok(outcome) => outcome,
        Err(SearchError::AllProvidersFailed { failures }) => {
            for failure in &failures {
                error!("{} failed ({}): {}", failure.provider, failure.kind, failure.message);
            }
            return Err(SearchError::AllProvidersFailed { failures }.into());
        }
        Err(e) => return Err(e.into()),
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&outcome)
    } else {
        serde_json::to_string(&outcome)
    }
    .context("serializing search outcome")?;
    println!("{json}");

    Ok(())
}
