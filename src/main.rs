use clap::Parser;
use miette::Result;
use prospector_bridge::client::ProspectorClient;
use prospector_bridge::describe::OpenAiDescriber;
use prospector_bridge::quality::FieldCompleteness;
use prospector_bridge::storage::{self, SeaOrmStore};
use prospector_bridge::{settings, web};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "prospector-bridge",
    version,
    about = "Bridges a CRM record store with the Prospector lead-prospecting service"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database + migrations)
    let db = storage::init(&settings.database).await?;
    let store: Arc<dyn storage::CrmStore> = Arc::new(SeaOrmStore::new(db));

    let prospector = ProspectorClient::new(&settings, store.clone())?;
    let describer = Arc::new(OpenAiDescriber::new(settings.description.clone()));

    let state = web::AppState {
        settings: Arc::new(settings),
        store,
        prospector,
        describer,
        quality: Arc::new(FieldCompleteness),
    };

    web::serve(state).await?;
    Ok(())
}
