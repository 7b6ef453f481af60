use std::{
    error::Error,
    io::{self, IsTerminal},
};

use ai_llm_service::telemetry;
use course_rag::{IndicatifProgress, NoopProgress, Progress, RagSystem, RagSystemConfig};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; variables may come from the environment.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("no .env loaded: {e}");
    }

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", Level::INFO))
        .with(telemetry::layer())
        .try_init()?;

    let config = RagSystemConfig::from_env();
    let docs = config.docs_path.clone();
    let rag = RagSystem::from_config(config).await?;

    let progress: Box<dyn Progress> = if io::stdout().is_terminal() {
        Box::new(IndicatifProgress::bar(0))
    } else {
        Box::new(NoopProgress)
    };
    let (courses, chunks) = rag
        .add_course_folder_with_progress(&docs, false, progress.as_ref())
        .await;
    if courses == 0 {
        warn!(path = %docs.display(), "no new courses loaded");
    } else {
        info!(courses, chunks, "initial documents loaded");
    }

    let address = std::env::var("API_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8000".into());
    api::start(api::AppState::new(rag), &address).await?;

    Ok(())
}
