//! services/client/src/bin/search.rs
//!
//! Smoke runner: wires the real adapters together, signs in if credentials are
//! configured, runs one search and prints what the UI would render.

use academic_search_core::domain::{Credentials, SearchMode};
use client_lib::{
    adapters::{FileStorage, LogNavigator, ReqwestBackend},
    api_client::ApiClient,
    config::{Config, ConfigError, LOGIN_ROUTE},
    error::ClientError,
    services::{AuthService, SearchService},
    session::SessionStore,
    store::{AuthStore, ResultView, SearchStore},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend: {}", config.base_url);

    // --- 2. Initialize Adapters ---
    let storage = Arc::new(FileStorage::open(&config.session_store_path)?);
    let backend = Arc::new(ReqwestBackend::new(&config.base_url, config.request_timeout)?);
    let navigator = Arc::new(LogNavigator::new(LOGIN_ROUTE));
    let api = Arc::new(ApiClient::new(
        backend,
        SessionStore::new(storage),
        navigator,
        &config,
    ));

    // --- 3. Authenticate ---
    let auth = AuthStore::new(AuthService::new(api.clone(), config.fallback_token.clone()))?;
    if !auth.snapshot().await.is_authenticated() {
        match credentials_from_env()? {
            Some(credentials) => {
                auth.login(&credentials).await?;
            }
            None => info!("No stored session and no credentials; searching anonymously"),
        }
    }

    // --- 4. Run the Search ---
    let mode = match std::env::var("SEARCH_MODE") {
        Ok(raw) => SearchMode::parse(&raw).ok_or_else(|| {
            ConfigError::InvalidValue("SEARCH_MODE".to_string(), format!("unknown mode '{}'", raw))
        })?,
        Err(_) => SearchMode::Fuzzy,
    };
    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let store = SearchStore::new(
        SearchService::new(api),
        config.min_query_length,
        config.default_page_size,
    );
    store.set_mode(mode).await;
    store.set_query(text).await;
    if let Err(e) = store.perform_search().await {
        error!("Search failed: {}", e);
    }

    // --- 5. Report ---
    let state = store.snapshot().await;
    match &state.view {
        ResultView::Documents {
            records,
            total,
            has_more,
        } => {
            println!("{} of {} results (more: {})", records.len(), total, has_more);
            for record in records {
                println!("- {} [{}] {}", record.title, record.id, record.authors.join(", "));
            }
        }
        ResultView::Answer(answer) => {
            println!("{} (confidence {:.2})", answer.generated_text, answer.confidence);
            for source in &answer.sources {
                println!("  source {}: {}", source.document_id, source.excerpt);
            }
        }
        ResultView::NoAnswer | ResultView::Empty => {
            println!("{}", state.error.as_deref().unwrap_or("No results"));
        }
    }

    Ok(())
}

fn credentials_from_env() -> Result<Option<Credentials>, ConfigError> {
    let Ok(email) = std::env::var("SEARCH_EMAIL") else {
        return Ok(None);
    };
    let password = std::env::var("SEARCH_PASSWORD")
        .map_err(|_| ConfigError::MissingVar("SEARCH_PASSWORD".to_string()))?;
    Ok(Some(Credentials { email, password }))
}
