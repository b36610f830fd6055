use tower_http::{cors::CorsLayer, trace::TraceLayer};

use wortschatz_backend::config::Config;
use wortschatz_backend::db::Database;
use wortschatz_backend::logging;
use wortschatz_backend::routes;
use wortschatz_backend::services::llm_provider::LLMProvider;
use wortschatz_backend::services::ocr::OcrClient;
use wortschatz_backend::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let db = match Database::from_env().await {
        Ok(db) => Some(db),
        Err(err) => {
            tracing::warn!(error = %err, "database not initialized, persistence disabled");
            None
        }
    };

    let llm = LLMProvider::from_env();
    if !llm.is_available() {
        tracing::warn!("LLM not configured, classification will degrade to defaults");
    }
    let ocr = OcrClient::from_env();
    if !ocr.is_available() {
        tracing::warn!("OCR not configured, image extraction will yield no candidates");
    }

    let state = AppState::new(db, llm, ocr, config.batch_size);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!(%addr, "wortschatz-backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
