mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod state;
mod students;
mod summarizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "student_summary_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;
    let (host, port) = (state.config.host.clone(), state.config.port);
    tracing::info!(
        model = %state.config.summarizer.model,
        ollama = %state.config.summarizer.base_url,
        "state initialised"
    );

    app::serve(app::build_app(state), &host, port).await
}
