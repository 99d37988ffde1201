mod error;
mod routes;
mod upload;

use document_analyzer::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = AppState::new(&config)?;
    log::info!(
        "Analysis service ready (model {}, uploads in {})",
        config.model,
        config.upload_dir.display()
    );

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
