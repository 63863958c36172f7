/**
 * Gridcast Server Entry Point
 *
 * This is the main entry point for the Gridcast backend server.
 * It loads configuration, connects the grid backend and serves the Axum app.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridcast=info,tower_http=info".into()),
        )
        .init();

    let config = gridcast::backend::server::load_config()?;
    tracing::info!(
        port = config.port,
        redis = config.redis_url.is_some(),
        rate_per_sec = config.rate_per_sec,
        burst = config.burst,
        "Configuration loaded"
    );

    // Create the Axum app
    let app = gridcast::backend::server::create_app(&config).await?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin gridcast-server --features ssr");
    std::process::exit(1);
}
