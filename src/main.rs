use razblok::config::AppConfig;
use razblok::dialogue::{DialogueEngine, spawn_prune_task};
use razblok::server::{AppState, app_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("🛡️  Razblok v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat API: http://0.0.0.0:{}/api/chat/sessions", config.port);
    eprintln!("   Chat WS: ws://0.0.0.0:{}/ws/chat/{{id}}", config.port);
    eprintln!("   Lead API: http://0.0.0.0:{}/api/lead", config.port);
    eprintln!("   Lead endpoint: {}", config.lead_endpoint);
    match &config.testimonials_endpoint {
        Some(url) => eprintln!("   Testimonials: {}", url),
        None => eprintln!("   Testimonials: disabled (RAZBLOK_TESTIMONIALS_ENDPOINT not set)"),
    }

    let state = AppState::from_config(&config);
    let _prune_handle = spawn_prune_task(state.sessions.clone(), config.session_idle_timeout);
    let app = app_routes(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "HTTP server started");

    if config.terminal {
        eprintln!("   Terminal chat: type a number or an option. /quit to exit.\n");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server stopped: {}", e);
            }
        });
        let engine = DialogueEngine::new(config.typing, config.chat_url.clone());
        razblok::terminal::run(engine).await;
        return Ok(());
    }

    axum::serve(listener, app).await?;
    Ok(())
}
