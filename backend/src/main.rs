use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio::handlers;
use portfolio::services::{PruneJobConfig, RateLimitPruneJob};
use portfolio::{configure_app, AppState, Config};

fn init_tracing(log_level: &str) {
    let fallback = format!("portfolio={log_level},actix_web=info");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);
    info!(
        app = %config.app_name,
        github_user = %config.github_username,
        debug = config.debug,
        "Starting server on {}:{}",
        config.host,
        config.port
    );

    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN not set, GitHub API calls are limited to 60 per hour");
    }

    let static_dir = config.static_dir.clone();
    if !static_dir.is_dir() {
        warn!(path = %static_dir.display(), "Static directory not found, /static will return 404");
    }

    let server_addr = format!("{}:{}", config.host, config.port);

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialise services");
            std::process::exit(1);
        }
    };

    let prune_job = RateLimitPruneJob::new(state.rate_limiter.clone(), PruneJobConfig::default());
    let prune_shutdown = prune_job.start();

    let app_state = web::Data::new(state);

    let result = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", &static_dir))
            .configure(configure_app)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&server_addr)?
    .run()
    .await;

    let _ = prune_shutdown.send(true);
    info!("Server stopped");
    result
}
