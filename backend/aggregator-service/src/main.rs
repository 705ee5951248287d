use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use stream_cache::{MemoryBackend, RedisBackend, StreamCache};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aggregator_service::{metrics, routes, AppState, Config};
use redis_utils::RedisPool;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Starting aggregator-service v{}", env!("CARGO_PKG_VERSION"));

    metrics::registry();
    tracing::info!("Prometheus metrics initialized");

    let cache = match config.redis.url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => {
            let pool = RedisPool::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            StreamCache::new(Arc::new(RedisBackend::new(pool.manager())))
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-process cache");
            StreamCache::new(Arc::new(MemoryBackend::new()))
        }
    };

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let frontend_url = config.app.frontend_url.trim_end_matches('/').to_string();
    let debug_routes = config.app.debug_routes;
    if debug_routes {
        tracing::warn!("Debug cache routes are enabled");
    }

    let state = web::Data::new(AppState::new(config, cache));

    tracing::info!("Starting HTTP server at {}", bind_address);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(state.clone())
            .configure(routes::configure_routes)
            .configure(|cfg| {
                if debug_routes {
                    routes::configure_debug_routes(cfg);
                }
            })
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
