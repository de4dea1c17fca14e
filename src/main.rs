use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use bite_swipe::config::Settings;
use bite_swipe::routes::{self, AppState};
use bite_swipe::services::{
    CacheManager, CachedFeed, CandidateFeed, MemorySavedListStore, PlacesClient, PostgresSavedList,
    SavedListStore, SessionRegistry,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors (e.g. a non-numeric transition id)
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);
    info!("Starting BiteSwipe deck service...");

    let swipe_config = settings.deck.swipe_config();
    if let Err(e) = swipe_config.validate() {
        error!("Invalid deck configuration: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }

    // Feed cache: Redis when configured, in-process otherwise
    let cache = Arc::new(match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, settings.cache.l1_cache_size, settings.cache.ttl_secs).await {
            Ok(c) => {
                info!(
                    "Cache manager initialized (L1: {} entries, TTL: {}s, Redis enabled)",
                    settings.cache.l1_cache_size, settings.cache.ttl_secs
                );
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), caching feed responses in memory only", e);
                CacheManager::in_memory(settings.cache.l1_cache_size, settings.cache.ttl_secs)
            }
        },
        None => CacheManager::in_memory(settings.cache.l1_cache_size, settings.cache.ttl_secs),
    });

    let places = PlacesClient::new(
        settings.places.endpoint.clone(),
        settings.places.api_key.clone(),
        settings.places.radius_m,
        settings.places.photo_max_width,
        settings.places.timeout_secs,
    )
    .map_err(|e| {
        error!("Failed to create places client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let feed: Arc<dyn CandidateFeed> = Arc::new(CachedFeed::new(
        Arc::new(places),
        cache.clone(),
        settings.cache.location_precision,
    ));

    let saved: Arc<dyn SavedListStore> = match &settings.database.url {
        Some(url) => {
            let store = PostgresSavedList::from_settings(
                url,
                settings.database.max_connections,
                settings.database.min_connections,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            info!("PostgreSQL saved-list store initialized");
            Arc::new(store)
        }
        None => {
            warn!("No database configured, saved lists will not survive a restart");
            Arc::new(MemorySavedListStore::new())
        }
    };

    let sessions = SessionRegistry::new(
        swipe_config,
        settings.session.max_sessions,
        settings.session.idle_timeout_secs,
    );

    info!(
        "Deck engine configured: width {}, threshold {}",
        swipe_config.reference_width,
        swipe_config.threshold()
    );

    let app_state = AppState {
        sessions,
        feed,
        saved,
        cache,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
