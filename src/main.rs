use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use eco_connect::config::Settings;
use eco_connect::routes::{self, events::AppState};
use eco_connect::services::{DisabledGeocoder, Geocoder, GoogleGeocoder, InMemoryStore, LocationResolver};
use std::sync::{Arc, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
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

fn build_geocoder(settings: &Settings) -> Arc<dyn Geocoder> {
    let geocoding = &settings.geocoding;
    let Some(api_key) = geocoding.api_key.clone().filter(|key| !key.is_empty()) else {
        warn!("No geocoding API key configured, unknown cities will stay unresolved");
        return Arc::new(DisabledGeocoder);
    };

    match GoogleGeocoder::new(
        geocoding.endpoint.clone(),
        api_key,
        geocoding.region_suffix.clone(),
        geocoding.timeout_secs,
    ) {
        Ok(geocoder) => Arc::new(geocoder),
        Err(e) => {
            error!("Failed to create geocoding client ({}), geocoding disabled", e);
            Arc::new(DisabledGeocoder)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("Configuration error: {}", e))
    })?;

    // Initialize logging, env vars win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Eco-Connect matching service...");

    let locations = Arc::new(LocationResolver::new(
        build_geocoder(&settings),
        settings.cache.city_cache_size,
        settings.cache.city_ttl_secs,
    ));

    info!(
        "Location resolver initialized (cache: {} entries, TTL: {}s)",
        settings.cache.city_cache_size, settings.cache.city_ttl_secs
    );

    let app_state = AppState {
        store: Arc::new(RwLock::new(InMemoryStore::with_default_cities())),
        locations,
    };

    // Configure HTTP server
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
