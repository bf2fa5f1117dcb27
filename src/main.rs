// Next Good Day API v0.1
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::recommendations::AppState;
use services::cache::ForecastCache;
use services::catalog::ActivityCatalog;
use services::forecast::ResolutionPolicy;
use services::open_meteo::OpenMeteoClient;
use services::scoring::Scorer;
use services::weights::ScoringConfig;

/// Next Good Day API: OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Next Good Day API",
        version = "0.1.0",
        description = "Weather-driven day recommendations for everyday activities. \
            Fetches daily forecasts from Open-Meteo, scores each day against an \
            activity's preferred conditions (optionally personalized by age bracket) \
            and returns the best upcoming days with a short explanation.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Activities", description = "Activity catalog"),
        (name = "Recommendations", description = "Ranked day recommendations"),
    ),
    paths(
        routes::health::health_check,
        routes::activities::list_activities,
        routes::recommendations::recommend_days,
        routes::recommendations::rank_candidates,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::recommendations::RecommendationRequest,
            routes::recommendations::CandidateRequest,
            routes::recommendations::RecommendationResponse,
            models::Activity,
            models::ActivityCategory,
            models::ActivityPreferences,
            models::AgeRange,
            models::Gender,
            models::Location,
            models::PreferredConditions,
            models::Recommendation,
            models::TemperatureRange,
            models::TimeWindow,
            models::UserProfile,
            models::WeatherAttribute,
            models::WeatherDay,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "next_good_day_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Scoring weights: built-in unless a config file is given
    let scoring_config = match &config.scoring_config_path {
        Some(path) => ScoringConfig::from_json_file(std::path::Path::new(path))
            .expect("Failed to load scoring config"),
        None => ScoringConfig::default(),
    };

    let catalog = ActivityCatalog::builtin();
    tracing::info!("Activity catalog has {} activities", catalog.all().len());

    // Create Open-Meteo client
    let open_meteo = OpenMeteoClient::new(
        &config.open_meteo_base_url,
        Duration::from_secs(config.weather_timeout_secs),
    )
    .expect("Failed to build Open-Meteo client");

    // Build shared application state
    let app_state = AppState {
        source: Arc::new(open_meteo),
        cache: ForecastCache::new(
            Duration::from_secs(config.forecast_cache_ttl_secs),
            config.forecast_cache_max_entries,
        ),
        scorer: Arc::new(Scorer::new(scoring_config)),
        catalog: Arc::new(catalog),
        policy: ResolutionPolicy::from_config(&config),
        forecast_days: config.forecast_days,
        default_top_n: config.default_top_n,
    };

    // CORS: expose X-Forecast-Stale so browsers can flag cached forecasts
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any)
        .expose_headers([axum::http::HeaderName::from_static("x-forecast-stale")]);

    // Build router
    let activity_routes = Router::new()
        .route(
            "/api/v1/activities",
            get(routes::activities::list_activities),
        )
        .with_state(app_state.catalog.clone());

    let recommendation_routes = Router::new()
        .route(
            "/api/v1/recommendations",
            post(routes::recommendations::recommend_days),
        )
        .route(
            "/api/v1/recommendations/candidates",
            post(routes::recommendations::rank_candidates),
        )
        .with_state(app_state);

    let app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .merge(activity_routes)
        .merge(recommendation_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
