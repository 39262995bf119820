use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timecard_backend::{
    config::Config, db::connection::create_pool, handlers, middleware, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timecard_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        bind_addr = %config.bind_addr,
        time_zone = %config.time_zone,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config);

    // All routes sit behind the identity middleware; the health probe does not.
    let api_routes = Router::new()
        .route(
            "/api/timesheets",
            post(handlers::timesheets::create_timesheet)
                .get(handlers::timesheets::get_my_timesheets),
        )
        .route(
            "/api/timesheets/{id}",
            put(handlers::timesheets::update_timesheet)
                .delete(handlers::timesheets::delete_timesheet),
        )
        .route(
            "/api/timesheets/{id}/decision",
            put(handlers::timesheets::decide_timesheet),
        )
        .route(
            "/api/day-offs",
            post(handlers::day_offs::create_day_off).get(handlers::day_offs::get_my_day_offs),
        )
        .route(
            "/api/day-offs/{id}",
            axum::routing::delete(handlers::day_offs::delete_day_off),
        )
        .route(
            "/api/day-offs/{id}/decision",
            put(handlers::day_offs::decide_day_off),
        )
        .route("/api/projects", get(handlers::projects::list_projects))
        .route(
            "/api/holidays",
            get(handlers::holidays::list_public_holidays),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::identity,
        ));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(api_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
