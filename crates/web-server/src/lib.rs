use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, put},
};
use configuration::{ServerSettings, Settings};
use registry::StudentService;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod response;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub service: StudentService,
}

impl AppState {
    pub fn new(service: StudentService) -> Self {
        Self { service }
    }
}

/// Builds the full application router: the route table, fallback and middleware.
///
/// Kept separate from [`run_server`] so tests can drive it without a socket.
pub fn app(state: AppState, server: &ServerSettings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    // Every method router shares one fallback so a known path hit with the
    // wrong method still answers with the error envelope.
    let not_allowed = handlers::method_not_allowed;
    Router::new()
        .route("/api/health", get(|| async { "OK" }).fallback(not_allowed))
        .route(
            "/api/students",
            get(handlers::list_students)
                .post(handlers::create_student)
                .fallback(not_allowed),
        )
        .route(
            "/api/students/search",
            get(handlers::search_students).fallback(not_allowed),
        )
        .route(
            "/api/students/sid/:student_id",
            get(handlers::get_student_by_sid)
                .delete(handlers::delete_student_by_sid)
                .fallback(not_allowed),
        )
        .route(
            "/api/students/course/:course_name",
            get(handlers::get_students_by_course).fallback(not_allowed),
        )
        .route(
            "/api/students/level/:year_level",
            get(handlers::get_students_by_year_level).fallback(not_allowed),
        )
        .route(
            "/api/students/section/:section_name",
            get(handlers::get_students_by_section).fallback(not_allowed),
        )
        .route(
            "/api/students/:id",
            put(handlers::replace_student)
                .patch(handlers::patch_student)
                .delete(handlers::delete_student)
                .fallback(not_allowed),
        )
        .fallback(handlers::route_not_found)
        .with_state(Arc::new(state))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
}

/// The main function to configure and run the web server.
///
/// Opens the configured record store first; if it cannot be reached the
/// server never starts listening.
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    // Note: Tracing is already initialized by the binary.
    let store = database::open_store(&settings.database).await?;
    let state = AppState::new(StudentService::new(store));
    let app = app(state, &settings.server);

    let addr = settings.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}
