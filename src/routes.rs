// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, quiz, registration},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (participants, quiz, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let participant_routes = Router::new()
        .route("/", post(registration::register))
        .route("/whitelisted", get(registration::check_whitelist))
        .route("/{registration_number}", get(registration::get_participant));

    let quiz_routes = Router::new()
        .route("/sessions", post(quiz::start_session))
        .route("/sessions/{id}", get(quiz::get_session))
        .route("/sessions/{id}/answers", put(quiz::record_answer))
        .route("/sessions/{id}/submit", post(quiz::submit))
        .route("/sessions/{id}/abandon", post(quiz::abandon))
        .route("/results/{registration_number}", get(quiz::get_results))
        .route("/leaderboard", get(quiz::get_leaderboard));

    let admin_routes = Router::new()
        .route(
            "/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route("/questions/facets", get(admin::question_facets))
        .route(
            "/questions/{id}",
            get(admin::get_question)
                .put(admin::update_question)
                .delete(admin::delete_question),
        )
        .route(
            "/whitelist",
            get(admin::list_whitelist).post(admin::add_whitelisted_email),
        )
        .route("/whitelist/{email}", delete(admin::remove_whitelisted_email))
        .route("/participants", get(admin::list_participants))
        .route("/leaderboard", get(admin::leaderboard))
        .route("/export", get(admin::export_results))
        .route("/sessions/purge", post(admin::purge_sessions))
        // Auth first, then the admin role check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        // Login stays outside the guard
        .merge(Router::new().route("/login", post(admin::login)));

    Router::new()
        .nest("/api/participants", participant_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
