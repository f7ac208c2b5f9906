// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, packs, profile, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: registration, login, static files.
/// * Everything else requires a bearer token (auth middleware).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, quiz sessions).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let admin_routes = Router::new()
        .route("/admin/packs", get(admin::list_packs).post(admin::create_pack))
        .route(
            "/admin/packs/{id}",
            get(admin::get_pack)
                .put(admin::update_pack)
                .delete(admin::delete_pack),
        )
        .route("/admin/packs/{id}/questions", post(admin::create_question))
        .route(
            "/admin/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        );

    // route_layer: unknown paths still 404 instead of 401
    let protected_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route("/packs", get(packs::list_packs))
        .route("/profile", get(profile::get_profile))
        .route("/quiz/{pack_id}", get(quiz::start_quiz))
        .route("/submit_quiz", post(quiz::submit_quiz))
        .route(
            "/quiz_results/{pack_id}/{attempt_id}",
            get(quiz::quiz_results),
        )
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(auth_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
