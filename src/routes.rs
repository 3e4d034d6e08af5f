// routes.rs - Router assembly
//
// Page routes, the item API, exports and account flows share one router.
// Tracing wraps everything; CORS follows `security.enable_cors`.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(page_routes())
        .merge(export_routes())
        .merge(api_routes());

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health))
        .route("/register/", get(public::register_form).post(public::register))
        .route("/login/", get(public::login_form).post(public::login))
        .route("/logout/", get(public::logout).post(public::logout))
        .route("/api/items/", get(public::items_feed))
}

fn page_routes() -> Router<AppState> {
    use protected::items;

    Router::new()
        .route("/", get(items::list))
        .route(
            "/create_football_item/",
            get(items::create_form).post(items::create),
        )
        .route("/football_item/:id/", get(items::detail))
        .route(
            "/edit_football_item/:id/edit",
            get(items::edit_form).post(items::edit),
        )
        .route("/delete_football_item/:id/delete", post(items::delete))
}

fn export_routes() -> Router<AppState> {
    use protected::export;

    Router::new()
        .route("/xml/", get(export::xml_all))
        .route("/xml/:id/", get(export::xml_by_id))
        .route("/json/", get(export::json_all))
        .route("/json/:id/", get(export::json_by_id))
}

fn api_routes() -> Router<AppState> {
    use protected::api;

    Router::new()
        .route(
            "/api/create/",
            post(api::create_item).fallback(api::method_not_allowed),
        )
        .route(
            "/api/edit/:id/",
            post(api::edit_item).fallback(api::method_not_allowed),
        )
        .route(
            "/api/delete/:id/",
            post(api::delete_item)
                .delete(api::delete_item)
                .fallback(api::method_not_allowed),
        )
}

/// `None` when CORS is off. An empty origin list allows any origin.
fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
