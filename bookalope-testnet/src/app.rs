use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::auth::require_token;
use crate::routes::{bookflows, books, catalog, files, profile};
use crate::state::AppState;

/// Every Bookalope endpoint the client talks to, behind token auth.
pub(crate) fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/profile",
            get(profile::get_profile).post(profile::save_profile),
        )
        .route("/api/formats", get(catalog::get_formats))
        .route("/api/styles", get(catalog::get_styles))
        .route("/api/books", get(books::list_books).post(books::create_book))
        .route(
            "/api/books/{id}",
            get(books::get_book)
                .post(books::save_book)
                .delete(books::delete_book),
        )
        .route(
            "/api/books/{id}/bookflows",
            get(books::list_bookflows).post(books::create_bookflow),
        )
        .route(
            "/api/bookflows/{id}",
            get(bookflows::get_bookflow)
                .post(bookflows::save_bookflow)
                .delete(bookflows::delete_bookflow),
        )
        .route(
            "/api/bookflows/{id}/files/image",
            get(files::get_image).post(files::add_image),
        )
        .route(
            "/api/bookflows/{id}/files/document",
            get(files::get_document).post(files::set_document),
        )
        .route("/api/bookflows/{id}/convert", get(files::convert))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
