//! Self-contained endpoints showing request parsing, response types,
//! validation, extractor-based injection and blocking offload.
//!
//! None of these touch the user store.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use super::AppState;

mod checks;
mod concurrency;
mod forms;
mod request;
mod responses;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/info", get(request::info))
        .route("/cookie", get(request::cookie))
        .route("/header", get(request::user_agent))
        .route("/header/list", get(request::token_list))
        .route("/items", get(request::list_items).post(request::create_item))
        .route(
            "/items/{item_id}",
            get(request::get_item).put(request::update_item),
        )
        .route("/login/form", post(forms::login_form))
        .route("/files", post(forms::upload_files))
        .route("/todos", post(responses::create_todo))
        .route("/todos/{todo_id}", get(responses::get_todo))
        .route("/legacy/xml", get(responses::legacy_xml))
        .route("/text", get(responses::plain_text))
        .route("/html", get(responses::html))
        .route("/redirect", get(responses::redirect))
        .route("/stream", get(responses::stream))
        .route("/employees", post(checks::create_employee))
        .route("/events", post(checks::create_event))
        .route("/products", post(checks::create_product))
        .route("/user", get(checks::user))
        .route("/user/check", get(checks::check_user))
        .route("/async", get(concurrency::async_task))
        .route("/threadpool", get(concurrency::threadpool))
        .route("/mixed", get(concurrency::mixed))
}
