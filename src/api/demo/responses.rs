use axum::{
    Json,
    body::Body,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use futures::stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::api::{ApiError, ApiResponse, JsonBody, PathParam};

const TODOS: [(&str, &str); 2] = [
    ("todo_first", "prev job execute"),
    ("todo_second", "current job execute"),
];

const LEGACY_XML: &str = r#"<?xml version="1.0"?>
<shampoo>
    <Header>
        Apply shampoo here.
    </Header>
    <Body>
        You'll have to use soap here.
    </Body>
</shampoo>
"#;

#[derive(Debug, Deserialize)]
pub struct Todo {
    #[allow(dead_code)]
    pub task: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TodoCreated {
    pub result_code: u16,
    pub result_msg: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TodoEntry {
    pub todo_id: String,
    pub task: &'static str,
}

#[derive(Debug, Serialize)]
struct Article {
    title: &'static str,
    timestamp: DateTime<Utc>,
    description: Option<&'static str>,
}

/// POST /demo/todos
/// The message is the canonical reason phrase of the status code.
pub async fn create_todo(JsonBody(todo): JsonBody<Todo>) -> (StatusCode, Json<TodoCreated>) {
    let status = StatusCode::CREATED;
    let body = TodoCreated {
        result_code: status.as_u16(),
        result_msg: status.canonical_reason().unwrap_or_default().to_string(),
        created_at: todo.timestamp.unwrap_or_else(Utc::now),
    };
    (status, Json(body))
}

/// GET /demo/todos/{todo_id}
pub async fn get_todo(
    PathParam(todo_id): PathParam<String>,
) -> Result<Json<ApiResponse<TodoEntry>>, ApiError> {
    let task = TODOS
        .iter()
        .find_map(|&(id, task)| (id == todo_id).then_some(task))
        .ok_or_else(|| ApiError::not_found("Todo"))?;

    Ok(Json(ApiResponse::success(TodoEntry {
        todo_id,
        task,
    })))
}

/// GET /demo/legacy/xml
pub async fn legacy_xml() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/xml")], LEGACY_XML)
}

/// GET /demo/text
/// A JSON document served as `text/plain`.
pub async fn plain_text() -> Result<Response, ApiError> {
    let article = Article {
        title: "userdesk",
        timestamp: Utc::now(),
        description: Some("plain text response"),
    };
    let body = serde_json::to_string(&article)
        .map_err(|e| ApiError::internal(format!("Failed to encode article: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

/// GET /demo/html
pub async fn html() -> Html<&'static str> {
    Html("<html><body><h1>Hello, World!</h1></body></html>")
}

/// GET /demo/redirect
pub async fn redirect() -> Redirect {
    Redirect::temporary("/demo/html")
}

/// GET /demo/stream
/// Chunked body of ten `Frame {i}` lines.
pub async fn stream() -> Response {
    let frames = stream::iter((0..10).map(|i| Ok::<_, Infallible>(format!("Frame {i}\n"))));

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(frames),
    )
        .into_response()
}
