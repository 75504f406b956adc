use axum::{
    Json,
    extract::{
        Multipart,
        multipart::{Field, MultipartRejection},
    },
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{ApiError, ApiResponse, FormBody};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    #[allow(dead_code)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct FormLogin {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct UploadSummary {
    pub files: Vec<UploadedFile>,
    pub fields: BTreeMap<String, String>,
}

/// POST /demo/login/form
pub async fn login_form(FormBody(form): FormBody<LoginForm>) -> Json<ApiResponse<FormLogin>> {
    Json(ApiResponse::success(FormLogin {
        username: form.username,
    }))
}

/// POST /demo/files
/// Parts with a filename are reported as files, the rest as plain fields.
/// File contents are measured and discarded.
pub async fn upload_files(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<UploadSummary>>, ApiError> {
    let mut multipart = multipart?;
    let mut summary = UploadSummary::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let size = read_len(field).await?;
                summary.files.push(UploadedFile {
                    field: name,
                    filename,
                    content_type,
                    size,
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid form field: {e}")))?;
                summary.fields.insert(name, value);
            }
        }
    }

    Ok(Json(ApiResponse::success(summary)))
}

async fn read_len(mut field: Field<'_>) -> Result<usize, ApiError> {
    let mut size = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?
    {
        size += chunk.len();
    }
    Ok(size)
}
