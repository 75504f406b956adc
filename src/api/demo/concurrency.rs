use axum::Json;
use serde::Serialize;
use tokio::task;

use crate::api::{ApiError, ApiResponse, MessageResponse};

const SUM_UPPER_BOUND: u64 = 10_000_000;

#[derive(Debug, Serialize)]
pub struct SumResult {
    pub result: u64,
}

#[derive(Debug, Serialize)]
pub struct MixedResult {
    pub sync_result: SumResult,
    pub async_result: MessageResponse,
}

fn cpu_bound_sum() -> SumResult {
    SumResult {
        result: (0..SUM_UPPER_BOUND).sum(),
    }
}

async fn offloaded_sum() -> Result<SumResult, ApiError> {
    task::spawn_blocking(cpu_bound_sum)
        .await
        .map_err(|e| ApiError::internal(format!("Blocking task failed: {e}")))
}

async fn async_message() -> MessageResponse {
    MessageResponse::new("Async task completed")
}

/// GET /demo/async
pub async fn async_task() -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::success(async_message().await))
}

/// GET /demo/threadpool
/// The sum runs on the blocking pool so the worker stays free.
pub async fn threadpool() -> Result<Json<ApiResponse<SumResult>>, ApiError> {
    Ok(Json(ApiResponse::success(offloaded_sum().await?)))
}

/// GET /demo/mixed
pub async fn mixed() -> Result<Json<ApiResponse<MixedResult>>, ApiError> {
    let (sync_result, async_result) = tokio::join!(offloaded_sum(), async_message());

    Ok(Json(ApiResponse::success(MixedResult {
        sync_result: sync_result?,
        async_result,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_bound_sum() {
        assert_eq!(cpu_bound_sum().result, 49_999_995_000_000);
    }
}
