//! HTTP handlers for vision-based stock counting

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::external::vision::InferResponse;
use crate::external::VisionClient;
use crate::AppState;

/// Request body for empty-slot inference
#[derive(Debug, Deserialize)]
pub struct InferBody {
    pub image_base64: String,
    pub score_threshold: Option<f32>,
}

/// Count empty slots in a partition tray image
pub async fn infer_empty_slots(
    State(state): State<AppState>,
    Json(body): Json<InferBody>,
) -> AppResult<Json<InferResponse>> {
    let client = VisionClient::new(
        state.config.vision.endpoint.clone(),
        state.config.vision.api_key.clone(),
        state.config.vision.default_score_threshold,
    );
    let result = client.infer(body.image_base64, body.score_threshold).await?;
    Ok(Json(result))
}
