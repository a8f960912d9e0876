//! Vision Inference Client
//!
//! Client for the empty-slot detection microservice used to count free
//! positions in a partition tray from a shelf camera image.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Client for the vision inference microservice
#[derive(Clone)]
pub struct VisionClient {
    endpoint: String,
    api_key: String,
    default_score_threshold: f32,
    http_client: Client,
}

/// Request to count empty slots in a tray image
#[derive(Debug, Serialize)]
pub struct InferRequest {
    pub image_base64: String,
    pub score_threshold: f32,
}

/// Response from the inference service
#[derive(Debug, Deserialize, Serialize)]
pub struct InferResponse {
    pub empty_slots: i32,
    pub annotated_image_base64: Option<String>,
}

impl VisionClient {
    /// Create a new vision inference client
    pub fn new(endpoint: String, api_key: String, default_score_threshold: f32) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            api_key,
            default_score_threshold,
            http_client,
        }
    }

    /// Send an image for empty-slot detection
    pub async fn infer(
        &self,
        image_base64: String,
        score_threshold: Option<f32>,
    ) -> AppResult<InferResponse> {
        let request = InferRequest {
            image_base64,
            score_threshold: score_threshold.unwrap_or(self.default_score_threshold),
        };

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            builder = builder.header("x-api-key", &self.api_key);
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::VisionError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::VisionError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: InferResponse = response
            .json()
            .await
            .map_err(|e| AppError::VisionError(format!("Failed to parse response: {}", e)))?;

        Ok(result)
    }
}
