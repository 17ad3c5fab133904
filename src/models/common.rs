use serde::{Deserialize, Serialize};

/// Body returned by every pipeline that ran to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub original_url: String,
    #[serde(rename = "cloudinary_url")]
    pub stored_url: String,
    #[serde(rename = "public_id")]
    pub stored_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}
