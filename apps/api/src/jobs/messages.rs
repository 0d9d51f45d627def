use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for the external model service, published to `job.process`.
/// Field names are camelCase on the wire; that is the dialect the model
/// service speaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRequestMessage {
    pub job_id: Uuid,
    pub text: String,
}

/// Result delivered on `job.processed`. A missing embedding or a present
/// `error` string is the failure indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingResultMessage {
    pub job_id: Uuid,
    #[serde(default)]
    pub embedding: Option<Vec<f64>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Resume embedding delivered on `resume.processed` once the external
/// pipeline finishes processing an uploaded resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeEmbeddingMessage {
    pub user_id: Uuid,
    pub embedding: Vec<f64>,
}
