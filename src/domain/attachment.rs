//! Uploaded file metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// What an uploaded file substantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilePurpose {
    Delivery,
    Kyc,
}

impl FilePurpose {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "delivery" => Some(FilePurpose::Delivery),
            "kyc" => Some(FilePurpose::Kyc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilePurpose::Delivery => "delivery",
            FilePurpose::Kyc => "kyc",
        }
    }
}

impl std::fmt::Display for FilePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata row for a persisted blob. Append-only. `escrow_id` is `None`
/// for KYC files, which attach to a submission instead.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileRecord {
    pub id: Uuid,
    pub escrow_id: Option<Uuid>,
    #[schema(example = "proof.png")]
    pub file_name: String,
    /// Name the blob is stored under (unique per upload).
    pub stored_name: String,
    #[schema(value_type = String, example = "delivery")]
    pub purpose: FilePurpose,
    pub uploaded_at: DateTime<Utc>,
}
