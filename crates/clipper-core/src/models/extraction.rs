use serde::{Deserialize, Serialize};

/// Body of `POST /extract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    /// Object store identifier of the source media file
    pub source_file_id: String,
    /// `HH:MM:SS`
    pub clip_start_time: String,
    /// `HH:MM:SS`
    pub clip_end_time: String,
    /// Object store location the clip is written under
    pub destination_folder_id: String,
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Locator returned by the object store for the stored clip
    pub locator: String,
    /// Name the clip was stored under
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub file_url: String,
}

impl From<ExtractionResult> for ExtractionResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            file_url: result.locator,
        }
    }
}
