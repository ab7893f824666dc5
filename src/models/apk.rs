use serde::{Deserialize, Serialize};

/// Persisted record naming the blob currently being distributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentApkPointer {
    pub filename: String,
}

/// Derived view of the current APK
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkInfo {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
    /// Unix timestamp in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_human: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApkInfoResponse {
    pub success: bool,
    #[serde(flatten)]
    pub info: ApkInfo,
}

#[derive(Debug, Serialize)]
pub struct ApkUploadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub size: u64,
}
