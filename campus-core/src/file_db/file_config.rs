use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A file as exchanged with clients: the content is base64 text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileHolder {
    pub name: String,
    pub content: String,
}

/// Body of a curriculum upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CurriculumUpload {
    #[serde(default)]
    pub title: String,
    pub file: FileHolder,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub title: String,
    pub file_name: String,
    pub timestamp: u128,
    /// Decoded size in bytes.
    pub size: usize,
    /// Hex encoded SHA-256 of the decoded content.
    pub sha256: String,
}

/// Sent to a remote curriculum store, which keeps file and metadata together.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct RemoteFileConfig {
    pub file: FileHolder,
    pub metadata: Metadata,
}

/// Written as `config.json` next to the file in a local store.
#[derive(Serialize, Deserialize)]
pub struct LocalFileConfig {
    /// Name of the file in the same directory.
    pub file: String,
    pub metadata: Metadata,
}
