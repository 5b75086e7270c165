use std::path::Path;

use serde::Deserialize;

/// Status string the backend stores for a locked record.
pub const STATUS_LOCKED: &str = "locked";
/// Status string for an editable record.
pub const STATUS_PENDING: &str = "pending";

/// One row of a dubbing script: a speaker line plus the voice file chosen
/// for it. Field names match the script JSON the table editor produces.
#[derive(Debug, Clone, Deserialize)]
pub struct TtsEntry {
    /// Backend record id; absent for rows never saved.
    #[serde(default)]
    pub id: Option<i64>,
    pub speaker: String,
    pub content: String,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub intensity: Option<f64>,
    #[serde(default, alias = "delay")]
    pub delay_ms: Option<u64>,
    /// Path of the voice file dubbed onto this speaker.
    #[serde(default)]
    pub dubbing: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub output_wav_path: Option<String>,
}

impl TtsEntry {
    /// Client-side identity of an entry within one script. Training state is
    /// keyed by this rather than the database id, since unsaved rows have
    /// none.
    pub fn record_key(&self) -> String {
        format!("{}-{}", self.speaker, self.content)
    }

    /// Backend status string for a lock flag.
    pub fn status_for(locked: bool) -> &'static str {
        if locked { STATUS_LOCKED } else { STATUS_PENDING }
    }
}

/// Read a dubbing script (a JSON array of entries) from disk.
pub fn load_script(path: &Path) -> crate::error::Result<Vec<TtsEntry>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
