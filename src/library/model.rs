use serde::Deserialize;

/// One stored audio file as reported by the backend listing.
///
/// `name` is the slash-delimited logical path and the unique key within a
/// listing snapshot; `path` is the storage location the synthesis API is fed
/// and `url` the route suffix for fetching the audio bytes. Listing variants
/// disagree on field casing, so the capitalized spellings are accepted too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioFile {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Path")]
    pub path: String,
    #[serde(default, alias = "URL", alias = "Url")]
    pub url: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub format: Option<String>,
}

impl AudioFile {
    /// Last path segment, for display next to a voice reference.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}
