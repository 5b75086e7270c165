use std::time::Duration;

use crate::config::ServerSettings;
use crate::error::Result;
use crate::library::AudioFile;

use super::wire::{Envelope, ExistingSynthesis, FileListing, SynthesisOutcome, SynthesisRequest};

/// Interface to the audio backend.
///
/// One implementation talks HTTP ([`RemoteGateway`]); tests substitute
/// in-memory fakes. Upper layers never construct requests themselves.
pub trait AudioApi: Send + Sync {
    /// Fetch the full library listing.
    fn list_files(&self) -> impl std::future::Future<Output = Result<Vec<AudioFile>>> + Send;

    /// Run one synthesis. Resource-intensive on the backend; callers keep
    /// requests sequential.
    fn synthesize(
        &self,
        req: SynthesisRequest,
    ) -> impl std::future::Future<Output = Result<SynthesisOutcome>> + Send;

    /// Ask whether output for this request already exists, without
    /// triggering an inference run.
    fn check_synthesis(
        &self,
        req: SynthesisRequest,
    ) -> impl std::future::Future<Output = Result<ExistingSynthesis>> + Send;

    /// Delete a stored file. The delete API is keyed by the listing `name`.
    fn delete_file(&self, name: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Persist the status string of a saved TTS record (lock state lives
    /// there).
    fn update_status(
        &self,
        id: i64,
        status: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// HTTP implementation of [`AudioApi`] against the audio backend.
pub struct RemoteGateway {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteGateway {
    pub fn new(server: &ServerSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(server.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: server.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn route(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL for streaming a stored file's audio bytes.
    pub fn audio_url(&self, file: &AudioFile) -> String {
        if file.url.starts_with('/') {
            self.route(&file.url)
        } else {
            format!("{}/{}", self.base_url, file.url)
        }
    }
}

impl AudioApi for RemoteGateway {
    async fn list_files(&self) -> Result<Vec<AudioFile>> {
        let env: Envelope<FileListing> = self
            .client
            .get(self.route("/api/audio-files"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(env.into_result()?.files)
    }

    async fn synthesize(&self, req: SynthesisRequest) -> Result<SynthesisOutcome> {
        let env: Envelope<SynthesisOutcome> = self
            .client
            .post(self.route("/api/tts"))
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        env.into_result()
    }

    async fn check_synthesis(&self, req: SynthesisRequest) -> Result<ExistingSynthesis> {
        let env: Envelope<ExistingSynthesis> = self
            .client
            .post(self.route("/api/check-tts-exists"))
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        env.into_result()
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        let env: Envelope<serde_json::Value> = self
            .client
            .delete(self.route("/api/audio-file"))
            .json(&serde_json::json!({ "path": name }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        env.into_result().map(|_| ())
    }

    async fn update_status(&self, id: i64, status: &str) -> Result<()> {
        let env: Envelope<serde_json::Value> = self
            .client
            .put(self.route(&format!("/api/tts-records/{id}")))
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        env.into_result().map(|_| ())
    }
}
