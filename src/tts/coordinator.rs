use std::collections::HashMap;

use tracing::warn;

use crate::config::SynthesisSettings;
use crate::error::{Error, Result};
use crate::remote::{AudioApi, SynthesisRequest};

use super::cancel::CancelToken;
use super::entry::TtsEntry;

/// Client-side training state of one entry.
///
/// All of this is ephemeral memory; only the lock flag and the produced
/// output path survive on the backend across restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    Idle,
    Training,
    Trained { outpath: String },
    Failed,
}

/// Outcome of a batch run. `total` counts the records actually attempted,
/// which is fewer than the script length when the run was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Issues synthesis requests and tracks per-record status.
///
/// Lock policy lives with the callers: they skip locked entries before
/// invoking [`synthesize`](Self::synthesize); the coordinator does not
/// special-case them.
pub struct SynthesisCoordinator<A: AudioApi> {
    api: A,
    defaults: SynthesisSettings,
    states: HashMap<String, RecordState>,
}

impl<A: AudioApi> SynthesisCoordinator<A> {
    pub fn new(api: A, defaults: SynthesisSettings) -> Self {
        Self {
            api,
            defaults,
            states: HashMap::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self, entry: &TtsEntry) -> RecordState {
        self.states
            .get(&entry.record_key())
            .cloned()
            .unwrap_or(RecordState::Idle)
    }

    /// Output path for a trained entry. Entries never touched this session
    /// fall back to the path persisted on the record, which survives
    /// restarts when client state does not.
    pub fn playback_path(&self, entry: &TtsEntry) -> Option<String> {
        match self.state(entry) {
            RecordState::Trained { outpath } => Some(outpath),
            RecordState::Idle => entry.output_wav_path.clone(),
            RecordState::Training | RecordState::Failed => None,
        }
    }

    /// Synthesize a single entry and return the produced output path.
    ///
    /// Callers must not re-enter for a key that is already `Training`; the
    /// per-key state is the guard they are expected to consult.
    pub async fn synthesize(&mut self, entry: &TtsEntry) -> Result<String> {
        let key = entry.record_key();
        self.states.insert(key.clone(), RecordState::Training);

        let req = SynthesisRequest::from_entry(entry, &self.defaults);
        match self.api.synthesize(req).await {
            Ok(outcome) => {
                let outpath = outcome
                    .new_file
                    .map(|f| f.name)
                    .or(outcome.outpath)
                    .unwrap_or_default();
                self.states.insert(
                    key,
                    RecordState::Trained {
                        outpath: outpath.clone(),
                    },
                );
                Ok(outpath)
            }
            Err(err) => {
                self.states.insert(key, RecordState::Failed);
                Err(err)
            }
        }
    }

    /// Ask the backend whether output for this entry already exists and mark
    /// it trained when it does, so playback does not trigger a second
    /// inference run.
    pub async fn check_trained(&mut self, entry: &TtsEntry) -> Result<Option<String>> {
        let req = SynthesisRequest::from_entry(entry, &self.defaults);
        let existing = self.api.check_synthesis(req).await?;
        if existing.exists {
            self.states.insert(
                entry.record_key(),
                RecordState::Trained {
                    outpath: existing.outpath.clone(),
                },
            );
            Ok(Some(existing.outpath))
        } else {
            Ok(None)
        }
    }

    /// Persist a lock flip. The entry is updated optimistically and reverted
    /// when the backend rejects the change.
    pub async fn set_locked(&mut self, entry: &mut TtsEntry, locked: bool) -> Result<()> {
        let Some(id) = entry.id else {
            return Err(Error::UnsavedEntry);
        };

        let previous = entry.locked;
        entry.locked = locked;
        if let Err(err) = self.api.update_status(id, TtsEntry::status_for(locked)).await {
            entry.locked = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Run a whole script.
    ///
    /// The backend handles one inference at a time, so records are processed
    /// strictly in order: the next one never starts before the previous has
    /// settled. A failing record is counted and skipped past. The token is
    /// consulted before each record and again after it settles; `progress`
    /// is called after every record as `(done, planned)`.
    pub async fn batch(
        &mut self,
        entries: &[TtsEntry],
        token: &CancelToken,
        mut progress: impl FnMut(usize, usize),
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let planned = entries.len();

        for entry in entries {
            if token.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            summary.total += 1;
            match self.synthesize(entry).await {
                Ok(_) => summary.success += 1,
                Err(err) => {
                    summary.failed += 1;
                    warn!(speaker = %entry.speaker, "training failed: {err}");
                }
            }
            progress(summary.total, planned);

            if token.is_cancelled() {
                summary.cancelled = true;
                break;
            }
        }

        summary
    }
}
