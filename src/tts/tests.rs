use std::sync::Mutex;

use super::*;
use crate::config::SynthesisSettings;
use crate::error::{Error, Result};
use crate::library::AudioFile;
use crate::remote::{AudioApi, ExistingSynthesis, SynthesisOutcome, SynthesisRequest};

fn entry(speaker: &str, content: &str) -> TtsEntry {
    TtsEntry {
        id: None,
        speaker: speaker.to_string(),
        content: content.to_string(),
        tone: None,
        intensity: None,
        delay_ms: None,
        dubbing: Some("/voices/default.wav".to_string()),
        locked: false,
        output_wav_path: None,
    }
}

#[derive(Default)]
struct FakeApi {
    /// Texts of synthesis calls received, in order.
    calls: Mutex<Vec<String>>,
    /// Requests whose text contains this marker fail.
    fail_marker: Option<String>,
    /// When set, successful synthesis returns a `newFile` with this name.
    new_file_name: Option<String>,
    /// Answer for `check_synthesis`.
    existing: Option<String>,
    status_updates: Mutex<Vec<(i64, String)>>,
    fail_status_updates: bool,
}

impl AudioApi for FakeApi {
    async fn list_files(&self) -> Result<Vec<AudioFile>> {
        Ok(Vec::new())
    }

    async fn synthesize(&self, req: SynthesisRequest) -> Result<SynthesisOutcome> {
        self.calls.lock().unwrap().push(req.text.clone());
        if let Some(marker) = &self.fail_marker {
            if req.text.contains(marker.as_str()) {
                return Err(Error::Backend {
                    code: 500,
                    msg: "inference failed".to_string(),
                });
            }
        }
        Ok(SynthesisOutcome {
            outpath: Some(format!("output/{}.wav", req.text)),
            new_file: self.new_file_name.as_ref().map(|name| AudioFile {
                name: name.clone(),
                path: format!("/abs/{name}"),
                url: format!("/api/audio-file/{name}"),
                duration: None,
                format: None,
            }),
        })
    }

    async fn check_synthesis(&self, _req: SynthesisRequest) -> Result<ExistingSynthesis> {
        Ok(match &self.existing {
            Some(outpath) => ExistingSynthesis {
                exists: true,
                outpath: outpath.clone(),
            },
            None => ExistingSynthesis::default(),
        })
    }

    async fn delete_file(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn update_status(&self, id: i64, status: &str) -> Result<()> {
        if self.fail_status_updates {
            return Err(Error::Backend {
                code: 403,
                msg: "denied".to_string(),
            });
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((id, status.to_string()));
        Ok(())
    }
}

fn coordinator(api: FakeApi) -> SynthesisCoordinator<FakeApi> {
    SynthesisCoordinator::new(api, SynthesisSettings::default())
}

#[test]
fn record_key_joins_speaker_and_content() {
    assert_eq!(entry("narrator", "hello").record_key(), "narrator-hello");
}

#[test]
fn status_for_maps_lock_flag_to_backend_strings() {
    assert_eq!(TtsEntry::status_for(true), STATUS_LOCKED);
    assert_eq!(TtsEntry::status_for(false), STATUS_PENDING);
}

#[test]
fn load_script_reads_entries_and_delay_alias() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.json");
    std::fs::write(
        &path,
        r#"[
            {"speaker": "narrator", "content": "line one", "delay": 150},
            {"id": 3, "speaker": "hero", "content": "line two", "tone": "happy", "locked": true}
        ]"#,
    )
    .unwrap();

    let entries = load_script(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].delay_ms, Some(150));
    assert_eq!(entries[1].id, Some(3));
    assert!(entries[1].locked);
}

#[test]
fn load_script_rejects_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(load_script(&path), Err(Error::Decode(_))));
}

#[tokio::test]
async fn synthesize_marks_trained_with_outpath() {
    let mut coord = coordinator(FakeApi::default());
    let e = entry("narrator", "hello");

    assert_eq!(coord.state(&e), RecordState::Idle);
    let outpath = coord.synthesize(&e).await.unwrap();
    assert_eq!(outpath, "output/hello.wav");
    assert_eq!(
        coord.state(&e),
        RecordState::Trained {
            outpath: "output/hello.wav".to_string()
        }
    );
}

#[tokio::test]
async fn synthesize_prefers_new_file_name_over_outpath() {
    let mut coord = coordinator(FakeApi {
        new_file_name: Some("output/fresh.wav".to_string()),
        ..FakeApi::default()
    });
    let outpath = coord.synthesize(&entry("narrator", "hello")).await.unwrap();
    assert_eq!(outpath, "output/fresh.wav");
}

#[tokio::test]
async fn synthesize_marks_failed_and_propagates_the_error() {
    let mut coord = coordinator(FakeApi {
        fail_marker: Some("boom".to_string()),
        ..FakeApi::default()
    });
    let e = entry("narrator", "boom");

    assert!(coord.synthesize(&e).await.is_err());
    assert_eq!(coord.state(&e), RecordState::Failed);
    assert_eq!(coord.playback_path(&e), None);
}

#[test]
fn playback_path_falls_back_to_the_persisted_output() {
    let coord = coordinator(FakeApi::default());
    let mut e = entry("narrator", "hello");
    assert_eq!(coord.playback_path(&e), None);

    e.output_wav_path = Some("output/persisted.wav".to_string());
    assert_eq!(
        coord.playback_path(&e).as_deref(),
        Some("output/persisted.wav")
    );
}

#[tokio::test]
async fn check_trained_adopts_existing_backend_output() {
    let mut coord = coordinator(FakeApi {
        existing: Some("output/old.wav".to_string()),
        ..FakeApi::default()
    });
    let e = entry("narrator", "hello");

    let found = coord.check_trained(&e).await.unwrap();
    assert_eq!(found.as_deref(), Some("output/old.wav"));
    assert_eq!(coord.playback_path(&e).as_deref(), Some("output/old.wav"));
    // No inference was triggered by the check.
    assert!(coord.api().calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn check_trained_leaves_untrained_entries_idle() {
    let mut coord = coordinator(FakeApi::default());
    let e = entry("narrator", "hello");

    assert_eq!(coord.check_trained(&e).await.unwrap(), None);
    assert_eq!(coord.state(&e), RecordState::Idle);
}

#[tokio::test]
async fn batch_continues_past_a_failing_record() {
    let mut coord = coordinator(FakeApi {
        fail_marker: Some("bad".to_string()),
        ..FakeApi::default()
    });
    let entries: Vec<TtsEntry> = ["one", "two", "bad three", "four", "five"]
        .iter()
        .map(|c| entry("narrator", c))
        .collect();

    let summary = coord.batch(&entries, &CancelToken::new(), |_, _| {}).await;
    assert_eq!(
        summary,
        BatchSummary {
            total: 5,
            success: 4,
            failed: 1,
            cancelled: false,
        }
    );
    // The failing record did not stop the ones after it.
    assert_eq!(coord.api().calls.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn batch_preserves_input_order() {
    let mut coord = coordinator(FakeApi::default());
    let entries: Vec<TtsEntry> = ["a", "b", "c", "d"]
        .iter()
        .map(|c| entry("narrator", c))
        .collect();

    coord.batch(&entries, &CancelToken::new(), |_, _| {}).await;
    assert_eq!(
        *coord.api().calls.lock().unwrap(),
        vec!["a", "b", "c", "d"]
    );
}

#[tokio::test]
async fn batch_reports_progress_after_every_record() {
    let mut coord = coordinator(FakeApi::default());
    let entries: Vec<TtsEntry> = ["a", "b", "c"]
        .iter()
        .map(|c| entry("narrator", c))
        .collect();

    let mut seen = Vec::new();
    coord
        .batch(&entries, &CancelToken::new(), |done, planned| {
            seen.push((done, planned))
        })
        .await;
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn batch_with_a_pre_cancelled_token_attempts_nothing() {
    let mut coord = coordinator(FakeApi::default());
    let entries = vec![entry("narrator", "a"), entry("narrator", "b")];

    let token = CancelToken::new();
    token.cancel();
    let summary = coord.batch(&entries, &token, |_, _| {}).await;

    assert!(summary.cancelled);
    assert_eq!(summary.total, 0);
    assert!(coord.api().calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn batch_stops_at_the_record_boundary_after_cancellation() {
    let mut coord = coordinator(FakeApi::default());
    let entries: Vec<TtsEntry> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|c| entry("narrator", c))
        .collect();

    let token = CancelToken::new();
    let trip = token.clone();
    let summary = coord
        .batch(&entries, &token, |done, _| {
            if done == 2 {
                trip.cancel();
            }
        })
        .await;

    // Two records settled before the trip; the remaining three were never
    // started.
    assert!(summary.cancelled);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.success, 2);
    assert_eq!(coord.api().calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn set_locked_persists_the_status_string() {
    let mut coord = coordinator(FakeApi::default());
    let mut e = entry("narrator", "hello");
    e.id = Some(11);

    coord.set_locked(&mut e, true).await.unwrap();
    assert!(e.locked);
    coord.set_locked(&mut e, false).await.unwrap();
    assert!(!e.locked);

    assert_eq!(
        *coord.api().status_updates.lock().unwrap(),
        vec![
            (11, STATUS_LOCKED.to_string()),
            (11, STATUS_PENDING.to_string())
        ]
    );
}

#[tokio::test]
async fn set_locked_reverts_when_the_backend_rejects() {
    let mut coord = coordinator(FakeApi {
        fail_status_updates: true,
        ..FakeApi::default()
    });
    let mut e = entry("narrator", "hello");
    e.id = Some(11);

    assert!(coord.set_locked(&mut e, true).await.is_err());
    assert!(!e.locked);
}

#[tokio::test]
async fn set_locked_requires_a_saved_entry() {
    let mut coord = coordinator(FakeApi::default());
    let mut e = entry("narrator", "hello");

    assert!(matches!(
        coord.set_locked(&mut e, true).await,
        Err(Error::UnsavedEntry)
    ));
}
