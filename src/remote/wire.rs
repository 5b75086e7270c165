use serde::{Deserialize, Serialize};

use crate::config::SynthesisSettings;
use crate::error::{Error, Result};
use crate::library::AudioFile;
use crate::tts::TtsEntry;

/// Response envelope shared by every backend route: a flat JSON object with
/// a `code` discriminant merged into the payload. `code == 0` is success;
/// failures come back as HTTP 200 with a non-zero `code` and an `errmsg`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub errmsg: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T> {
        if self.code == 0 {
            Ok(self.payload)
        } else {
            Err(Error::Backend {
                code: self.code,
                msg: self.errmsg.unwrap_or_default(),
            })
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<AudioFile>,
    #[serde(default)]
    pub count: usize,
}

/// What a synthesis call produced: the output path, and on some routes a
/// ready-made file record for immediate selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SynthesisOutcome {
    #[serde(default)]
    pub outpath: Option<String>,
    #[serde(default, rename = "newFile")]
    pub new_file: Option<AudioFile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExistingSynthesis {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub outpath: String,
}

/// A synthesis request in the backend's field names.
///
/// This struct is the single place where table fields map onto the wire
/// schema; nothing else in the crate spells these field names.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker_audio_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_silence: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SynthesisRequest {
    /// The one table-field to wire-field mapping: content→text,
    /// dubbing→speaker_audio_path, tone→emotion_text,
    /// intensity→emotion_alpha, delay→interval_silence, speaker→role.
    pub fn from_entry(entry: &TtsEntry, defaults: &SynthesisSettings) -> Self {
        Self {
            text: entry.content.clone(),
            speaker_audio_path: entry.dubbing.clone().unwrap_or_default(),
            id: entry.id,
            emotion_text: entry.tone.clone(),
            emotion_alpha: Some(entry.intensity.unwrap_or(defaults.emotion_alpha)),
            interval_silence: Some(entry.delay_ms.unwrap_or(defaults.interval_silence_ms)),
            role: Some(entry.speaker.clone()),
        }
    }

    /// Free-text synthesis with an optional reference voice.
    pub fn from_text(
        text: &str,
        speaker_audio_path: Option<&str>,
        defaults: &SynthesisSettings,
    ) -> Self {
        Self {
            text: text.to_string(),
            speaker_audio_path: speaker_audio_path.unwrap_or_default().to_string(),
            id: None,
            emotion_text: None,
            emotion_alpha: Some(defaults.emotion_alpha),
            interval_silence: Some(defaults.interval_silence_ms),
            role: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_code_zero_yields_payload() {
        let raw = r#"{"code": 0, "files": [{"name": "a/b.mp3", "path": "/store/a/b.mp3", "url": "/api/audio-file/a/b.mp3"}], "count": 1}"#;
        let env: Envelope<FileListing> = serde_json::from_str(raw).unwrap();
        let listing = env.into_result().unwrap();
        assert_eq!(listing.count, 1);
        assert_eq!(listing.files[0].name, "a/b.mp3");
    }

    #[test]
    fn envelope_with_nonzero_code_becomes_backend_error() {
        let raw = r#"{"code": 500100, "errmsg": "db unavailable"}"#;
        let env: Envelope<FileListing> = serde_json::from_str(raw).unwrap();
        match env.into_result() {
            Err(Error::Backend { code, msg }) => {
                assert_eq!(code, 500100);
                assert_eq!(msg, "db unavailable");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn envelope_without_code_defaults_to_success() {
        let raw = r#"{"exists": true, "outpath": "output/x.wav"}"#;
        let env: Envelope<ExistingSynthesis> = serde_json::from_str(raw).unwrap();
        let existing = env.into_result().unwrap();
        assert!(existing.exists);
        assert_eq!(existing.outpath, "output/x.wav");
    }

    #[test]
    fn synthesis_outcome_reads_camel_cased_new_file() {
        let raw = r#"{"code": 0, "outpath": "output/gen.wav", "newFile": {"name": "output/gen.wav", "path": "/abs/output/gen.wav", "url": "/api/audio-file/output/gen.wav"}}"#;
        let env: Envelope<SynthesisOutcome> = serde_json::from_str(raw).unwrap();
        let outcome = env.into_result().unwrap();
        assert_eq!(outcome.outpath.as_deref(), Some("output/gen.wav"));
        assert_eq!(outcome.new_file.unwrap().name, "output/gen.wav");
    }

    #[test]
    fn listing_accepts_capitalized_field_names() {
        let raw = r#"{"files": [{"Name": "x.mp3", "Path": "/store/x.mp3", "URL": "/api/audio-file/x.mp3"}]}"#;
        let env: Envelope<FileListing> = serde_json::from_str(raw).unwrap();
        let listing = env.into_result().unwrap();
        assert_eq!(listing.files[0].name, "x.mp3");
        assert_eq!(listing.files[0].url, "/api/audio-file/x.mp3");
    }

    #[test]
    fn request_from_entry_maps_table_fields_onto_wire_names() {
        let entry = TtsEntry {
            id: Some(7),
            speaker: "narrator".to_string(),
            content: "Once upon a time".to_string(),
            tone: Some("calm".to_string()),
            intensity: Some(0.6),
            delay_ms: Some(120),
            dubbing: Some("/voices/warm.wav".to_string()),
            locked: false,
            output_wav_path: None,
        };
        let defaults = SynthesisSettings::default();
        let req = SynthesisRequest::from_entry(&entry, &defaults);

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["text"], "Once upon a time");
        assert_eq!(value["speaker_audio_path"], "/voices/warm.wav");
        assert_eq!(value["emotion_text"], "calm");
        assert_eq!(value["emotion_alpha"], 0.6);
        assert_eq!(value["interval_silence"], 120);
        assert_eq!(value["role"], "narrator");
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn request_from_entry_falls_back_to_configured_defaults() {
        let entry = TtsEntry {
            id: None,
            speaker: "narrator".to_string(),
            content: "line".to_string(),
            tone: None,
            intensity: None,
            delay_ms: None,
            dubbing: None,
            locked: false,
            output_wav_path: None,
        };
        let defaults = SynthesisSettings {
            interval_silence_ms: 80,
            emotion_alpha: 0.3,
            ..SynthesisSettings::default()
        };
        let req = SynthesisRequest::from_entry(&entry, &defaults);

        assert_eq!(req.emotion_alpha, Some(0.3));
        assert_eq!(req.interval_silence, Some(80));
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("emotion_text").is_none());
    }

    #[test]
    fn request_from_text_uses_selected_voice_when_present() {
        let defaults = SynthesisSettings::default();
        let req = SynthesisRequest::from_text("hello", Some("/voices/a.wav"), &defaults);
        assert_eq!(req.speaker_audio_path, "/voices/a.wav");

        let req = SynthesisRequest::from_text("hello", None, &defaults);
        assert_eq!(req.speaker_audio_path, "");
    }
}
