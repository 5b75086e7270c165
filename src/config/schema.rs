use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub synthesis: SynthesisSettings,
    pub view: ViewSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            synthesis: SynthesisSettings::default(),
            view: ViewSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the audio backend.
    pub base_url: String,
    /// Per-request timeout applied to every backend call (seconds).
    /// A hung backend request fails instead of pinning a status flag forever.
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    /// Milliseconds of silence inserted between text segments.
    pub interval_silence_ms: u64,
    /// Emotion blending ratio used when an entry carries none. Range 0.0-1.0.
    pub emotion_alpha: f64,
    /// Text synthesized by the `synth` command when none is given.
    pub default_text: String,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            interval_silence_ms: 200,
            emotion_alpha: 1.0,
            default_text: "你好，这是一个在网页上生成的语音。".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// How many folder levels of the tree listing start expanded.
    pub expand_depth: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self { expand_depth: 1 }
    }
}
