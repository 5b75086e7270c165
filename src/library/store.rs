use crate::config::SynthesisSettings;
use crate::error::{Error, Result};
use crate::remote::{AudioApi, SynthesisOutcome, SynthesisRequest};

use super::model::AudioFile;
use super::tree::FileTree;

/// A single transition of the library snapshot. Every mutation, local or
/// backend-driven, is expressed as one of these and goes through
/// [`LibraryState::apply`].
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the listing wholesale with a fresh backend response.
    FilesLoaded(Vec<AudioFile>),
    /// Select a file (and start playing it), or clear the selection.
    Select(Option<AudioFile>),
    SetSynthesizing(bool),
    /// Playback-completion events clear "is playing" without touching the
    /// selection.
    SetCurrentlyPlaying(Option<String>),
    /// A backend delete succeeded; the delete API is keyed by `name`.
    DeleteSucceeded(String),
}

/// The library snapshot: flat listing, derived tree and the selection and
/// playback flags dependent views read.
#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    pub files: Vec<AudioFile>,
    pub tree: FileTree,
    pub selected: Option<AudioFile>,
    pub currently_playing: Option<String>,
    pub synthesizing: bool,
}

impl LibraryState {
    /// Apply one transition. The tree is recomputed before returning whenever
    /// `files` changed, so observers never see it stale relative to the
    /// listing.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::FilesLoaded(files) => {
                self.files = files;
                self.tree = FileTree::build(&self.files);
            }
            Action::Select(file) => {
                self.currently_playing = file.as_ref().map(|f| f.path.clone());
                self.selected = file;
            }
            Action::SetSynthesizing(on) => self.synthesizing = on,
            Action::SetCurrentlyPlaying(path) => self.currently_playing = path,
            Action::DeleteSucceeded(name) => {
                self.files.retain(|f| f.name != name);
                self.tree = FileTree::build(&self.files);
                if self.selected.as_ref().is_some_and(|s| s.name == name) {
                    self.selected = None;
                    self.currently_playing = None;
                }
            }
        }
    }
}

/// Owns the snapshot and the backend gateway. Selection is compared by
/// `path`, not object identity: backend responses are fresh values on every
/// fetch.
pub struct LibraryStore<A: AudioApi> {
    state: LibraryState,
    api: A,
    synthesis: SynthesisSettings,
}

impl<A: AudioApi> LibraryStore<A> {
    pub fn new(api: A, synthesis: SynthesisSettings) -> Self {
        Self {
            state: LibraryState::default(),
            api,
            synthesis,
        }
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replace the listing from the backend.
    ///
    /// On failure the current snapshot stays untouched and the error is
    /// handed back for the notification surface. Overlapping calls are not
    /// sequenced; the last response to resolve wins.
    pub async fn refresh(&mut self) -> Result<()> {
        let files = self.api.list_files().await?;
        self.state.apply(Action::FilesLoaded(files));
        Ok(())
    }

    pub fn select(&mut self, file: Option<AudioFile>) {
        self.state.apply(Action::Select(file));
    }

    pub fn set_currently_playing(&mut self, path: Option<String>) {
        self.state.apply(Action::SetCurrentlyPlaying(path));
    }

    pub fn set_synthesizing(&mut self, on: bool) {
        self.state.apply(Action::SetSynthesizing(on));
    }

    /// Delete `name` on the backend, then drop it from the snapshot. When
    /// the deleted file was selected, selection and playback are cleared.
    pub async fn delete(&mut self, name: &str) -> Result<()> {
        self.api.delete_file(name).await?;
        self.state.apply(Action::DeleteSucceeded(name.to_string()));
        Ok(())
    }

    /// Synthesize `text` with the selected file as the speaker reference,
    /// select the produced file if the backend returned one, then re-list.
    ///
    /// The `synthesizing` flag guards one single synthesis at a time and is
    /// cleared on every path out, error or not.
    pub async fn synthesize(&mut self, text: &str) -> Result<SynthesisOutcome> {
        if self.state.synthesizing {
            return Err(Error::SynthesisInFlight);
        }
        self.state.apply(Action::SetSynthesizing(true));

        let req = SynthesisRequest::from_text(
            text,
            self.state.selected.as_ref().map(|f| f.path.as_str()),
            &self.synthesis,
        );

        let outcome = match self.api.synthesize(req).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state.apply(Action::SetSynthesizing(false));
                return Err(err);
            }
        };

        if let Some(file) = outcome.new_file.clone() {
            self.state.apply(Action::Select(Some(file)));
        }
        let refreshed = self.refresh().await;
        self.state.apply(Action::SetSynthesizing(false));
        refreshed?;

        Ok(outcome)
    }
}
