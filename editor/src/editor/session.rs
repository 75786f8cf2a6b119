//! Load/save lifecycle of one editing session.
//!
//! ```text
//!            load ok                save ok (reload)
//! Loading ──────────▶ Ready ──save──▶ Saving ──────────▶ Loading
//!    │                  ▲               │
//!    │ load failed      └───────────────┘ save failed (draft kept)
//!    ▼
//! Failed ──load──▶ Loading
//! ```
//!
//! Both `load` and `save` take `&mut self`, so one session never has two
//! backend operations in flight.

use crate::editor::state::{EditorCommand, EditorState};
use crate::error::{EditorError, EditorResult};
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::sync::{DefinitionSync, EditorMode};

/// Current lifecycle phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorPhase {
    Loading,
    Ready,
    Saving,
    /// The last load failed; no draft is available.
    Failed(String),
}

impl EditorPhase {
    pub fn name(&self) -> &'static str {
        match self {
            EditorPhase::Loading => "loading",
            EditorPhase::Ready => "ready",
            EditorPhase::Saving => "saving",
            EditorPhase::Failed(_) => "failed",
        }
    }
}

/// An editor bound to one definition and one backend.
pub struct EditorSession<S> {
    sync: S,
    mode: EditorMode,
    phase: EditorPhase,
    state: Option<EditorState>,
    last_error: Option<String>,
}

impl<S: DefinitionSync> EditorSession<S> {
    /// A session that has not loaded anything yet.
    pub fn new(sync: S, mode: EditorMode) -> Self {
        Self {
            sync,
            mode,
            phase: EditorPhase::Loading,
            state: None,
            last_error: None,
        }
    }

    /// Create a session and run the initial load.
    ///
    /// The session is returned even when the load fails; its phase is then
    /// [`EditorPhase::Failed`].
    pub async fn open(sync: S, mode: EditorMode) -> Self {
        let mut session = Self::new(sync, mode);
        // Failure is recorded in the phase.
        let _ = session.load().await;
        session
    }

    /// Fetch forms, target definition and siblings, then rebuild the state.
    pub async fn load(&mut self) -> EditorResult<()> {
        self.phase = EditorPhase::Loading;
        log_info(format!("Loading export definition ({})", self.describe_mode()));

        match self.sync.fetch_all(&self.mode).await {
            Ok(resources) => {
                let state = EditorState::from_resources(resources);
                log_success(format!(
                    "Loaded {} association(s), {} form(s), {} compatible",
                    state.associations().len(),
                    state.forms().len(),
                    state.compatible_forms().len()
                ));
                if state.form_selection_hint().is_some() {
                    log_warning("No form matches the current associations");
                }
                self.state = Some(state);
                self.phase = EditorPhase::Ready;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                log_error(format!("Loading failed: {}", e));
                self.state = None;
                self.phase = EditorPhase::Failed(e.to_string());
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Persist the draft, then reload from the backend.
    ///
    /// A successful create switches the session to update mode when the
    /// backend reports the new identifier.
    ///
    /// On failure the draft stays as it was and the session returns to
    /// [`EditorPhase::Ready`]; nothing is retried.
    ///
    /// Dropping the returned future mid-request leaves the session in
    /// [`EditorPhase::Saving`], where `dispatch` and `save` are refused. Call
    /// [`load`](Self::load) to get back to a ready state; whether the
    /// interrupted write reached the backend is then visible in the reload.
    pub async fn save(&mut self) -> EditorResult<()> {
        let payload = self.ready_state()?.to_payload();
        self.phase = EditorPhase::Saving;

        let result = match &self.mode {
            EditorMode::Create => {
                log_info(format!("Creating export definition '{}'", payload.label));
                self.sync.create(&payload).await
            }
            EditorMode::Update(id) => {
                log_info(format!("Updating export definition {}", id));
                self.sync.update(id, &payload).await.map(|()| None)
            }
        };

        match result {
            Ok(created) => {
                // A created definition is edited in place from now on.
                if let Some(id) = created {
                    self.mode = EditorMode::Update(id);
                }
                log_success(format!(
                    "Saved export definition with {} field(s)",
                    payload.definition.len()
                ));
                self.load().await
            }
            Err(e) => {
                log_error(format!("Saving failed: {}", e));
                self.phase = EditorPhase::Ready;
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Apply one command to the loaded draft.
    pub fn dispatch(&mut self, command: EditorCommand) -> EditorResult<&EditorState> {
        let next = self.ready_state()?.apply(command)?;
        Ok(&*self.state.insert(next))
    }

    fn ready_state(&self) -> EditorResult<&EditorState> {
        match (&self.phase, &self.state) {
            (EditorPhase::Ready, Some(state)) => Ok(state),
            (phase, _) => Err(EditorError::NotReady(phase.name())),
        }
    }

    fn describe_mode(&self) -> String {
        match &self.mode {
            EditorMode::Create => "new".to_string(),
            EditorMode::Update(id) => id.clone(),
        }
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    /// The loaded state, absent while loading or after a failed load.
    pub fn state(&self) -> Option<&EditorState> {
        self.state.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn sync(&self) -> &S {
        &self.sync
    }
}
