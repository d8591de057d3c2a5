//! Command dispatch over one scene, its wall draft and its history.
//!
//! The host calls `dispatch` synchronously once per input event; each command
//! runs to completion and successful mutations are snapshotted before it returns.

use serde::{Deserialize, Serialize};

use crate::algorithms::commit::CommitReport;
use crate::algorithms::slice::SliceReport;
use crate::config::EditorConfig;
use crate::draft::WallDraft;
use crate::error::SceneError;
use crate::history::History;
use crate::model::{CuttingLine, Point};
use crate::Scene;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    BeginWallDraft { point: Point },
    AppendWallDraftPoint { point: Point },
    UpdateWallDraftPreview { point: Point },
    CommitWallDraft,
    CancelWallDraft,
    SliceAt { line: CuttingLine },
    Undo,
    Redo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// Draft state changed; the scene did not.
    Draft { points: usize },
    /// A clicked point repeated the previous one and was ignored.
    DraftPointIgnored,
    Committed(CommitReport),
    /// The draft collapsed to nothing after dropping degenerate points.
    NothingCommitted,
    Cancelled { was_drawing: bool },
    Sliced(SliceReport),
    Restored { version: u64 },
    NothingToRestore,
}

#[derive(Clone, Debug)]
pub struct Editor {
    scene: Scene,
    draft: WallDraft,
    history: History,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Editor::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let mut history = History::new(config.history_depth);
        let scene = Scene::with_config(config);
        history.record(&scene);
        Editor { scene, draft: WallDraft::Idle, history }
    }

    /// Adopt an existing scene as the new history baseline.
    pub fn from_scene(scene: Scene) -> Self {
        let mut history = History::new(scene.config().history_depth);
        history.record(&scene);
        Editor { scene, draft: WallDraft::Idle, history }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn draft(&self) -> &WallDraft {
        &self.draft
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.history.set_depth(config.history_depth);
        self.scene.set_config(config);
    }

    pub fn dispatch(&mut self, cmd: Command) -> Result<Outcome, SceneError> {
        tracing::trace!(?cmd, "dispatch");
        match cmd {
            Command::BeginWallDraft { point } => {
                self.draft.begin(point)?;
                Ok(Outcome::Draft { points: 1 })
            }
            Command::AppendWallDraftPoint { point } => {
                if self.draft.append(point)? {
                    Ok(Outcome::Draft { points: self.draft.points().len() })
                } else {
                    Ok(Outcome::DraftPointIgnored)
                }
            }
            Command::UpdateWallDraftPreview { point } => {
                self.draft.update_preview(point)?;
                Ok(Outcome::Draft { points: self.draft.points().len() })
            }
            Command::CommitWallDraft => {
                let points = self.draft.take()?;
                match self.scene.commit_polyline(&points) {
                    Some(report) => {
                        self.history.record(&self.scene);
                        Ok(Outcome::Committed(report))
                    }
                    None => Ok(Outcome::NothingCommitted),
                }
            }
            Command::CancelWallDraft => Ok(Outcome::Cancelled { was_drawing: self.draft.cancel() }),
            Command::SliceAt { line } => {
                if !line.start.is_finite() || !line.end.is_finite() {
                    return Err(SceneError::NonFinite("cutting line"));
                }
                let report = self.scene.slice_at(line);
                if report.is_mutation() {
                    self.history.record(&self.scene);
                }
                Ok(Outcome::Sliced(report))
            }
            Command::Undo => Ok(self.restore(|h| h.undo())),
            Command::Redo => Ok(self.restore(|h| h.redo())),
        }
    }

    fn restore(&mut self, step: impl FnOnce(&mut History) -> Option<Scene>) -> Outcome {
        match step(&mut self.history) {
            Some(snapshot) => {
                self.scene.restore(snapshot);
                Outcome::Restored { version: self.scene.version() }
            }
            None => Outcome::NothingToRestore,
        }
    }

    /// Run a direct scene mutation (add/update/remove/move) and snapshot it on success.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut Scene) -> Result<T, SceneError>) -> Result<T, SceneError> {
        let out = f(&mut self.scene)?;
        self.history.record(&self.scene);
        Ok(out)
    }

    /// Replace the scene from a snapshot document and start a fresh history.
    pub fn load_json_value(&mut self, v: serde_json::Value) -> Result<(), SceneError> {
        self.scene.from_json_value_strict(v)?;
        self.rebase();
        Ok(())
    }

    /// Lenient counterpart of `load_json_value`: invalid entities are dropped.
    pub fn import_json_value(&mut self, v: serde_json::Value) -> bool {
        if !self.scene.from_json_value(v) {
            return false;
        }
        self.rebase();
        true
    }

    fn rebase(&mut self) {
        self.draft.cancel();
        self.history.clear();
        self.history.record(&self.scene);
    }

    // Named entry points

    pub fn begin_wall_draft(&mut self, p: Point) -> Result<Outcome, SceneError> {
        self.dispatch(Command::BeginWallDraft { point: p })
    }

    pub fn append_wall_draft_point(&mut self, p: Point) -> Result<Outcome, SceneError> {
        self.dispatch(Command::AppendWallDraftPoint { point: p })
    }

    pub fn update_wall_draft_preview(&mut self, p: Point) -> Result<Outcome, SceneError> {
        self.dispatch(Command::UpdateWallDraftPreview { point: p })
    }

    pub fn commit_wall_draft(&mut self) -> Result<Option<CommitReport>, SceneError> {
        match self.dispatch(Command::CommitWallDraft)? {
            Outcome::Committed(r) => Ok(Some(r)),
            _ => Ok(None),
        }
    }

    pub fn cancel_wall_draft(&mut self) -> bool {
        matches!(self.dispatch(Command::CancelWallDraft), Ok(Outcome::Cancelled { was_drawing: true }))
    }

    pub fn slice_at(&mut self, line: CuttingLine) -> Result<SliceReport, SceneError> {
        match self.dispatch(Command::SliceAt { line })? {
            Outcome::Sliced(r) => Ok(r),
            _ => Ok(SliceReport::default()),
        }
    }

    pub fn undo(&mut self) -> bool {
        matches!(self.dispatch(Command::Undo), Ok(Outcome::Restored { .. }))
    }

    pub fn redo(&mut self) -> bool {
        matches!(self.dispatch(Command::Redo), Ok(Outcome::Restored { .. }))
    }
}
