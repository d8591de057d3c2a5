use thiserror::Error;

/// Failures surfaced by scene accessors, snapshot import and the draft session.
///
/// Gesture paths (commit, slice) never return these for geometric trouble; they
/// recover locally instead. Each variant carries a short stable code for hosts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("invalid {kind} id {id}")]
    InvalidId { kind: &'static str, id: u32 },
    #[error("parameter '{0}' must be finite")]
    NonFinite(&'static str),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
    #[error("caps exceeded: {0}")]
    CapsExceeded(String),
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
    #[error("json parse error: {0}")]
    JsonParse(String),
    #[error("no wall draft in progress")]
    DraftNotActive,
    #[error("wall draft needs at least two distinct points")]
    DraftTooShort,
}

impl SceneError {
    pub fn code(&self) -> &'static str {
        match self {
            SceneError::InvalidId { .. } => "invalid_id",
            SceneError::NonFinite(_) => "non_finite",
            SceneError::InvalidStructure(_) => "invalid_structure",
            SceneError::CapsExceeded(_) => "caps_exceeded",
            SceneError::OutOfBounds(_) => "out_of_bounds",
            SceneError::JsonParse(_) => "json_parse",
            SceneError::DraftNotActive => "draft_not_active",
            SceneError::DraftTooShort => "draft_too_short",
        }
    }

    pub(crate) fn wall(id: u32) -> Self {
        SceneError::InvalidId { kind: "wall", id }
    }

    pub(crate) fn shape(id: u32) -> Self {
        SceneError::InvalidId { kind: "shape", id }
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        SceneError::JsonParse(e.to_string())
    }
}
