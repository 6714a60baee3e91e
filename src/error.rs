//! Lab error type

use crate::sim::CollisionMode;
use crate::worksheet::EntryField;

#[derive(Debug, Clone, PartialEq)]
pub enum LabError {
    /// Trial export attempted before the pucks have collided
    NoCollisionYet,
    /// Trial export into a mode other than the one the run used
    ModeMismatch {
        run: CollisionMode,
        requested: CollisionMode,
    },
    /// Worksheet slot index past the end of the mode's trials
    TrialOutOfRange(usize),
    /// Slot exists but nothing has been exported into it
    EmptyTrial(usize),
    /// Answer field that the trial's mode does not have
    FieldNotInMode {
        field: EntryField,
        mode: CollisionMode,
    },
    /// Settings could not be read or parsed
    Settings(String),
}

impl std::fmt::Display for LabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCollisionYet => {
                write!(f, "Run the simulation until the pucks collide before adding data")
            }
            Self::ModeMismatch { run, requested } => write!(
                f,
                "The last run was a {run} collision; it cannot be added to the {requested} table"
            ),
            Self::TrialOutOfRange(index) => {
                write!(f, "There is no trial {}", index.saturating_add(1))
            }
            Self::EmptyTrial(index) => {
                write!(f, "Trial {} has no data yet", index.saturating_add(1))
            }
            Self::FieldNotInMode { field, mode } => {
                write!(f, "{field:?} is not part of a {mode} trial")
            }
            Self::Settings(m) => write!(f, "settings: {m}"),
        }
    }
}

impl std::error::Error for LabError {}

impl From<serde_json::Error> for LabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

impl From<std::io::Error> for LabError {
    fn from(err: std::io::Error) -> Self {
        Self::Settings(err.to_string())
    }
}
