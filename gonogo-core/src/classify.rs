use crate::stimulus::StimulusKind;
use serde::{Deserialize, Serialize};

/// Outcome category of a resolved trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Hit,
    Miss,
    FalseAlarm,
    CorrectWithhold,
}

impl Classification {
    /// The stimulus kind this category can only occur on.
    pub fn stimulus_kind(&self) -> StimulusKind {
        match self {
            Classification::Hit | Classification::Miss => StimulusKind::Go,
            Classification::FalseAlarm | Classification::CorrectWithhold => StimulusKind::NoGo,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Classification::Hit | Classification::CorrectWithhold)
    }
}

/// Maps a stimulus and whether a response was captured inside its window to a category.
pub fn classify(kind: StimulusKind, captured: bool) -> Classification {
    match (kind, captured) {
        (StimulusKind::Go, true) => Classification::Hit,
        (StimulusKind::Go, false) => Classification::Miss,
        (StimulusKind::NoGo, true) => Classification::FalseAlarm,
        (StimulusKind::NoGo, false) => Classification::CorrectWithhold,
    }
}
