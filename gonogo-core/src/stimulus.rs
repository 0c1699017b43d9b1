use serde::{Deserialize, Serialize};
use std::fmt;

/// The single binary visual state shown to the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StimulusKind {
    Go,
    NoGo,
}

impl StimulusKind {
    /// True when the correct behaviour is to press.
    pub fn requires_response(&self) -> bool {
        matches!(self, StimulusKind::Go)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StimulusKind::Go => "go",
            StimulusKind::NoGo => "no-go",
        }
    }
}

impl fmt::Display for StimulusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the presentation layer should be showing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialVisualEvent {
    StimulusShown { trial: usize, kind: StimulusKind },
    StimulusCleared { trial: usize },
}

impl TrialVisualEvent {
    pub fn trial(&self) -> usize {
        match self {
            TrialVisualEvent::StimulusShown { trial, .. } => *trial,
            TrialVisualEvent::StimulusCleared { trial } => *trial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_go_requires_response() {
        assert!(StimulusKind::Go.requires_response());
        assert!(!StimulusKind::NoGo.requires_response());
    }

    #[test]
    fn visual_event_reports_its_trial() {
        let shown = TrialVisualEvent::StimulusShown {
            trial: 4,
            kind: StimulusKind::NoGo,
        };
        assert_eq!(shown.trial(), 4);
        assert_eq!(TrialVisualEvent::StimulusCleared { trial: 7 }.trial(), 7);
    }
}
