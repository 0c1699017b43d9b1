use crate::classify::{Classification, classify};
use crate::stimulus::StimulusKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Trial state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Idle,
    /// Pre-stimulus delay elapsing.
    Pending,
    /// Stimulus visible, response window open.
    Active,
    Resolved,
}

/// Parameters of one trial, fixed when it is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSpec {
    /// 1-based position in the session.
    pub index: usize,
    pub kind: StimulusKind,
    pub delay: Duration,
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOutcome")]
pub struct TrialOutcome {
    index: usize,
    kind: StimulusKind,
    reaction_time_ns: Option<u64>,
    classification: Classification,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutcomeError {
    #[error("{classification:?} cannot occur on a {kind} trial")]
    KindMismatch {
        kind: StimulusKind,
        classification: Classification,
    },
    #[error("reaction time must be present exactly on hits, found {0:?}")]
    ReactionTime(Classification),
}

#[derive(Deserialize)]
struct RawOutcome {
    index: usize,
    kind: StimulusKind,
    reaction_time_ns: Option<u64>,
    classification: Classification,
}

impl TryFrom<RawOutcome> for TrialOutcome {
    type Error = OutcomeError;

    fn try_from(raw: RawOutcome) -> Result<Self, Self::Error> {
        if raw.classification.stimulus_kind() != raw.kind {
            return Err(OutcomeError::KindMismatch {
                kind: raw.kind,
                classification: raw.classification,
            });
        }
        if raw.reaction_time_ns.is_some() != (raw.classification == Classification::Hit) {
            return Err(OutcomeError::ReactionTime(raw.classification));
        }
        Ok(Self {
            index: raw.index,
            kind: raw.kind,
            reaction_time_ns: raw.reaction_time_ns,
            classification: raw.classification,
        })
    }
}

impl TrialOutcome {
    /// Classifies a finished trial. `latency` is the time from stimulus onset to the
    /// accepted response, or `None` when nothing was captured inside the window. It is
    /// only kept when the trial is a hit.
    pub fn resolve(spec: &TrialSpec, latency: Option<Duration>) -> Self {
        let classification = classify(spec.kind, latency.is_some());
        let reaction_time_ns = match classification {
            Classification::Hit => latency.map(|l| l.as_nanos() as u64),
            _ => None,
        };
        Self {
            index: spec.index,
            kind: spec.kind,
            reaction_time_ns,
            classification,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> StimulusKind {
        self.kind
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn reaction_time_ns(&self) -> Option<u64> {
        self.reaction_time_ns
    }

    pub fn reaction_time(&self) -> Option<Duration> {
        self.reaction_time_ns.map(Duration::from_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: StimulusKind) -> TrialSpec {
        TrialSpec {
            index: 3,
            kind,
            delay: Duration::from_millis(1200),
        }
    }

    #[test]
    fn hit_keeps_latency() {
        let outcome = TrialOutcome::resolve(&spec(StimulusKind::Go), Some(Duration::from_millis(250)));
        assert_eq!(outcome.classification(), Classification::Hit);
        assert_eq!(outcome.reaction_time(), Some(Duration::from_millis(250)));
        assert_eq!(outcome.index(), 3);
    }

    #[test]
    fn false_alarm_drops_latency() {
        let outcome =
            TrialOutcome::resolve(&spec(StimulusKind::NoGo), Some(Duration::from_millis(180)));
        assert_eq!(outcome.classification(), Classification::FalseAlarm);
        assert_eq!(outcome.reaction_time_ns(), None);
    }

    #[test]
    fn no_response_has_no_latency() {
        let miss = TrialOutcome::resolve(&spec(StimulusKind::Go), None);
        assert_eq!(miss.classification(), Classification::Miss);
        assert!(miss.reaction_time().is_none());

        let withhold = TrialOutcome::resolve(&spec(StimulusKind::NoGo), None);
        assert_eq!(withhold.classification(), Classification::CorrectWithhold);
        assert!(withhold.reaction_time().is_none());
    }

    #[test]
    fn outcome_serializes_with_nanosecond_latency() {
        let outcome = TrialOutcome::resolve(&spec(StimulusKind::Go), Some(Duration::from_millis(2)));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["reaction_time_ns"], 2_000_000);
        assert_eq!(json["classification"], "Hit");

        let back: TrialOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn deserializing_rejects_latency_off_a_hit() {
        let json = r#"{"index":1,"kind":"NoGo","reaction_time_ns":5,"classification":"FalseAlarm"}"#;
        assert!(serde_json::from_str::<TrialOutcome>(json).is_err());

        let json = r#"{"index":1,"kind":"Go","reaction_time_ns":null,"classification":"Hit"}"#;
        assert!(serde_json::from_str::<TrialOutcome>(json).is_err());
    }

    #[test]
    fn deserializing_rejects_category_of_the_other_kind() {
        let json = r#"{"index":1,"kind":"NoGo","reaction_time_ns":7,"classification":"Hit"}"#;
        let err = serde_json::from_str::<TrialOutcome>(json).unwrap_err();
        assert!(err.to_string().contains("cannot occur on a no-go trial"));
    }
}
