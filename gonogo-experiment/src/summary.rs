use gonogo_core::{Classification, StimulusKind, TrialOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Append-only record of the outcomes of one session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    trial_count: usize,
    outcomes: Vec<TrialOutcome>,
}

impl SessionRecord {
    pub fn new(trial_count: usize) -> Self {
        Self {
            trial_count,
            outcomes: Vec::with_capacity(trial_count),
        }
    }

    /// Appends the outcome of the next trial. Refuses outcomes once the session is
    /// full or when the outcome is not for the next index.
    pub fn push(&mut self, outcome: TrialOutcome) -> bool {
        if self.is_complete() || outcome.index() != self.outcomes.len() + 1 {
            return false;
        }
        self.outcomes.push(outcome);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.trial_count
    }

    pub fn outcomes(&self) -> &[TrialOutcome] {
        &self.outcomes
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    /// Summary statistics, available only once every trial has resolved.
    pub fn summary(&self) -> Option<ResultsSummary> {
        self.is_complete()
            .then(|| ResultsSummary::from_outcomes(&self.outcomes))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Mean hit latency; 0 when there were no hits.
    pub average_hit_latency_ms: f64,
    pub hits: usize,
    pub go_trials: usize,
    pub false_alarms: usize,
    pub no_go_trials: usize,
    pub misses: usize,
    pub correct_withholds: usize,
}

impl ResultsSummary {
    pub fn from_outcomes(outcomes: &[TrialOutcome]) -> Self {
        let count = |c: Classification| outcomes.iter().filter(|o| o.classification() == c).count();
        let latencies: Vec<f64> = outcomes
            .iter()
            .filter_map(|o| o.reaction_time_ns())
            .map(|ns| ns as f64 / 1_000_000.0)
            .collect();
        let average_hit_latency_ms = if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        };

        Self {
            average_hit_latency_ms,
            hits: count(Classification::Hit),
            go_trials: outcomes
                .iter()
                .filter(|o| o.kind() == StimulusKind::Go)
                .count(),
            false_alarms: count(Classification::FalseAlarm),
            no_go_trials: outcomes
                .iter()
                .filter(|o| o.kind() == StimulusKind::NoGo)
                .count(),
            misses: count(Classification::Miss),
            correct_withholds: count(Classification::CorrectWithhold),
        }
    }
}

impl fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results")?;
        writeln!(
            f,
            "Avg Reaction Time: {} ms",
            self.average_hit_latency_ms.round() as u64
        )?;
        writeln!(f, "Correct Hits: {} / {}", self.hits, self.go_trials)?;
        writeln!(f, "False Alarms: {} / {}", self.false_alarms, self.no_go_trials)?;
        write!(f, "Misses: {}", self.misses)
    }
}

/// Summary in the message shape a host page listens for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "gonogo_results")]
pub struct ResultsMessage {
    pub data: ResultsData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsData {
    /// Hit latencies in whole milliseconds, in trial order.
    pub reaction_times: Vec<u64>,
    pub false_alarms: usize,
    pub misses: usize,
    pub correct_hits: usize,
    pub total_go: usize,
    pub total_no_go: usize,
}

impl ResultsMessage {
    pub fn new(outcomes: &[TrialOutcome], summary: &ResultsSummary) -> Self {
        Self {
            data: ResultsData {
                reaction_times: outcomes
                    .iter()
                    .filter_map(|o| o.reaction_time())
                    .map(|d| d.as_millis() as u64)
                    .collect(),
                false_alarms: summary.false_alarms,
                misses: summary.misses,
                correct_hits: summary.hits,
                total_go: summary.go_trials,
                total_no_go: summary.no_go_trials,
            },
        }
    }
}
