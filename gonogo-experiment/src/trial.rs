use gonogo_core::{TrialOutcome, TrialSpec, TrialState};
use std::time::Duration;

/// One trial, driven from `Idle` to `Resolved`.
///
/// The machine never reads a clock itself: every transition receives the current
/// timestamp (nanoseconds since the clock origin) from the driver.
#[derive(Debug, Clone)]
pub struct Trial {
    pub spec: TrialSpec,
    pub response_window: Duration,
    pub timestamps: TrialTimestamps,
    state: TrialState,
    accepted: bool,
    outcome: Option<TrialOutcome>,
}

#[derive(Debug, Clone, Default)]
pub struct TrialTimestamps {
    pub start: Option<u64>,
    pub stimulus_onset: Option<u64>,
    pub response: Option<u64>,
    pub resolved: Option<u64>,
}

/// What happened to a reported response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDisposition {
    /// Captured inside the window; the trial resolved with this outcome.
    Accepted(TrialOutcome),
    /// Reported before the stimulus was shown.
    Premature,
    /// Reported at or after the window deadline.
    Late,
    /// The trial had already been resolved.
    AlreadyResolved,
}

impl Trial {
    pub fn new(spec: TrialSpec, response_window: Duration) -> Self {
        Self {
            spec,
            response_window,
            timestamps: TrialTimestamps::default(),
            state: TrialState::Idle,
            accepted: false,
            outcome: None,
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    /// True once a response has taken this trial's single response slot.
    pub fn response_accepted(&self) -> bool {
        self.accepted
    }

    pub fn outcome(&self) -> Option<&TrialOutcome> {
        self.outcome.as_ref()
    }

    /// Idle -> Pending. Returns false if the trial was already started.
    pub fn begin(&mut self, now: u64) -> bool {
        if self.state != TrialState::Idle {
            return false;
        }
        self.timestamps.start = Some(now);
        self.state = TrialState::Pending;
        true
    }

    /// Pending -> Active. `now` is the stimulus onset.
    pub fn open_window(&mut self, now: u64) -> bool {
        if self.state != TrialState::Pending {
            return false;
        }
        self.timestamps.stimulus_onset = Some(now);
        self.state = TrialState::Active;
        true
    }

    /// Instant at which the response window closes, once the stimulus is up.
    pub fn deadline(&self) -> Option<u64> {
        let window_ns = u64::try_from(self.response_window.as_nanos()).unwrap_or(u64::MAX);
        self.timestamps
            .stimulus_onset
            .map(|onset| onset.saturating_add(window_ns))
    }

    /// Offers a response captured at `at`. Only the first response inside the open
    /// window is accepted; everything else is discarded.
    pub fn respond(&mut self, at: u64) -> ResponseDisposition {
        if self.accepted {
            return ResponseDisposition::AlreadyResolved;
        }
        match self.state {
            TrialState::Idle | TrialState::Pending => ResponseDisposition::Premature,
            TrialState::Resolved => ResponseDisposition::AlreadyResolved,
            TrialState::Active => {
                let (Some(onset), Some(deadline)) = (self.timestamps.stimulus_onset, self.deadline())
                else {
                    return ResponseDisposition::Premature;
                };
                if at < onset {
                    return ResponseDisposition::Premature;
                }
                if at >= deadline {
                    return ResponseDisposition::Late;
                }

                self.accepted = true;
                self.timestamps.response = Some(at);
                let outcome = self.resolve(at, Some(Duration::from_nanos(at - onset)));
                ResponseDisposition::Accepted(outcome)
            }
        }
    }

    /// Active -> Resolved without a response. `None` outside the Active state.
    pub fn expire(&mut self, now: u64) -> Option<TrialOutcome> {
        if self.state != TrialState::Active {
            return None;
        }
        Some(self.resolve(now, None))
    }

    fn resolve(&mut self, now: u64, latency: Option<Duration>) -> TrialOutcome {
        let outcome = TrialOutcome::resolve(&self.spec, latency);
        self.timestamps.resolved = Some(now);
        self.state = TrialState::Resolved;
        self.outcome = Some(outcome.clone());
        outcome
    }
}
