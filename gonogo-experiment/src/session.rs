use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::generator::TrialGenerator;
use crate::summary::{ResultsSummary, SessionRecord};
use crate::trial::{ResponseDisposition, Trial};
use futures::Stream;
use gonogo_core::{TrialOutcome, TrialVisualEvent};
use gonogo_timing::Clock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

type CompletionCallback = Box<dyn FnOnce(&ResultsSummary) + Send + 'static>;

/// A configured, not yet started Go/No-Go session.
///
/// Trials run strictly one after another; the next trial is generated only once the
/// previous one has resolved.
pub struct Session<C: Clock, R: Rng> {
    config: SessionConfig,
    clock: C,
    generator: TrialGenerator<R>,
    on_complete: Option<CompletionCallback>,
}

/// Everything a finished session produced
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcomes: Vec<TrialOutcome>,
    pub summary: ResultsSummary,
}

impl<C: Clock> Session<C, StdRng> {
    /// Validates `config` and seeds the stimulus sequence from `config.seed`.
    pub fn new(config: SessionConfig, clock: C) -> Result<Self, SessionError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, clock, rng)
    }
}

impl<C, R> Session<C, R>
where
    C: Clock,
    R: Rng + Send + 'static,
{
    pub fn with_rng(config: SessionConfig, clock: C, rng: R) -> Result<Self, SessionError> {
        config.validate()?;
        let generator = TrialGenerator::new(
            rng,
            config.go_probability,
            config.base_delay_ms,
            config.max_jitter_ms,
        )?;
        Ok(Self {
            config,
            clock,
            generator,
            on_complete: None,
        })
    }

    /// Called once with the final summary, before `Completion::wait` returns.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&ResultsSummary) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Spawns the session on the current tokio runtime.
    pub fn start(self) -> SessionHandle<C> {
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let reporter = ResponseReporter {
            tx: response_tx,
            clock: self.clock.clone(),
        };
        let inbox = Inbox {
            rx: response_rx,
            open: true,
        };
        let task = tokio::spawn(self.run(inbox, event_tx));

        SessionHandle {
            events: VisualEvents { rx: event_rx },
            reporter,
            completion: Completion { task },
        }
    }

    async fn run(
        mut self,
        mut inbox: Inbox,
        events: mpsc::UnboundedSender<TrialVisualEvent>,
    ) -> Result<SessionReport, SessionError> {
        let window = self.config.response_window();
        let mut record = SessionRecord::new(self.config.trial_count);
        info!(
            trials = self.config.trial_count,
            go_probability = self.config.go_probability,
            window_ms = self.config.response_window_ms,
            "Session started"
        );

        for index in 1..=self.config.trial_count {
            let spec = self.generator.generate(index);
            let mut trial = Trial::new(spec, window);
            trial.begin(self.clock.now());
            debug!(
                trial = index,
                kind = %spec.kind,
                delay_ms = spec.delay.as_millis() as u64,
                "Trial pending"
            );

            hold(self.clock.after(spec.delay), &mut trial, &mut inbox).await;

            let onset = self.clock.now();
            trial.open_window(onset);
            send(
                &events,
                TrialVisualEvent::StimulusShown {
                    trial: index,
                    kind: spec.kind,
                },
            );
            let Some(deadline) = trial.deadline() else {
                error!(trial = index, state = ?trial.state(), "Stimulus shown without an open window");
                return Err(SessionError::Unresolved { trial: index });
            };

            let accepted = {
                let expiry = self.clock.at(deadline);
                tokio::pin!(expiry);
                loop {
                    tokio::select! {
                        biased;
                        at = inbox.recv() => match trial.respond(at) {
                            ResponseDisposition::Accepted(outcome) => break Some(outcome),
                            other => log_discarded(index, &other),
                        },
                        _ = &mut expiry => break None,
                    }
                }
            };
            let outcome = settle(&mut trial, accepted, self.clock.now())?;

            if self.config.fixed_pace {
                hold(self.clock.at(deadline), &mut trial, &mut inbox).await;
            }
            send(&events, TrialVisualEvent::StimulusCleared { trial: index });

            debug!(
                trial = index,
                classification = ?outcome.classification(),
                rt_ms = outcome.reaction_time().map(|d| d.as_millis() as u64),
                "Trial resolved"
            );
            if !record.push(outcome) {
                error!(trial = index, "Outcome refused by session record");
                return Err(SessionError::OutcomeRefused { trial: index });
            }
        }

        let summary = finalize(&record)?;
        info!(
            hits = summary.hits,
            go_trials = summary.go_trials,
            false_alarms = summary.false_alarms,
            no_go_trials = summary.no_go_trials,
            avg_rt_ms = summary.average_hit_latency_ms,
            "Session complete"
        );
        if let Some(callback) = self.on_complete.take() {
            callback(&summary);
        }

        Ok(SessionReport {
            outcomes: record.outcomes().to_vec(),
            summary,
        })
    }
}

/// The outcome the machine produced for a trial whose window has closed, either
/// through an accepted response or by expiring.
fn settle(
    trial: &mut Trial,
    accepted: Option<TrialOutcome>,
    now: u64,
) -> Result<TrialOutcome, SessionError> {
    match accepted {
        Some(outcome) => Ok(outcome),
        None => trial.expire(now).ok_or_else(|| {
            error!(
                trial = trial.spec.index,
                state = ?trial.state(),
                "Response window closed outside the active state"
            );
            SessionError::Unresolved {
                trial: trial.spec.index,
            }
        }),
    }
}

fn finalize(record: &SessionRecord) -> Result<ResultsSummary, SessionError> {
    record.summary().ok_or(SessionError::Incomplete {
        recorded: record.outcomes().len(),
        expected: record.trial_count(),
    })
}

/// Waits for `until`, discarding every response that arrives meanwhile.
async fn hold(until: impl Future<Output = ()>, trial: &mut Trial, inbox: &mut Inbox) {
    tokio::pin!(until);
    loop {
        tokio::select! {
            _ = &mut until => return,
            at = inbox.recv() => {
                let disposition = trial.respond(at);
                log_discarded(trial.spec.index, &disposition);
            }
        }
    }
}

fn log_discarded(index: usize, disposition: &ResponseDisposition) {
    debug!(trial = index, ?disposition, "Response discarded");
}

fn send(events: &mpsc::UnboundedSender<TrialVisualEvent>, event: TrialVisualEvent) {
    if events.send(event).is_err() {
        debug!(?event, "No presenter listening");
    }
}

/// Receiving side of the response channel
struct Inbox {
    rx: mpsc::UnboundedReceiver<u64>,
    open: bool,
}

impl Inbox {
    /// Next reported response instant. Never resolves once every reporter is gone,
    /// so the session carries on with timeouts alone.
    async fn recv(&mut self) -> u64 {
        if self.open {
            if let Some(at) = self.rx.recv().await {
                return at;
            }
            self.open = false;
            debug!("All response reporters dropped");
        }
        std::future::pending().await
    }
}

/// Input channel for the presentation layer
#[derive(Debug, Clone)]
pub struct ResponseReporter<C: Clock> {
    tx: mpsc::UnboundedSender<u64>,
    clock: C,
}

impl<C: Clock> ResponseReporter<C> {
    /// Reports a response captured at `at` (session clock nanoseconds). Returns false
    /// once the session has finished.
    pub fn report(&self, at: u64) -> bool {
        self.tx.send(at).is_ok()
    }

    pub fn report_now(&self) -> bool {
        self.report(self.clock.now())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Visual events in presentation order; ends after the last trial is cleared.
#[derive(Debug)]
pub struct VisualEvents {
    rx: mpsc::UnboundedReceiver<TrialVisualEvent>,
}

impl Stream for VisualEvents {
    type Item = TrialVisualEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[derive(Debug)]
pub struct Completion {
    task: JoinHandle<Result<SessionReport, SessionError>>,
}

impl Completion {
    pub async fn wait(self) -> Result<SessionReport, SessionError> {
        self.task.await.map_err(|_| SessionError::Interrupted)?
    }
}

pub struct SessionHandle<C: Clock> {
    pub events: VisualEvents,
    pub reporter: ResponseReporter<C>,
    pub completion: Completion,
}

impl<C: Clock> SessionHandle<C> {
    pub fn split(self) -> (VisualEvents, ResponseReporter<C>, Completion) {
        (self.events, self.reporter, self.completion)
    }

    /// Waits for the session, ignoring visual events.
    pub async fn finished(self) -> Result<SessionReport, SessionError> {
        self.completion.wait().await
    }
}
