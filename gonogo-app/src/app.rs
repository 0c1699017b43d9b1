use anyhow::{Context, Result, bail};
use futures::StreamExt;
use gonogo_core::{StimulusKind, TrialVisualEvent};
use gonogo_experiment::{ResultsMessage, Session, SessionConfig};
use gonogo_timing::{Clock, TokioClock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Virtual participant used to drive a session without a display
#[derive(Debug, Clone)]
pub struct SimulatedSubject {
    pub go_latency_ms: (u64, u64),
    /// Share of go trials left unanswered.
    pub miss_rate: f64,
    /// Share of no-go trials answered anyway.
    pub commission_rate: f64,
}

impl Default for SimulatedSubject {
    fn default() -> Self {
        Self {
            go_latency_ms: (220, 480),
            miss_rate: 0.05,
            commission_rate: 0.2,
        }
    }
}

impl SimulatedSubject {
    fn react<R: Rng>(&self, kind: StimulusKind, rng: &mut R) -> Option<Duration> {
        let press = match kind {
            StimulusKind::Go => !rng.random_bool(self.miss_rate),
            StimulusKind::NoGo => rng.random_bool(self.commission_rate),
        };
        press.then(|| {
            Duration::from_millis(rng.random_range(self.go_latency_ms.0..=self.go_latency_ms.1))
        })
    }
}

pub struct App {
    config: SessionConfig,
    subject: SimulatedSubject,
    fast: bool,
}

impl App {
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut fast = false;
        let mut path: Option<PathBuf> = None;
        for arg in args {
            match arg.as_str() {
                "--fast" => fast = true,
                flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
                _ if path.is_some() => bail!("only one configuration file may be given"),
                _ => path = Some(PathBuf::from(arg)),
            }
        }

        let config = match path {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                SessionConfig::from_json(&json)
                    .with_context(|| format!("loading {}", path.display()))?
            }
            None => SessionConfig::default(),
        };

        Ok(Self {
            config,
            subject: SimulatedSubject::default(),
            fast,
        })
    }

    pub fn run(self) -> Result<()> {
        // A paused clock jumps straight to the next timer, so the whole session
        // completes without waiting in real time.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(self.fast)
            .build()?;

        println!("=== GO/NO-GO REACTION TASK ===");
        println!("Press when the stimulus is GO, withhold when it is NO-GO.\n");

        runtime.block_on(self.run_session())
    }

    async fn run_session(self) -> Result<()> {
        let clock = TokioClock::new();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };

        let session = Session::new(self.config.clone(), clock)?.on_complete(|summary| {
            info!(hits = summary.hits, misses = summary.misses, "Results ready");
        });
        let (mut events, reporter, completion) = session.start().split();

        while let Some(event) = events.next().await {
            match event {
                TrialVisualEvent::StimulusShown { trial, kind } => {
                    info!(trial, %kind, at_ms = clock.now() / 1_000_000, "Stimulus shown");
                    if let Some(latency) = self.subject.react(kind, &mut rng) {
                        let reporter = reporter.clone();
                        tokio::spawn(async move {
                            reporter.clock().after(latency).await;
                            reporter.report_now();
                        });
                    }
                }
                TrialVisualEvent::StimulusCleared { trial } => {
                    info!(trial, at_ms = clock.now() / 1_000_000, "Stimulus cleared");
                }
            }
        }

        let report = completion.wait().await?;
        println!("{}\n", report.summary);
        let message = ResultsMessage::new(&report.outcomes, &report.summary);
        println!("{}", serde_json::to_string_pretty(&message)?);

        Ok(())
    }
}
