pub mod classify;
pub mod stimulus;
pub mod trial;

pub use classify::{Classification, classify};
pub use stimulus::{StimulusKind, TrialVisualEvent};
pub use trial::{OutcomeError, TrialOutcome, TrialSpec, TrialState};
