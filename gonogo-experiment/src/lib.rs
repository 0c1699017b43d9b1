pub mod config;
pub mod error;
pub mod generator;
pub mod session;
pub mod summary;
pub mod trial;
pub use config::SessionConfig;
pub use error::{ConfigError, SessionError};
pub use generator::TrialGenerator;
pub use session::{Completion, ResponseReporter, Session, SessionHandle, SessionReport, VisualEvents};
pub use summary::{ResultsData, ResultsMessage, ResultsSummary, SessionRecord};
pub use trial::{ResponseDisposition, Trial, TrialTimestamps};
