pub mod timer;

pub use timer::{Clock, TokioClock};
