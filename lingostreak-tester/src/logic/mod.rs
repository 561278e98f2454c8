pub mod fuzz;
pub mod reports;
pub mod tester;

pub use fuzz::{DEFAULT_STORM_STEPS, run_event_storm};
pub use lingostreak_core::audit::SnapshotRecorder;
pub use tester::*;
