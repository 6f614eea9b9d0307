// Library surface: the scoring and progression engine plus the headless app
// that drives it. Terminal drawing stays in the binary.
pub mod achievements;
pub mod app;
pub mod challenges;
pub mod config;
pub mod error;
pub mod progress;
pub mod progression;
pub mod rank;
pub mod runtime;
pub mod session;
pub mod texts;

pub use error::{KeyrankError, Result};
