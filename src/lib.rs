// Library crate for queue-janitor
// Exports modules for use by the CLI binary and tests

pub mod app;
pub mod config;
pub mod error;
pub mod store;
pub mod sweep;

pub use error::{AppError, AppResult};
pub use sweep::{StateSelection, SweepOptions, SweepReport, Sweeper};
