//! CLI command implementations

pub mod error;
pub mod poll;

pub use error::CliError;
pub use poll::{run_until_shutdown, Cli};
