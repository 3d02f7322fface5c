pub mod commands;
pub mod example;
pub mod output;
pub mod progress;
pub mod upload;
pub mod validate;
pub mod watch;

pub use commands::{Cli, Commands};
