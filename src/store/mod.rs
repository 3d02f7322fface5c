pub mod state;

pub use state::{Mode, Phase, ResultState, StateSnapshot};
