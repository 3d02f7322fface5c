pub mod effect;
pub mod intent;
pub mod machine;

pub use effect::Effect;
pub use intent::{Event, FetchPurpose, Intent};
pub use machine::Reducer;
