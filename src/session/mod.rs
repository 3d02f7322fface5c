pub mod driver;
pub mod handle;

pub use driver::{Session, SessionConfig};
pub use handle::SessionHandle;
