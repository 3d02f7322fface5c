pub mod filter;
pub mod finding;
pub mod job;
pub mod pagination;
pub mod request;
pub mod results;
pub mod serde_util;
pub mod solution;

pub use filter::*;
pub use finding::*;
pub use job::*;
pub use pagination::*;
pub use request::*;
pub use results::*;
pub use solution::*;
