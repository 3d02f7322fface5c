//! Client for an asynchronous vulnerability-findings analysis service.
//!
//! A [`session::Session`] drives one result acquisition: upload a findings
//! document, poll the remote job, fetch and filter the recommendations,
//! or show a bundled example instead. Views talk to it through intents
//! and observe [`store::StateSnapshot`]s.

pub mod cli;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod polling;
pub mod reducer;
pub mod reporting;
pub mod session;
pub mod store;

pub use errors::VulnrecError;
pub use reducer::Intent;
pub use session::{Session, SessionConfig, SessionHandle};
pub use store::{Mode, Phase, ResultState, StateSnapshot};
