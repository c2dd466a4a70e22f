//! Search sessions and their registry
//!
//! # Components
//!
//! - `SessionState`: lifecycle of one session (created, running, terminal)
//! - `SearchRequest`: a validated start/finish/strategy triple
//! - `SessionRegistry`: starts, polls and aborts concurrent sessions

mod registry;
mod request;
mod state;

pub use registry::{PollResult, SessionRegistry};
pub use request::{RawSearchRequest, SearchRequest};
pub use state::SessionState;
