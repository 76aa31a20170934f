//! Match-request ladder built on the rating engine
//!
//! Players report results as requests, opponents confirm them, and the
//! manager applies each confirmed request to the stored profiles once.

pub mod manager;
pub mod request;

pub use manager::LadderManager;
pub use request::{MatchRecord, MatchRequest, MatchRequestKind, RequestStatus};
