//! Bridge data models — inbound events, pipeline definitions, statuses.

pub mod event;
pub mod pipeline;
pub mod status;
