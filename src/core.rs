pub mod cache;
pub mod models;
pub mod pending_votes;
pub mod phase_cache;
pub mod ports;
pub mod services;
pub mod tokener;
