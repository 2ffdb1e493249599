pub mod common;
pub mod event;
pub mod feedback;
pub mod idea;
pub mod judge;
pub mod phase;
pub mod project;
pub mod team;
pub mod user;
