pub mod content;
pub mod repository;
