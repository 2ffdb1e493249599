pub mod content;
pub mod tokener;
