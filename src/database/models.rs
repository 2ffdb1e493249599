pub mod feedback;
pub mod judge_vote;
pub mod phase;
