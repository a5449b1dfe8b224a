pub mod candidate;
pub mod coalition;
pub mod election;
pub mod user;
pub mod vote;
