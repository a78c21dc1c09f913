pub mod betting;
pub mod common;
pub mod invitation;
pub mod matches;
pub mod player;
pub mod stadium;
pub mod team;
pub mod tournament;
pub mod user;
