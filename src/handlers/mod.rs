pub mod auth;
pub mod bets;
pub mod betting_config;
pub mod health;
pub mod invitations;
pub mod matches;
pub mod odds;
pub mod players;
pub mod predictions;
pub mod stadiums;
pub mod standings;
pub mod teams;
pub mod tournaments;
pub mod users;
