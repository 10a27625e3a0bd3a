pub mod auth;
pub mod error;
pub mod friends;
pub mod health;
pub mod matches;
pub mod players;
pub mod routes;
pub mod tournaments;
pub mod users;
