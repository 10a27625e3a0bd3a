//! Pong tracking backend: accounts, players, match history and
//! single-elimination tournaments over a SQLite store.

pub mod chain;
pub mod config;
pub mod db;
pub mod error;
pub mod game;
pub mod http;
pub mod metrics;
