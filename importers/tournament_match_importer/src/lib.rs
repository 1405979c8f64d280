pub mod catalog;
pub mod client;
pub mod config;
pub mod import;
pub mod participants;
pub mod schedule;
pub mod score;
pub mod store;
pub mod types;
