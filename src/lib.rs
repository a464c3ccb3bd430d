pub mod bridge;
pub mod config;
pub mod deploy;
pub mod handler;
pub mod models;
