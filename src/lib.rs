pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod state;
