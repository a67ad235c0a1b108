pub mod boilerplate;
pub mod config;
pub mod models;
