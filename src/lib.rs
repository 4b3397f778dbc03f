pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod kicks;
pub mod logging;
pub mod search;
pub mod state;
pub mod utils;
pub mod web;
