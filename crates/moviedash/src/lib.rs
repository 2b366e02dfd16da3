#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod filters;
pub mod models;
pub mod render;
pub mod reports;
pub mod source;
pub mod utils;

pub use cli::app::{Cli, Command};
