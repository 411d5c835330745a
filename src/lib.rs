pub mod config;
pub mod data;
pub mod error;
pub mod log;
pub mod output;
pub mod scoring;
pub mod tui;
