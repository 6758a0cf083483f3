// src/lib.rs
// Library interface for crtx
pub mod blocklist;
pub mod cli;
pub mod config;
pub mod crtsh;
pub mod extract;
pub mod filter;
pub mod input;
pub mod output;
pub mod progress;
pub mod search;
pub mod set;
pub mod stats;
