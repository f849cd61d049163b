// RKSOK — Library root
//
// Re-exports the gateway, store, config, and CLI modules.

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod store;

pub use error::{Result, RksokError};
