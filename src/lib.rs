pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;
