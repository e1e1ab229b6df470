pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod matching;
pub mod models;
pub mod orchestration;
pub mod session;

pub use session::Session;
