pub mod backend;
pub mod config;
pub mod conversation;
pub mod parse;
pub mod prompt;
pub mod render;
pub mod types;

pub use types::*;
