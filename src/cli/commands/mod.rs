//! CLI command implementations

pub mod cache;
pub mod config;
pub mod matrix;
pub mod resolve;
pub mod token;

pub use cache::execute as cache;
pub use config::execute as config;
pub use matrix::execute as matrix;
pub use resolve::execute as resolve;
pub use token::execute as token;
