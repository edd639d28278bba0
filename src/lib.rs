pub mod app;
pub mod client;
pub mod config;
pub mod decorators;
pub mod error;
pub mod models;

pub use error::{Error, Result};
