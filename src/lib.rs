mod api;
pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
mod utils;


pub use api::Mode;
pub use config::Config;
pub use error::{error_type, Error, ErrorType, Result};
