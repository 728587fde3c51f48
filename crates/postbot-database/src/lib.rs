pub use connection::Connection;
pub use database::{Database, Stats};
pub use error::Error;

mod connection;
mod database;
mod error;
pub mod services;
