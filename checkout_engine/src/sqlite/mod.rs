//! SQLite backend for the checkout engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteOrderStore;
