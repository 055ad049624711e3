//! Database layer
//!
//! SQLite connection pool, code-embedded migrations, and the repository
//! implementations the services are built on.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DbPool};
