// Test Helper Modules
//
// Shared infrastructure for contract and integration tests. Integration
// tests talk to a real MySQL database (TEST_DATABASE_URL) and are marked
// #[ignore]; contract tests only need a lazily-connecting pool.
//
// Usage (from a test crate):
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;

#![allow(dead_code)]

pub mod test_database;
pub mod test_server;

pub use assertions::*;
pub use test_data::*;
pub use test_database::*;
pub use test_server::*;
