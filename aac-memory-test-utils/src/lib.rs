//! Shared fixtures, proptest generators, and an in-memory DB binding for
//! the other crates' test suites.

pub mod fixtures;
pub mod generators;
pub mod mock_db;

pub use fixtures::{mixed_schema, paged_array_schema, profile_schema};
pub use mock_db::MockDbBinding;
