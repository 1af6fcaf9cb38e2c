//! Trait definitions implemented by the provider crates.

pub mod object_store;

pub use object_store::{ListPage, ObjectStore};
