//! Shared value types.

pub mod object_key;

pub use object_key::ObjectKey;
