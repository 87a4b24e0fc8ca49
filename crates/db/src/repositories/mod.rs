//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept the pool as the first argument.

pub mod user_repo;

pub use user_repo::UserRepo;
