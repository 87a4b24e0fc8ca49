//! Domain layer for the fixture dump/load service.
//!
//! Everything here is free of HTTP and database concerns: the model
//! registry, scope selectors, the fixture record codec, flash messages and
//! fixture-directory listing.

pub mod clock;
pub mod error;
pub mod fixture;
pub mod fixture_dir;
pub mod messages;
pub mod registry;
pub mod roles;
pub mod scope;
pub mod types;
