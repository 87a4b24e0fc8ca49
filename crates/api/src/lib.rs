//! Smuggler API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! templates, upload spooling) so integration tests and the binary
//! entrypoint can both access them.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
pub mod templates;
pub mod upload;
