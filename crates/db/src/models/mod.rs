//! Row structs and DTOs for the tables the service itself reads.

pub mod user;
