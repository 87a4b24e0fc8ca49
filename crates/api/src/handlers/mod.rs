pub mod admin;
pub mod auth;
pub mod dump;
pub mod health;
pub mod load;
