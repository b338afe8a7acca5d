pub mod auth;
pub mod engine;
pub mod observability;
pub mod persistence;
