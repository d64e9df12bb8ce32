//! Storage traits for OAuth clients and tokens.
//!
//! An authorization server is handed one [`ClientStorage`] and one
//! [`TokenStorage`] and never sees the database behind them.
//!
//! # Implementations
//!
//! - `tokenvault-oauth-docstore` - document database backend

pub mod client;
pub mod token;

pub use client::ClientStorage;
pub use token::TokenStorage;
