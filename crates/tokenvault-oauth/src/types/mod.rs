//! OAuth2 entities persisted by the storage backends.

pub mod client;
pub mod token;

pub use client::Client;
pub use token::{CodeChallengeMethod, Token};
