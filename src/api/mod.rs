//! Remote API clients
//!
//! Typed clients for the Transfer API (access rules) and the Auth API
//! (identity lookup), sharing one authenticated HTTP layer.

pub mod client;
pub mod identity;
pub mod transfer;
pub mod types;

pub use client::{ApiClient, HttpSettings};
pub use identity::IdentityClient;
pub use transfer::TransferClient;
pub use types::*;
