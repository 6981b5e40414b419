//! Client for the Parasail REST API.
//!
//! `NodeApi` is the seam the rest of the crate programs against; the
//! `ParasailClient` implementation talks HTTPS/JSON to the real service.

pub mod client;
pub mod error;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{NodeApi, ParasailClient, VerifyResponse};
pub use error::ApiError;
