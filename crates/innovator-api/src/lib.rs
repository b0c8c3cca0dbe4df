//! innovator-api: wire layer for the idea service
//!
//! This crate holds the request/response shapes of the two remote
//! operations (clarify and generate), the error type shared by every
//! caller, and a reqwest-backed implementation of [`IdeaService`].

pub mod client;
pub mod endpoint;
pub mod error;
pub mod types;

pub use client::{HttpIdeaService, IdeaService};
pub use error::{Error, Result};
pub use types::*;
