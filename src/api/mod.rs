//! API client module for the Smart Intercom service.
//!
//! This module provides the `ApiClient` for the two remote operations the
//! console needs: `login` and `refresh_token`. Both go through a single
//! long-lived HTTP client that attaches the stored bearer token as an
//! authorization header on every request.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
