//! Authentication module for session token persistence.
//!
//! This module provides:
//! - `TokenStore`: a single file-backed slot for the bearer token
//! - `strip_bearer`: normalization of server-issued token strings
//!
//! Tokens are stored raw (no `"Bearer "` prefix) and read fresh on every
//! outgoing request. A cleared slot holds the empty string.

pub mod token;

pub use token::{strip_bearer, TokenStore};
