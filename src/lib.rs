//! Smart Intercom console - sign-in flow and session plumbing.
//!
//! The crate is split the same way the running program is:
//!
//! - `api`: the single request client and the two remote operations
//! - `auth`: the file-backed session token slot
//! - `app`: sign-in state, the auth flag, and background task wiring
//! - `config`: endpoint and data-directory configuration
//! - `ui`: ratatui rendering and keyboard handling

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod ui;
