//! HTTP access to the notes backend.
//!
//! Every endpoint lives under `/api/1/`. The backend keeps the logged-in
//! user in a session cookie and redirects to the login page when the cookie
//! is missing, so the client keeps a cookie store and never follows
//! redirects.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::GitInfo;
