//! Host APIs for shelfscan source adapters.
//!
//! - [`http`] - HTTP client with tracing, domain allowlist, and quota headers
//! - [`env`] - Credential lookup from the environment

pub mod env;
pub mod http;

// Re-export key types
pub use env::{CredentialSource, ProcessEnv, StaticCredentials};
pub use http::{HttpClient, ResponseExt};
