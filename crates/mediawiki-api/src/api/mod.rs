//! MediaWiki API plumbing.
//!
//! This module provides the transport seam, the rate-limited request sender
//! and the response types shared by the higher level modules.

pub mod params;
pub mod rate_limiter;
pub mod request;
pub mod transport;
pub mod types;

pub use params::QueryParams;
pub use rate_limiter::RateLimiter;
pub use request::WikiRequest;
pub use transport::{HttpTransport, Transport};
pub use types::check_response;
