//! API client library for troverai.
//!
//! Provides the RaiPlay schedule client and the helpers around the
//! optional authentication token file.

/// Token file, JWT expiry and refresh exchange.
pub mod auth;

/// RaiPlay schedule API client.
pub mod raiplay;
