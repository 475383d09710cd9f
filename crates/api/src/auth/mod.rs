//! Authentication primitives.
//!
//! Token issuance (login, refresh) lives in the identity service; this
//! crate only validates the HS256 access tokens it receives.

pub mod jwt;
