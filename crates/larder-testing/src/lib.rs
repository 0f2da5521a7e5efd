//! Test utilities for Larder services.
//!
//! Provides signed `Authorization` headers and request-body fixtures.
//! Import from tests only; never in production code.

pub mod auth;
pub mod fixture;
