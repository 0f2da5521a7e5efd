//! Auth types shared across Larder crates.
//!
//! Provides JWT issue/validate, `Authorization` header parsing, and argon2
//! password hashing.

pub mod header;
pub mod password;
pub mod token;
