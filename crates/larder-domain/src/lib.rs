//! Domain types shared across Larder crates.
//!
//! Pure types with no framework dependencies. Import in `usecase/` and
//! `domain/` layers and in tools; keep axum and sea-orm out of here.

pub mod pagination;
pub mod short_code;
pub mod user;
