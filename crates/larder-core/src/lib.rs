//! HTTP plumbing shared by Larder binaries: error envelope, extractors,
//! request-id/trace layers, query helpers and tracing setup.

pub mod de;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod sea_ext;
pub mod tracing;
