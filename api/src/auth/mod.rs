//! Authentication and authorization.
//!
//! Token *issuance* belongs to the identity collaborator, not this service;
//! everything here verifies bearer JWTs and decides what the resulting
//! principal may do:
//!
//! - `claims` — the JWT claims shape and the `AuthUser` wrapper.
//! - `extractors` — bearer-token extraction and verification.
//! - `guards` — route-layer authentication middleware.
//! - `policy` — the per-action assessment authorization table.
//! - `middleware` — request logging.

pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;
pub mod policy;

pub use claims::{AuthUser, Claims};
