use serde::{Deserialize, Serialize};

/// JWT claims carried by every authenticated request: the principal.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's ID.
    pub sub: i64,
    /// Expiry as a unix timestamp.
    pub exp: usize,
    /// Whether the principal has admin privileges.
    pub admin: bool,
    /// Whether the principal is an instructor.
    pub instructor: bool,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);
