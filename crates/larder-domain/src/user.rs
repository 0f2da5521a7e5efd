//! User domain types.

use serde::{Deserialize, Serialize};

/// User permission level.
///
/// Stored as `i16` (0 = User, 1 = Staff, 2 = Admin) and carried as `u8` in
/// token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User = 0,
    Staff = 1,
    Admin = 2,
}

impl UserRole {
    /// Convert from the stored column value. Returns `None` for unknown values.
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(Self::User),
            1 => Some(Self::Staff),
            2 => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::from_i16(i16::from(v))
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Staff and admins may edit any recipe and manage lookup tables.
    pub fn can_moderate(self) -> bool {
        self >= Self::Staff
    }
}

/// Usernames that collide with route segments.
pub const RESERVED_USERNAMES: &[&str] = &["me"];

/// Whether `username` only uses letters, digits and `.@+-_`.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
        && !RESERVED_USERNAMES.contains(&username)
}
