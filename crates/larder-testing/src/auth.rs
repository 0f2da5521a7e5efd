//! Auth helpers for tests.
//!
//! Tokens are signed with the real issuer, so a service under test only
//! accepts them if it also knows `token_id` (for example, after a login).

use http::{HeaderMap, HeaderName, HeaderValue, header::AUTHORIZATION};
use larder_auth_types::token::issue_token;
use larder_domain::user::UserRole;
use uuid::Uuid;

/// Secret shared by test configs and [`MockAuth`].
pub const TEST_JWT_SECRET: &str = "larder-test-secret";

/// Identity to sign into a test token.
pub struct MockAuth {
    pub user_id: i32,
    pub role: UserRole,
    pub token_id: Uuid,
}

impl MockAuth {
    pub fn new(user_id: i32, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            token_id: Uuid::new_v4(),
        }
    }

    pub fn token(&self) -> String {
        issue_token(
            self.user_id,
            self.role.as_u8(),
            self.token_id,
            3600,
            TEST_JWT_SECRET,
        )
        .unwrap()
    }

    pub fn headers(&self) -> HeaderMap {
        let (name, value) = authorization(&self.token());
        let mut map = HeaderMap::new();
        map.insert(name, value);
        map
    }
}

/// `Authorization: Token <token>` as a header pair.
pub fn authorization(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Token {token}")).unwrap(),
    )
}
