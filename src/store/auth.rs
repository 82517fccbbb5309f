//! Bearer tokens the HTTP sessions are resolved from.

use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

pub const AUTH_TOKEN_LENGTH: usize = 64;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct AuthTokenValue(pub String);

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AuthToken {
    pub user_id: usize,
    pub value: AuthTokenValue,
    pub created: SystemTime,
    pub last_used: Option<SystemTime>,
}

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let value: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(AUTH_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        AuthTokenValue(value)
    }
}

impl AuthToken {
    pub fn new(user_id: usize) -> AuthToken {
        AuthToken {
            user_id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_alphanumeric_tokens() {
        let first = AuthTokenValue::generate();
        let second = AuthTokenValue::generate();
        assert_eq!(first.0.len(), AUTH_TOKEN_LENGTH);
        assert!(first.0.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
