//! Authentication: login-or-register plus stateless bearer tokens.
//!
//! Mirrors the merch-store contract: posting credentials for an unknown
//! username registers the user (and their ledger account) and returns a
//! token; a known username must present the matching password.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::ports::{Authenticator, PasswordHasher, UserRepository};
use crate::domain::{Credentials, Error, STARTING_BALANCE, UserId};

const INVALID_PASSWORD: &str = "invalid password";
const INVALID_TOKEN: &str = "invalid token";
const TOKEN_EXPIRED: &str = "token expired, please re-authenticate";
const GENERATE_FAILED: &str = "failed to generate token, please try again";

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// Authenticated user id.
    sub: i64,
    iat: i64,
    exp: i64,
}

/// Authentication service implementing the [`Authenticator`] driving port.
#[derive(Clone)]
pub struct AuthService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl<R, H> AuthService<R, H> {
    /// Create a service signing tokens with the given HS256 secret.
    pub fn new(users: Arc<R>, hasher: Arc<H>, secret: &str, token_ttl: Duration) -> Self {
        Self {
            users,
            hasher,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    fn sign(&self, user: UserId) -> Result<String, Error> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user.value(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| Error::internal(GENERATE_FAILED))
    }
}

#[async_trait]
impl<R, H> Authenticator for AuthService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn issue_token(&self, credentials: Credentials) -> Result<String, Error> {
        let existing = self
            .users
            .find_by_username(&credentials.username)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;

        let user_id = match existing {
            Some(user) => {
                if !self.hasher.verify(&credentials.password, &user.password_hash) {
                    return Err(Error::unauthorized(INVALID_PASSWORD));
                }
                user.id
            }
            None => {
                let hash = self
                    .hasher
                    .hash(&credentials.password)
                    .map_err(|err| Error::internal(err.to_string()))?;
                self.users
                    .register(&credentials.username, &hash, STARTING_BALANCE)
                    .await
                    .map_err(|err| Error::internal(err.to_string()))?
            }
        };

        self.sign(user_id)
    }

    fn parse_token(&self, token: &str) -> Result<UserId, Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => Error::unauthorized(TOKEN_EXPIRED),
                _ => Error::unauthorized(INVALID_TOKEN),
            })?;

        Ok(UserId::new(data.claims.sub))
    }
}
