//! Main token service implementation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::token::{
    AccessTokenSubject, Claims, IssuedRefreshToken, RefreshTokenRecord, ACCESS_TOKEN_TYPE,
};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::RefreshTokenRepository;
use crate::services::hashing::{hash_secret, verify_secret};

use super::config::TokenServiceConfig;

/// Random bytes behind every refresh secret
const REFRESH_SECRET_BYTES: usize = 32;

/// Issues HS256 access tokens and rotating refresh tokens
pub struct TokenService {
    repository: Arc<dyn RefreshTokenRepository>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh token persistence
    /// * `clock` - Time source for `iat`/`exp` and refresh expiry
    /// * `config` - Token service configuration
    pub fn new(
        repository: Arc<dyn RefreshTokenRepository>,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // Time checks run against the injected clock in verify_access_token
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            repository,
            clock,
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Access token lifetime in seconds, as reported to clients
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.config.access_token_ttl_seconds
    }

    /// Sign an access token for `subject`
    ///
    /// The output depends only on the subject, the secret, the TTL and the
    /// clock: `jti` is derived from `sub` and `iat` rather than drawn at random.
    pub fn sign_access_token(&self, subject: &AccessTokenSubject) -> DomainResult<String> {
        let now = self.clock.now().timestamp();
        let sub = subject.user_id.to_string();
        let claims = Claims {
            jti: derive_jti(&sub, now),
            sub,
            username: subject.username.clone(),
            email: subject.email.clone(),
            phone: subject.phone.clone(),
            roles: subject.roles.clone(),
            profile: subject.profile.clone(),
            is_verified: subject.is_verified,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            iat: now,
            nbf: now,
            exp: now + self.config.access_token_ttl_seconds,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Verifies an access token and returns the claims
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Signature, issuer, audience, type and lifetime all check out
    /// * `Err(TokenError)` - Token is malformed, forged, expired or of another type
    pub fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    DomainError::Token(TokenError::InvalidSignature)
                }
                _ => DomainError::Token(TokenError::InvalidToken),
            },
        )?;
        let claims = token_data.claims;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(TokenError::InvalidToken.into());
        }

        let now = self.clock.now().timestamp();
        if now < claims.nbf {
            return Err(TokenError::TokenNotYetValid.into());
        }
        if now >= claims.exp {
            return Err(TokenError::TokenExpired.into());
        }

        Ok(claims)
    }

    /// Split a raw refresh token into its owner and secret
    ///
    /// A three-segment JWT is reported as `WrongTokenType` so clients that
    /// send their access token to the refresh endpoint get a 400 instead of a 401.
    pub fn parse_refresh_token(raw: &str) -> DomainResult<(Uuid, &str)> {
        let raw = raw.trim();
        if raw.split('.').count() == 3 {
            return Err(TokenError::WrongTokenType {
                expected: "refresh".to_string(),
            }
            .into());
        }

        let (owner, secret) = raw
            .split_once('.')
            .ok_or(TokenError::InvalidOrExpiredRefreshToken)?;
        let user_id =
            Uuid::parse_str(owner).map_err(|_| TokenError::InvalidOrExpiredRefreshToken)?;
        if secret.is_empty() {
            return Err(TokenError::InvalidOrExpiredRefreshToken.into());
        }
        Ok((user_id, secret))
    }

    /// Create and persist a refresh token; the raw value is only returned here
    pub async fn issue_refresh_token(
        &self,
        user_id: Uuid,
        metadata: serde_json::Value,
    ) -> DomainResult<IssuedRefreshToken> {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let secret = URL_SAFE_NO_PAD.encode(bytes);

        let now = self.clock.now();
        let expires_at = now + Duration::days(self.config.refresh_token_ttl_days);
        let token_hash = hash_secret(&secret, self.config.bcrypt_cost)?;

        let record = self
            .repository
            .create(RefreshTokenRecord::new(
                user_id, token_hash, now, expires_at, metadata,
            ))
            .await?;

        tracing::debug!(
            user_id = %user_id,
            token_id = %record.id,
            event = "refresh_token_issued",
            "Issued refresh token"
        );

        Ok(IssuedRefreshToken {
            raw_token: format!("{}.{}", user_id.simple(), secret),
            record,
        })
    }

    /// Exchange a refresh token for a new one
    ///
    /// # Returns
    ///
    /// * `Ok(Some(IssuedRefreshToken))` - The presented token is now revoked and
    ///   points at the returned one
    /// * `Ok(None)` - No active token matched, or a concurrent rotation of the
    ///   same token won
    /// * `Err(DomainError)` - Malformed token or store failure
    pub async fn rotate_refresh_token(
        &self,
        raw: &str,
        user_id: Uuid,
    ) -> DomainResult<Option<IssuedRefreshToken>> {
        let (owner, secret) = Self::parse_refresh_token(raw)?;
        if owner != user_id {
            return Ok(None);
        }

        let now = self.clock.now();
        let Some(current) = self.find_matching(user_id, secret).await? else {
            tracing::warn!(
                user_id = %user_id,
                event = "refresh_token_rejected",
                "Refresh token did not match an active token"
            );
            return Ok(None);
        };

        let next = self
            .issue_refresh_token(user_id, current.metadata.clone())
            .await?;

        if !self
            .repository
            .mark_rotated(current.id, next.record.id, now)
            .await?
        {
            self.repository.revoke(next.record.id, now).await?;
            tracing::warn!(
                user_id = %user_id,
                token_id = %current.id,
                event = "refresh_token_reuse",
                "Refresh token was rotated concurrently"
            );
            return Ok(None);
        }

        tracing::info!(
            user_id = %user_id,
            token_id = %current.id,
            replaced_by = %next.record.id,
            event = "refresh_token_rotated",
            "Rotated refresh token"
        );
        Ok(Some(next))
    }

    /// Revoke one refresh token; `false` when nothing active matched
    pub async fn revoke_refresh_token(&self, raw: &str, user_id: Uuid) -> DomainResult<bool> {
        let (owner, secret) = match Self::parse_refresh_token(raw) {
            Ok(parts) => parts,
            Err(_) => return Ok(false),
        };
        if owner != user_id {
            return Ok(false);
        }

        match self.find_matching(user_id, secret).await? {
            Some(record) => {
                let revoked = self.repository.revoke(record.id, self.clock.now()).await?;
                if revoked {
                    tracing::info!(
                        user_id = %user_id,
                        token_id = %record.id,
                        event = "refresh_token_revoked",
                        "Revoked refresh token"
                    );
                }
                Ok(revoked)
            }
            None => Ok(false),
        }
    }

    /// Revoke every active refresh token of a user
    pub async fn revoke_all_refresh_tokens(&self, user_id: Uuid) -> DomainResult<usize> {
        let count = self
            .repository
            .revoke_all_for_user(user_id, self.clock.now())
            .await?;
        tracing::info!(
            user_id = %user_id,
            count,
            event = "refresh_tokens_revoked_all",
            "Revoked all refresh tokens"
        );
        Ok(count)
    }

    /// Delete expired tokens and tokens revoked longer than the retention window
    pub async fn cleanup_expired_tokens(&self) -> DomainResult<usize> {
        let now = self.clock.now();
        let revoked_before = now - Duration::days(self.config.refresh_retention_days);
        let deleted = self.repository.delete_expired(now, revoked_before).await?;
        tracing::info!(deleted, event = "refresh_token_cleanup", "Deleted stale refresh tokens");
        Ok(deleted)
    }

    /// Active record whose hash matches `secret`
    ///
    /// Every candidate is checked so the time taken does not reveal which
    /// position matched.
    async fn find_matching(
        &self,
        user_id: Uuid,
        secret: &str,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        let candidates = self
            .repository
            .find_active_for_user(user_id, self.clock.now())
            .await?;

        let mut matched = None;
        for candidate in candidates {
            let is_match = verify_secret(secret, &candidate.token_hash);
            if is_match && matched.is_none() {
                matched = Some(candidate);
            }
        }
        Ok(matched)
    }
}

fn derive_jti(sub: &str, iat: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", sub, iat).as_bytes());
    hex::encode(&hasher.finalize()[..16])
}
