use crate::error::AppError;
use crate::models::{Role, User};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The user's unique identifier.
    pub sub: Uuid,
    /// The user's role at the time of login.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signing and verification keys for HS256 session tokens.
///
/// Built once from configuration and shared through application state.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::hours(ttl_hours),
        }
    }

    /// Issues a token for `user` that expires after the configured duration.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry and returns the embedded claims.
    ///
    /// Every failure (malformed, wrong signature, expired) is `AppError::Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        // A token is dead the second its `exp` passes.
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farmer() -> User {
        User::new("farmer_jane".into(), "hash".into(), Role::Farmer)
    }

    #[test]
    fn test_token_generation_and_verification() {
        let keys = TokenKeys::new("test_secret_for_gen_verify", 24);
        let user = farmer();

        let token = keys.issue(&user).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Farmer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expiration() {
        let keys = TokenKeys::new("test_secret_for_expiration", 24);
        let two_hours_ago = chrono::Utc::now() - chrono::Duration::hours(2);

        let expired = Claims {
            sub: Uuid::new_v4(),
            role: Role::Consumer,
            iat: (two_hours_ago - chrono::Duration::hours(1)).timestamp() as usize,
            exp: two_hours_ago.timestamp() as usize,
        };
        let token = keys.encode(&expired).unwrap();

        match keys.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("ExpiredSignature"), "{}", msg),
            other => panic!("Expected expired token to be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_recently_expired_token_is_rejected() {
        let keys = TokenKeys::new("test_secret_for_recent_expiry", 24);
        let now = chrono::Utc::now().timestamp();

        let just_expired = Claims {
            sub: Uuid::new_v4(),
            role: Role::Farmer,
            iat: (now - 3600) as usize,
            exp: (now - 5) as usize,
        };
        let token = keys.encode(&just_expired).unwrap();

        assert!(matches!(keys.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = TokenKeys::new("issuer_secret", 24);
        let verifier = TokenKeys::new("a_completely_different_secret", 24);
        let token = issuer.issue(&farmer()).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let keys = TokenKeys::new("secret", 24);
        let token = keys.issue(&farmer()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let signature = parts[2].clone();
        let flipped = if signature.starts_with('A') { "B" } else { "A" };
        parts[2] = format!("{}{}", flipped, &signature[1..]);

        assert!(keys.verify(&parts.join(".")).is_err());
        assert!(keys.verify("not-a-token").is_err());
        assert!(keys.verify("").is_err());
    }
}
