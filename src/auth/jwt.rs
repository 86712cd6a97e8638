use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Roles allowed to change goals and manual revenue entries.
pub const FINANCE_ROLES: &[&str] = &["admin", "owner"];

/// Identity issued by the session provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // user id
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Identity assumed for unauthenticated calls in development.
    pub fn development() -> Self {
        Self {
            sub: "dev".into(),
            email: "dev@localhost".into(),
            role: "admin".into(),
            exp: i64::MAX,
            iat: 0,
        }
    }

    pub fn can_manage_finance(&self) -> bool {
        FINANCE_ROLES.contains(&self.role.as_str())
    }
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn generate_token(&self, user_id: &str, email: &str, role: &str, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.into(),
            email: email.into(),
            role: role.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_keeps_role() {
        let jwt = JwtManager::new("secret");
        let token = jwt.generate_token("u1", "owner@trato.com", "owner", Duration::hours(1)).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.role, "owner");
        assert!(claims.can_manage_finance());
    }

    #[test]
    fn test_expired_or_foreign_tokens_rejected() {
        let jwt = JwtManager::new("secret");
        let expired = jwt.generate_token("u1", "a@b.com", "admin", Duration::hours(-2)).unwrap();
        assert!(jwt.validate_token(&expired).is_err());

        let other = JwtManager::new("other-secret");
        let foreign = other.generate_token("u1", "a@b.com", "admin", Duration::hours(1)).unwrap();
        assert!(jwt.validate_token(&foreign).is_err());
    }

    #[test]
    fn test_barber_cannot_manage_finance() {
        let mut claims = Claims::development();
        claims.role = "barber".into();
        assert!(!claims.can_manage_finance());
    }
}
