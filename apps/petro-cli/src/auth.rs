//! JWT authentication module.
//!
//! Issues a bearer token on login and resolves it back to the [`Actor`]
//! the role gate checks.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use petro_core::{Actor, Role, User};

use crate::error::CliError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub employee_id: String,

    /// Role code ("SM", "AM", "Admin")
    pub role: Role,

    /// Home station, for station managers
    pub station_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        Actor {
            id: claims.sub,
            employee_id: claims.employee_id,
            role: claims.role,
            station_id: claims.station_id,
        }
    }
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Generate a token for a user who just logged in.
    pub fn issue(&self, user: &User) -> Result<String, CliError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            employee_id: user.employee_id.clone(),
            role: user.role,
            station_id: user.station_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CliError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, CliError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| CliError::unauthenticated(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Resolves a raw token or an `Authorization` header value to the caller.
    pub fn authenticate(&self, credential: &str) -> Result<Actor, CliError> {
        let token = extract_bearer_token(credential).unwrap_or(credential);
        Ok(self.validate_token(token.trim())?.into())
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn station_manager() -> User {
        User {
            id: "user-1".into(),
            employee_id: "SM-001".into(),
            name: "Station Manager".into(),
            role: Role::StationManager,
            station_id: Some("station-1".into()),
            area_manager_id: Some("user-2".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager.issue(&station_manager()).unwrap();
        let actor = manager.authenticate(&token).unwrap();

        assert_eq!(actor.id, "user-1");
        assert_eq!(actor.employee_id, "SM-001");
        assert_eq!(actor.role, Role::StationManager);
        assert_eq!(actor.station_id.as_deref(), Some("station-1"));
    }

    #[test]
    fn test_bearer_prefix_accepted() {
        let manager = JwtManager::new("test-secret", 3600);
        let token = manager.issue(&station_manager()).unwrap();

        let actor = manager.authenticate(&format!("Bearer {token}")).unwrap();
        assert_eq!(actor.id, "user-1");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::new("secret-a", 3600).issue(&station_manager()).unwrap();

        let err = JwtManager::new("secret-b", 3600).authenticate(&token).unwrap_err();
        assert!(matches!(err.code, ErrorCode::Unauthenticated));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the default 60s leeway.
        let manager = JwtManager::new("test-secret", -3600);
        let token = manager.issue(&station_manager()).unwrap();

        assert!(manager.authenticate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
