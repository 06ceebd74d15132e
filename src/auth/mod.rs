use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim set embedded in every signed token.
///
/// Produced once at login and consumed unchanged by every subsequent request
/// until expiry; there is no server-side session store. Field names match the
/// wire format the frontend already decodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(rename = "UserId")]
    pub user_id: i32,
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "RoleId")]
    pub role_id: i32,
    #[serde(rename = "CompanyIds")]
    pub company_ids: Vec<i32>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        user_id: i32,
        user_name: String,
        role_id: i32,
        company_ids: Vec<i32>,
        expiry_hours: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            user_name,
            role_id,
            company_ids,
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is missing!")]
    Missing,
    #[error("Token expired!")]
    Expired,
    #[error("Invalid token!")]
    Invalid,
    #[error("JWT secret not configured")]
    SecretMissing,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Sign a claim set into a compact HS256 token.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::SecretMissing);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts both `Bearer <token>` and a raw token, matching what existing
/// clients send.
pub fn token_from_header(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verify signature and expiry, yielding the caller's claim set.
///
/// Pure: no clock source other than the validator's own, no side effects.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::SecretMissing);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn sample_claims(expiry_hours: i64) -> Claims {
        Claims::new(10, "Alice Smith".to_string(), 2, vec![3, 7], expiry_hours)
    }

    #[test]
    fn round_trip_preserves_claims() {
        let claims = sample_claims(2);
        let token = issue_token(&claims, SECRET).unwrap();
        let decoded = verify_token(&token, SECRET).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn bearer_and_raw_forms_verify_identically() {
        let token = issue_token(&sample_claims(2), SECRET).unwrap();
        let bearer = format!("Bearer {}", token);

        let from_bearer = token_from_header(&bearer).unwrap();
        let from_raw = token_from_header(&token).unwrap();
        assert_eq!(
            verify_token(from_bearer, SECRET).unwrap(),
            verify_token(from_raw, SECRET).unwrap()
        );
    }

    #[test]
    fn empty_header_yields_no_token() {
        assert_eq!(token_from_header(""), None);
        assert_eq!(token_from_header("Bearer "), None);
    }

    #[test]
    fn expired_token_is_distinguished() {
        // Expired well beyond the default validation leeway
        let token = issue_token(&sample_claims(-2), SECRET).unwrap();
        assert_eq!(verify_token(&token, SECRET), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(
            verify_token("not.a.token", SECRET),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_token(&sample_claims(2), SECRET).unwrap();
        assert_eq!(verify_token(&token, "other"), Err(TokenError::Invalid));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(
            issue_token(&sample_claims(2), ""),
            Err(TokenError::SecretMissing)
        );
        assert_eq!(verify_token("x", ""), Err(TokenError::SecretMissing));
    }
}
