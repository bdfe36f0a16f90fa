//! RS256 access tokens
//!
//! Tokens are signed with a process-held RSA private key and verified with
//! the matching public key. Both keys are parsed once, at startup.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AuthError;

/// Lifetime of an access token, in seconds
pub const ACCESS_TOKEN_TTL_SECS: i64 = 2 * 60 * 60;

/// Token type reported to clients
pub const TOKEN_TYPE: &str = "Bearer";

const ALGORITHM: Algorithm = Algorithm::RS256;

pub const CLAIM_SUBJECT: &str = "sub";
pub const CLAIM_USERNAME: &str = "username";
pub const CLAIM_ROLE: &str = "role";
pub const CLAIM_ISSUED_AT: &str = "iat";
pub const CLAIM_EXPIRY: &str = "exp";

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// User role
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for a user, valid for `ttl` starting now
    pub fn new(user_id: i64, username: &str, role: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// The claim set as it is written into the token payload
    pub fn to_map(&self) -> Map<String, Value> {
        [
            (CLAIM_SUBJECT, Value::from(self.sub.as_str())),
            (CLAIM_USERNAME, Value::from(self.username.as_str())),
            (CLAIM_ROLE, Value::from(self.role.as_str())),
            (CLAIM_ISSUED_AT, Value::from(self.iat)),
            (CLAIM_EXPIRY, Value::from(self.exp)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

/// A freshly signed access token, as returned by login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuedToken {
    pub token_type: String,
    pub access_token: String,
    /// Lifetime in whole minutes
    pub expires_in: i64,
}

/// Signs access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from a PEM-encoded RSA private key
    pub fn from_rsa_pem(private_key: &[u8]) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key)
            .map_err(|e| AuthError::InvalidKey(format!("private key: {}", e)))?;

        Ok(Self {
            encoding_key,
            ttl: Duration::seconds(ACCESS_TOKEN_TTL_SECS),
        })
    }

    /// Issue an access token for a user
    pub fn issue(&self, user_id: i64, username: &str, role: &str) -> Result<IssuedToken, AuthError> {
        let claims = Claims::new(user_id, username, role, self.ttl);

        debug!("Issuing token for user: {}", username);

        Ok(IssuedToken {
            token_type: TOKEN_TYPE.to_string(),
            access_token: self.sign(&claims)?,
            expires_in: self.ttl.num_minutes(),
        })
    }

    /// Sign an arbitrary claim set
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(ALGORITHM), &claims.to_map(), &self.encoding_key).map_err(AuthError::Jwt)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &ALGORITHM)
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish()
    }
}

/// Verifies inbound access tokens
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from a PEM-encoded RSA public key
    pub fn from_rsa_pem(public_key: &[u8]) -> Result<Self, AuthError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key)
            .map_err(|e| AuthError::InvalidKey(format!("public key: {}", e)))?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&[CLAIM_EXPIRY, CLAIM_SUBJECT]);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Validate a token and return its claims
    ///
    /// Every failure collapses into [`AuthError::InvalidToken`]; the cause is
    /// only visible in debug logs.
    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {:?}", e.kind());
                AuthError::InvalidToken
            })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &ALGORITHM)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY: &[u8] = include_bytes!("../testdata/private_rsa_key.pem");
    const PUBLIC_KEY: &[u8] = include_bytes!("../testdata/public_rsa_key.pem");
    const OTHER_PUBLIC_KEY: &[u8] = include_bytes!("../testdata/other_public_rsa_key.pem");

    fn issuer() -> TokenIssuer {
        TokenIssuer::from_rsa_pem(PRIVATE_KEY).unwrap()
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::from_rsa_pem(PUBLIC_KEY).unwrap()
    }

    #[test]
    fn test_token_issue_and_authenticate() {
        let issued = issuer().issue(42, "testuser", "admin").unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 120);

        let claims = verifier().authenticate(&issued.access_token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.role, "admin");
        assert!((claims.exp - claims.iat - 7200).abs() <= 1);
    }

    #[test]
    fn test_header_is_rs256() {
        let issued = issuer().issue(1, "testuser", "admin").unwrap();
        let header = jsonwebtoken::decode_header(&issued.access_token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
    }

    #[test]
    fn test_claim_map_layout() {
        let claims = Claims::new(7, "alice", "member", Duration::seconds(ACCESS_TOKEN_TTL_SECS));
        let map = claims.to_map();

        assert_eq!(map.len(), 5);
        assert_eq!(map[CLAIM_SUBJECT], "7");
        assert_eq!(map[CLAIM_USERNAME], "alice");
        assert_eq!(map[CLAIM_ROLE], "member");
        assert_eq!(map[CLAIM_ISSUED_AT], claims.iat);
        assert_eq!(map[CLAIM_EXPIRY], claims.exp);

        let decoded: Claims = serde_json::from_value(Value::Object(map)).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            verifier().authenticate("invalid-token"),
            Err(AuthError::InvalidToken)
        ));
        assert!(verifier().authenticate("").is_err());
    }

    #[test]
    fn test_wrong_public_key_rejected() {
        let issued = issuer().issue(1, "testuser", "admin").unwrap();
        let other = TokenVerifier::from_rsa_pem(OTHER_PUBLIC_KEY).unwrap();
        assert!(matches!(
            other.authenticate(&issued.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issued = issuer().issue(1, "testuser", "member").unwrap();
        let parts: Vec<&str> = issued.access_token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let mut payload: Vec<char> = parts[1].chars().collect();
        let middle = payload.len() / 2;
        payload[middle] = if payload[middle] == 'A' { 'B' } else { 'A' };
        let payload: String = payload.into_iter().collect();

        let tampered = format!("{}.{}.{}", parts[0], payload, parts[2]);
        assert!(verifier().authenticate(&tampered).is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issued = issuer().issue(1, "testuser", "member").unwrap();
        let (signed, signature) = issued.access_token.rsplit_once('.').unwrap();
        let first = signature.chars().next().unwrap();
        let replaced = if first == 'A' { 'B' } else { 'A' };
        let token = format!("{}.{}{}", signed, replaced, &signature[1..]);
        assert!(verifier().authenticate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            username: "testuser".to_string(),
            role: "admin".to_string(),
            iat: now - 7300,
            exp: now - 100,
        };
        let token = issuer().sign(&claims).unwrap();
        assert!(matches!(
            verifier().authenticate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let claims = Claims::new(1, "testuser", "admin", Duration::seconds(ACCESS_TOKEN_TTL_SECS));
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();
        assert!(verifier().authenticate(&token).is_err());
    }

    #[test]
    fn test_malformed_keys_rejected() {
        assert!(matches!(
            TokenIssuer::from_rsa_pem(b"not a key"),
            Err(AuthError::InvalidKey(_))
        ));
        assert!(matches!(
            TokenVerifier::from_rsa_pem(b"not a key"),
            Err(AuthError::InvalidKey(_))
        ));
    }
}
