//! HS256 JWT implementation of the token codec port.
//!
//! Expiry is checked by hand against the caller-supplied instant so the
//! clock stays injectable; the library only verifies algorithm, signature
//! and claim shape.

use chrono::{DateTime, TimeDelta, Utc};
use classbook_application::{ClaimSet, IssuedToken, TokenClaims, TokenCodec};
use classbook_core::{AppError, AppResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest accepted token lifetime in hours.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    #[serde(default)]
    roles: String,
    iat: i64,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

/// Signs and verifies compact HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl JwtTokenCodec {
    /// Creates a codec. The secret must be at least [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(secret: &str, ttl: TimeDelta) -> AppResult<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "token signing secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        if ttl <= TimeDelta::zero() || ttl > TimeDelta::hours(MAX_TOKEN_TTL_HOURS) {
            return Err(AppError::Validation(format!(
                "token lifetime must be positive and at most {MAX_TOKEN_TTL_HOURS} hours"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = ["sub", "exp"].into_iter().map(String::from).collect();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

fn rejection_reason(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidSignature => "bad_signature",
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => "unsupported_algorithm",
        ErrorKind::MissingRequiredClaim(_) => "missing_claim",
        ErrorKind::ExpiredSignature => "expired",
        _ => "malformed",
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue_at(&self, claims: &ClaimSet, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            AppError::Internal(format!("token expiry overflows when issued at {now}"))
        })?;
        let jwt_claims = JwtClaims {
            sub: claims.subject.clone(),
            roles: claims.roles.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            group: claims.group.clone(),
            scope: claims.scope.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &jwt_claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))?;

        let expires_at = DateTime::from_timestamp(jwt_claims.exp, 0).unwrap_or(expires_at);
        Ok(IssuedToken { token, expires_at })
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let Some(claims) = self.parse_claims(token) else {
            return false;
        };

        if now >= claims.expires_at {
            warn!(reason = "expired", "bearer token rejected");
            return false;
        }

        true
    }

    fn parse_claims(&self, token: &str) -> Option<TokenClaims> {
        let data = match decode::<JwtClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(error) => {
                warn!(reason = rejection_reason(error.kind()), "bearer token rejected");
                return None;
            }
        };

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            warn!(reason = "empty_subject", "bearer token rejected");
            return None;
        }

        let (Some(issued_at), Some(expires_at)) = (
            DateTime::from_timestamp(claims.iat, 0),
            DateTime::from_timestamp(claims.exp, 0),
        ) else {
            warn!(reason = "malformed", "bearer token rejected");
            return None;
        };

        Some(TokenClaims {
            subject: claims.sub,
            roles: claims.roles,
            group: claims.group.filter(|group| !group.trim().is_empty()),
            scope: claims.scope.filter(|scope| !scope.trim().is_empty()),
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::{DateTime, TimeDelta, Utc};
    use classbook_application::{ClaimSet, TokenCodec};
    use classbook_core::{AppError, AppResult};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    use super::{JwtClaims, JwtTokenCodec, MAX_TOKEN_TTL_HOURS};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn codec() -> AppResult<JwtTokenCodec> {
        JwtTokenCodec::new(SECRET, TimeDelta::hours(24))
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap_or_default()
    }

    #[test]
    fn issued_token_validates_and_parses() -> AppResult<()> {
        let codec = codec()?;
        let mut claims = ClaimSet::new("user-1", "ROLE_TEACHER_MATH,ROLE_TEACHER");
        claims.group = Some("10a".to_owned());
        claims.scope = Some("Mathematics".to_owned());

        let issued = codec.issue_at(&claims, fixed_now())?;
        assert_eq!(issued.token.split('.').count(), 3);
        assert!(codec.validate_at(&issued.token, fixed_now()));

        let parsed = codec.parse_claims(&issued.token);
        let Some(parsed) = parsed else {
            panic!("issued token should parse");
        };
        assert_eq!(parsed.subject, "user-1");
        assert_eq!(parsed.roles, "ROLE_TEACHER_MATH,ROLE_TEACHER");
        assert_eq!(parsed.group.as_deref(), Some("10a"));
        assert_eq!(parsed.scope.as_deref(), Some("Mathematics"));
        assert_eq!(parsed.issued_at, fixed_now());
        assert_eq!(parsed.expires_at, fixed_now() + TimeDelta::hours(24));
        assert_eq!(issued.expires_at, parsed.expires_at);
        Ok(())
    }

    #[test]
    fn token_expires_after_ttl() -> AppResult<()> {
        let codec = codec()?;
        let issued = codec.issue_at(&ClaimSet::new("user-1", "ROLE_USER"), fixed_now())?;
        let expiry = fixed_now() + TimeDelta::hours(24);

        assert!(codec.validate_at(&issued.token, expiry - TimeDelta::seconds(1)));
        assert!(!codec.validate_at(&issued.token, expiry));
        assert!(!codec.validate_at(&issued.token, expiry + TimeDelta::seconds(1)));
        Ok(())
    }

    #[test]
    fn ttl_is_configurable() -> AppResult<()> {
        let codec = JwtTokenCodec::new(SECRET, TimeDelta::hours(1))?;
        let issued = codec.issue_at(&ClaimSet::new("user-1", "ROLE_USER"), fixed_now())?;
        assert!(!codec.validate_at(&issued.token, fixed_now() + TimeDelta::hours(2)));
        assert_eq!(codec.ttl(), TimeDelta::hours(1));
        Ok(())
    }

    #[test]
    fn flipping_any_signature_byte_invalidates() -> AppResult<()> {
        let codec = codec()?;
        let issued = codec.issue_at(&ClaimSet::new("user-1", "ROLE_ADMIN"), fixed_now())?;
        let (signed_part, signature) = issued
            .token
            .rsplit_once('.')
            .unwrap_or_else(|| panic!("token should have a signature segment"));
        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .unwrap_or_else(|error| panic!("signature should be base64url: {error}"));

        for index in 0..signature_bytes.len() {
            let mut tampered = signature_bytes.clone();
            tampered[index] ^= 0x01;
            let token = format!("{signed_part}.{}", URL_SAFE_NO_PAD.encode(&tampered));
            assert!(
                !codec.validate_at(&token, fixed_now()),
                "flipped byte {index} still validated"
            );
        }
        Ok(())
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() -> AppResult<()> {
        let other = JwtTokenCodec::new("ffffffffffffffffffffffffffffffff", TimeDelta::hours(24))?;
        let issued = other.issue_at(&ClaimSet::new("user-1", "ROLE_ADMIN"), fixed_now())?;
        assert!(!codec()?.validate_at(&issued.token, fixed_now()));
        assert!(codec()?.parse_claims(&issued.token).is_none());
        Ok(())
    }

    #[test]
    fn other_algorithms_are_rejected() -> AppResult<()> {
        let claims = JwtClaims {
            sub: "user-1".to_owned(),
            roles: "ROLE_ADMIN".to_owned(),
            iat: fixed_now().timestamp(),
            exp: (fixed_now() + TimeDelta::hours(1)).timestamp(),
            group: None,
            scope: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap_or_else(|error| panic!("encoding should succeed: {error}"));

        assert!(!codec()?.validate_at(&token, fixed_now()));
        Ok(())
    }

    #[test]
    fn malformed_tokens_are_rejected() -> AppResult<()> {
        let codec = codec()?;
        for token in ["", "abc", "a.b.c", "Bearer x.y.z"] {
            assert!(!codec.validate_at(token, fixed_now()));
            assert!(codec.parse_claims(token).is_none());
        }
        Ok(())
    }

    #[test]
    fn empty_subject_is_rejected() -> AppResult<()> {
        let codec = codec()?;
        let issued = codec.issue_at(&ClaimSet::new("  ", "ROLE_USER"), fixed_now())?;
        assert!(!codec.validate_at(&issued.token, fixed_now()));
        Ok(())
    }

    #[test]
    fn empty_roles_claim_still_validates() -> AppResult<()> {
        let codec = codec()?;
        let issued = codec.issue_at(&ClaimSet::new("user@school.org", ""), fixed_now())?;
        assert!(codec.validate_at(&issued.token, fixed_now()));
        assert_eq!(
            codec.parse_claims(&issued.token).map(|claims| claims.roles),
            Some(String::new())
        );
        Ok(())
    }

    #[test]
    fn short_secret_is_refused() {
        assert!(JwtTokenCodec::new("too-short", TimeDelta::hours(24)).is_err());
        assert!(JwtTokenCodec::new(SECRET, TimeDelta::zero()).is_err());
    }

    #[test]
    fn lifetime_beyond_the_cap_is_refused() -> AppResult<()> {
        assert!(JwtTokenCodec::new(SECRET, TimeDelta::hours(MAX_TOKEN_TTL_HOURS)).is_ok());
        assert!(matches!(
            JwtTokenCodec::new(SECRET, TimeDelta::hours(MAX_TOKEN_TTL_HOURS + 1)),
            Err(AppError::Validation(_))
        ));

        let issued = codec()?.issue_at(
            &ClaimSet::new("user-1", "ROLE_USER"),
            DateTime::<Utc>::MAX_UTC,
        );
        assert!(matches!(issued, Err(AppError::Internal(_))));
        Ok(())
    }
}
