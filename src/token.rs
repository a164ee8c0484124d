//! Compact HS256 bearer tokens for the data store.
//!
//! A token is `<header>.<claims>.<signature>`, each segment URL-safe base64
//! without padding. The signature is HMAC-SHA256 over the first two segments
//! joined by a dot, keyed with the shared secret the store also knows.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::types::{Claims, TokenHeader};

type HmacSha256 = Hmac<Sha256>;

pub const ROLE: &str = "sensor_admin";
pub const VALIDITY_SECS: i64 = 3600;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("could not encode token segment: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("signing key rejected")]
    InvalidKey,

    #[error("token must have three non-empty segments")]
    Malformed,

    #[error("segment is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("segment is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("unsupported header: alg={alg} typ={typ}")]
    UnsupportedHeader { alg: String, typ: String },

    #[error("signature mismatch")]
    Signature,

    #[error("token expired at {exp}")]
    Expired { exp: i64 },
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
}

impl TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Issues a fresh token valid for one hour from now.
    pub fn issue(&self) -> Result<String, TokenError> {
        self.issue_at(unix_now())
    }

    pub fn issue_at(&self, now: i64) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: "HS256".into(),
            typ: "JWT".into(),
        };
        let claims = Claims {
            role: ROLE.into(),
            iat: now,
            exp: now + VALIDITY_SECS,
        };

        let header = encode_segment(&header)?;
        let claims = encode_segment(&claims)?;
        let message = format!("{header}.{claims}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&message)?.finalize().into_bytes());

        Ok(format!("{message}.{signature}"))
    }

    /// Checks shape, header and signature, then returns the claims if the
    /// token has not expired at `now`.
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };
        if header.is_empty() || claims.is_empty() || signature.is_empty() {
            return Err(TokenError::Malformed);
        }

        let decoded: TokenHeader = decode_segment(header)?;
        if decoded.alg != "HS256" || decoded.typ != "JWT" {
            return Err(TokenError::UnsupportedHeader {
                alg: decoded.alg,
                typ: decoded.typ,
            });
        }

        let signature = URL_SAFE_NO_PAD.decode(signature)?;
        self.mac(&format!("{header}.{claims}"))?
            .verify_slice(&signature)
            .map_err(|_| TokenError::Signature)?;

        let claims: Claims = decode_segment(claims)?;
        if claims.exp <= now {
            return Err(TokenError::Expired { exp: claims.exp });
        }
        Ok(claims)
    }

    fn mac(&self, message: &str) -> Result<HmacSha256, TokenError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)?;
        mac.update(message.as_bytes());
        Ok(mac)
    }
}

fn encode_segment<T: serde::Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(TokenError::Encode)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment)?;
    serde_json::from_slice(&bytes).map_err(TokenError::Json)
}
