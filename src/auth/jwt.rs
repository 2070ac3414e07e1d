use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use super::claims::Claims;
use crate::config::JwtConfig;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Signs claims into an opaque string and back.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &Claims) -> Result<String, TokenError>;
    /// Must reject bad signatures, malformed input and expired claims.
    fn decode(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HMAC-signed JWT.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
}

impl JwtCodec {
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
        }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(cfg.secret.as_bytes(), cfg.algorithm)
    }
}

impl TokenCodec for JwtCodec {
    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let token =
            encode(&Header::new(self.algorithm), claims, &self.encoding).map_err(TokenError::Encode)?;
        debug!(user_id = claims.sub, "jwt signed");
        Ok(token)
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(TokenError::Decode)?;
        debug!(user_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
