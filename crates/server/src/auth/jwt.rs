use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use signet_core::{Role, User, UserId};

/// JWT claims embedded in issued tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric user id).
    pub sub: i64,
    pub username: String,
    /// Role at issue time. Validation re-reads the current role.
    pub role: Role,
    /// Expiry (seconds since epoch).
    pub exp: usize,
}

/// Issues and validates HMAC-signed bearer tokens.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Issue a token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, String> {
        let now = usize::try_from(jsonwebtoken::get_current_timestamp()).unwrap_or(usize::MAX);
        let ttl = usize::try_from(self.expiry_seconds).unwrap_or(usize::MAX);
        let exp = now.saturating_add(ttl);

        let claims = Claims {
            sub: user.id.get(),
            username: user.username.clone(),
            role: user.role,
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| format!("JWT encoding failed: {e}"))
    }

    /// Check signature and expiry, returning the embedded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, String> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| format!("invalid token: {e}"))
    }
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}
