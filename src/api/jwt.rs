use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AuthConfig;
use crate::errors::{Result, ToolbeltError};

const ACCESS_TOKEN_TYPE: &str = "access";

/// Access Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 用户 id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

/// JWT Service for generating and validating tokens (HS256)
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
        }
    }

    /// Create JwtService from the `[auth]` section
    ///
    /// secret 为空时随机生成，进程重启后已签发的 token 全部失效
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = if config.jwt_secret.is_empty() {
            warn!("auth.jwt_secret is empty, generating a random secret for this process");
            crate::ids::new_short_id(48)
        } else {
            config.jwt_secret.clone()
        };

        Self::new(&secret, config.access_token_minutes)
    }

    pub fn access_token_minutes(&self) -> u64 {
        self.access_token_minutes
    }

    /// 为用户签发 access token
    pub fn generate_access_token(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_token_minutes as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate Access Token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(ToolbeltError::token("Not an access token"));
        }

        Ok(token_data.claims)
    }

    /// 校验 token 并取出用户 id
    pub fn user_id_from_token(&self, token: &str) -> Result<i64> {
        let claims = self.validate_access_token(token)?;
        claims
            .sub
            .parse()
            .map_err(|_| ToolbeltError::token(format!("Invalid subject '{}'", claims.sub)))
    }
}
