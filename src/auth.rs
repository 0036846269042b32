//! Bearer-token auth boundary.
//!
//! The rest of the system only needs `authenticate(token) -> Identity`; user
//! registration and credential storage live elsewhere. Tokens are
//! HMAC-SHA256-signed claims: `base64url(json).base64url(tag)`.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::ApiError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// The authenticated caller, as extracted from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: i64,
    role: Role,
    exp: i64,
}

#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
}

impl AuthConfig {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_SECRET").unwrap_or_else(|_| "devsecret".to_string());
        Self::new(&secret)
    }

    /// Mints a signed token for `identity`, valid for `ttl_secs` seconds.
    pub fn sign(&self, identity: Identity, ttl_secs: i64) -> String {
        let claims = Claims {
            user_id: identity.user_id,
            role: identity.role,
            exp: Utc::now().timestamp() + ttl_secs,
        };
        let payload = serde_json::to_vec(&claims).expect("claims serialize");
        let tag = self.tag(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(tag)
        )
    }

    pub fn verify(&self, token: &str) -> Result<Identity, ApiError> {
        const INVALID: ApiError = ApiError::Unauthenticated("Invalid token");

        let (payload_b64, tag_b64) = token.split_once('.').ok_or(INVALID)?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| INVALID)?;
        let tag = URL_SAFE_NO_PAD.decode(tag_b64).map_err(|_| INVALID)?;

        if !constant_time_eq(&self.tag(&payload), &tag) {
            return Err(INVALID);
        }

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| INVALID)?;
        if claims.exp < Utc::now().timestamp() {
            return Err(ApiError::Unauthenticated("Token expired"));
        }

        Ok(Identity {
            user_id: claims.user_id,
            role: claims.role,
        })
    }

    fn tag(&self, payload: &[u8]) -> [u8; 32] {
        // HMAC accepts keys of any length.
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac key");
        mac.update(payload);
        mac.finalize().into_bytes().into()
    }
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Identity, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}

fn extract_identity(req: &HttpRequest) -> Result<Identity, ApiError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or(ApiError::Unauthenticated("No token provided"))?;
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated("No token provided"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated("No token provided"))?;
    config.verify(token)
}
