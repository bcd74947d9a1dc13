use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use ideaforge_persist::{User, UserRepository};

use crate::error::{ApiError, ApiResult};
use crate::identity::DeviceInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthOutcome {
    pub access_token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

pub struct AuthService {
    users: UserRepository,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt_secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            users,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl_hours,
        }
    }

    /// Register a new account. When the caller presents a device fingerprint
    /// with an existing anonymous user behind it, that user row is promoted
    /// in place, so every thread it owns survives the conversion.
    pub async fn register(
        &self,
        device: Option<DeviceInfo>,
        request: RegisterRequest,
    ) -> ApiResult<AuthOutcome> {
        if self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
            .is_some()
        {
            return Err(ApiError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::Internal(e.into()))?;

        let anonymous = match &device {
            Some(device) => self
                .users
                .find_anonymous_by_device(&device.device_id, &device.platform)
                .await
                .map_err(|e| ApiError::Internal(e.into()))?,
            None => None,
        };

        let user = match anonymous {
            Some(anonymous) => self
                .users
                .convert_to_authenticated(
                    anonymous.id,
                    &request.email,
                    &password_hash,
                    request.name.as_deref(),
                )
                .await
                .map_err(|e| ApiError::Internal(e.into()))?
                .ok_or_else(|| {
                    ApiError::Internal(anyhow::anyhow!("converted user disappeared"))
                })?,
            None => self
                .users
                .create_registered(request.name, &request.email, &password_hash)
                .await
                .map_err(|e| ApiError::Internal(e.into()))?,
        };

        self.issue(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthOutcome> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = user
            .password_hash
            .as_deref()
            .map(|hash| bcrypt::verify(&request.password, hash))
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?
            .unwrap_or(false);

        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        self.issue(&user)
    }

    pub fn verify_token(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "JWT validation failed");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })
    }

    fn issue(&self, user: &User) -> ApiResult<AuthOutcome> {
        let email = user
            .email
            .clone()
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("issuing token for user without email")))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_hex(),
            email,
            name: user.name.clone(),
            exp: now + 3600 * self.token_ttl_hours,
            iat: now,
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(e.into()))?;

        Ok(AuthOutcome {
            access_token,
            user: UserView::from(user),
        })
    }
}
