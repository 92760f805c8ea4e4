use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::*,
    services::UserService,
    utils::validation,
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct AuthService {
    config: Config,
    user_service: UserService,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // 用户ID
    pub role: Role,         // 签发时的角色
    pub exp: i64,           // 过期时间
    pub iat: i64,           // 签发时间
}

impl AuthService {
    pub async fn new(config: &Config, user_service: UserService) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            user_service,
        })
    }

    /// 注册新用户并签发令牌
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        let request = RegisterRequest {
            username: request.username.trim().to_string(),
            email: validation::normalize_email(&request.email),
            name: request.name.map(|n| n.trim().to_string()),
            ..request
        };
        debug!("Registration attempt: {} <{}>", request.username, request.email);

        request.validate()?;
        validation::validate_username(&request.username)?;
        validation::validate_email_format(&request.email)?;
        validation::validate_password(&request.password)?;
        if let Some(name) = &request.name {
            validation::validate_display_name(name)?;
        }

        let role = request.role.unwrap_or_default();
        if role.is_admin() && !self.config.allow_admin_registration {
            return Err(AppError::forbidden("Admin registration is disabled"));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: request.username,
            email: request.email,
            password_hash,
            name: request.name.unwrap_or_default(),
            profile_image: String::new(),
            role,
            created_at: Utc::now(),
        };

        let user = self.user_service.create_user(user).await?;
        info!("User registered: {} ({})", user.id, user.email);

        Ok(AuthResponse {
            token: self.issue_token(&user)?,
            user: user.to_response(),
        })
    }

    /// 邮箱 + 密码登录
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let email = validation::normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::bad_request("Email and password are required"));
        }

        let user = match self.user_service.find_by_email(&email).await? {
            Some(user) if self.verify_password(&request.password, &user.password_hash) => user,
            _ => {
                warn!("Failed login attempt for {}", email);
                return Err(AppError::bad_request("Invalid credentials"));
            }
        };

        info!("User logged in: {}", user.id);
        Ok(AuthResponse {
            token: self.issue_token(&user)?,
            user: user.to_response(),
        })
    }

    /// 校验令牌并加载用户（不含密码）
    pub async fn authenticate(&self, token: &str) -> Result<UserResponse> {
        let claims = self.verify_jwt(token)?;

        match self.user_service.get_user(&claims.sub).await? {
            Some(user) => Ok(user.to_response()),
            None => {
                warn!("Token refers to missing user {}", claims.sub);
                Err(AppError::unauthorized("User not found"))
            }
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiry_hours)).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), claims, &key)?)
    }

    pub fn verify_jwt(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                debug!("JWT token verified for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                warn!("JWT verification failed: {}", e);
                Err(AppError::Authentication("Invalid token".to_string()))
            }
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        match PasswordHash::new(password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
