//! Password login with short-lived JWT access tokens and Redis-backed
//! refresh tokens.

use actix_web::{post, web, HttpResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    config::settings,
    db::user_repo,
    error::{AppError, AppResult},
    game::types::UserId,
};

//////////////////////////////////////////////////
// Data structs
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    exp: usize,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

//////////////////////////////////////////////////
// ─────────────  JwtAuth extractor  ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use super::Claims;
    use crate::{config::settings, error::AppError, game::types::UserId};
    use actix_web::{dev::Payload, FromRequest, HttpRequest};
    use futures_util::future::{ready, Ready};
    use jsonwebtoken::{decode, DecodingKey, Validation};

    /// Extracts and validates a Bearer-JWT, exposing the caller's user id.
    #[derive(Debug, Clone, Copy)]
    pub struct JwtAuth {
        pub user_id: UserId,
    }

    impl FromRequest for JwtAuth {
        type Error = AppError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let res = (|| {
                // Expect:  Authorization: Bearer <JWT>
                let hdr = req
                    .headers()
                    .get("Authorization")
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

                let token = hdr
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| AppError::Unauthorized("malformed Authorization header".into()))?;

                let data = decode::<Claims>(
                    token,
                    &DecodingKey::from_secret(settings().jwt_secret.as_bytes()),
                    &Validation::default(),
                )
                .map_err(|_| AppError::Unauthorized("invalid / expired token".into()))?;

                let user_id = data
                    .claims
                    .sub
                    .parse::<UserId>()
                    .map_err(|_| AppError::Unauthorized("bad sub".into()))?;

                Ok(JwtAuth { user_id })
            })();

            ready(res)
        }
    }
}
pub use extractor::JwtAuth;

/// Sign an access token for `user_id`.
pub fn issue_access_token(user_id: UserId) -> AppResult<String> {
    let s = settings();
    let exp = (Utc::now() + Duration::minutes(s.access_token_minutes)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(s.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT encode failed: {e}")))
}

/// Mint a refresh token and store it in Redis.
async fn issue_refresh_token(redis: &RedisClient, user_id: UserId) -> AppResult<String> {
    let token = Uuid::new_v4().to_string();
    let mut conn = redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("redis unavailable: {e}")))?;
    let _: () = conn
        .set_ex(
            format!("refresh:{token}"),
            user_id.to_string(),
            settings().refresh_token_secs,
        )
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("storing refresh token: {e}")))?;
    Ok(token)
}

async fn token_pair(redis: &RedisClient, user_id: UserId) -> AppResult<TokenResponse> {
    Ok(TokenResponse {
        access_token: issue_access_token(user_id)?,
        refresh_token: issue_refresh_token(redis, user_id).await?,
        expires_in: settings().access_token_minutes * 60,
    })
}

async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking pool: {e}")))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("bcrypt: {e}")))
}

//////////////////////////////////////////////////
// POST /api/auth/register
//////////////////////////////////////////////////
#[post("/auth/register")]
pub async fn register(
    info: web::Json<RegisterRequest>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = info.into_inner();
    if password.len() < 8 {
        return Err(AppError::validation(
            "password must be at least 8 characters",
        ));
    }

    let cost = settings().bcrypt_cost;
    let hash = blocking(move || bcrypt::hash(password, cost)).await?;
    let user = user_repo::create_user(&db, &username, &email, Some(&hash)).await?;

    log::info!("registered user {} ({})", user.id, user.username);
    Ok(HttpResponse::Created().json(user))
}

//////////////////////////////////////////////////
// POST /api/auth/login
//////////////////////////////////////////////////
#[post("/auth/login")]
pub async fn login(
    info: web::Json<LoginRequest>,
    db: web::Data<SqlitePool>,
    redis: web::Data<RedisClient>,
) -> AppResult<HttpResponse> {
    let LoginRequest { username, password } = info.into_inner();
    let bad_credentials = || AppError::Unauthorized("invalid username or password".into());

    let user = user_repo::find_by_username(&db, &username)
        .await?
        .ok_or_else(bad_credentials)?;
    let hash = user.password_hash.clone().ok_or_else(bad_credentials)?;

    if !blocking(move || bcrypt::verify(password, &hash)).await? {
        return Err(bad_credentials());
    }

    user_repo::set_online(&db, user.id, true).await?;
    Ok(HttpResponse::Ok().json(token_pair(&redis, user.id).await?))
}

//////////////////////////////////////////////////
// POST /api/auth/refresh
//////////////////////////////////////////////////
#[post("/auth/refresh")]
pub async fn refresh(
    info: web::Json<RefreshRequest>,
    redis: web::Data<RedisClient>,
) -> AppResult<HttpResponse> {
    // consume old refresh → user_id
    let mut conn = redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("redis unavailable: {e}")))?;
    let key = format!("refresh:{}", info.refresh_token);
    let stored: Option<String> = conn
        .get_del(&key)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("reading refresh token: {e}")))?;

    let user_id = stored
        .and_then(|uid| uid.parse::<UserId>().ok())
        .ok_or_else(|| AppError::Unauthorized("invalid refresh".into()))?;

    Ok(HttpResponse::Ok().json(token_pair(&redis, user_id).await?))
}

//////////////////////////////////////////////////
// POST /api/auth/logout
//////////////////////////////////////////////////
#[post("/auth/logout")]
pub async fn logout(auth: JwtAuth, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    user_repo::set_online(&db, auth.user_id, false).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "logged_out" })))
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(refresh)
        .service(logout);
}
